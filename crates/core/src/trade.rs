//! Apartment trade record rows
//!
//! Trade records arrive with every field string-encoded (the upstream ships
//! them as XML): amounts are comma-grouped, areas are decimal strings, and a
//! cancelled deal is marked by a non-empty cancellation date.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One apartment trade, as reported by the trade-record service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRecord {
    /// 5-digit province+district code
    #[serde(rename = "sggCd")]
    pub region_code: String,

    #[serde(rename = "dealYear", default)]
    pub deal_year: Option<String>,

    #[serde(rename = "dealMonth", default)]
    pub deal_month: Option<String>,

    /// Brokered vs direct deal
    #[serde(rename = "dealingGbn", default)]
    pub deal_kind: Option<String>,

    /// Neighborhood name
    #[serde(rename = "umdNm", default)]
    pub neighborhood: Option<String>,

    /// Apartment complex name
    #[serde(rename = "aptNm", default)]
    pub complex_name: Option<String>,

    /// Exclusive-use area in square meters, decimal string
    #[serde(rename = "excluUseAr")]
    pub exclusive_area: String,

    /// Deal amount in 10,000 KRW, comma-grouped string
    #[serde(rename = "dealAmount")]
    pub deal_amount: String,

    /// Cancellation date; non-empty means the deal was unwound
    #[serde(rename = "cdealDay", default)]
    pub cancelled_on: Option<String>,
}

impl TradeRecord {
    /// Parse a raw trade record. Rows missing the fields needed for the
    /// price dataset are dropped by returning `None`.
    pub fn from_record(record: &Value) -> Option<Self> {
        serde_json::from_value(record.clone()).ok()
    }

    /// Whether the deal was subsequently cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled_on.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    /// Exclusive-use area in m², if parsable.
    #[must_use]
    pub fn area(&self) -> Option<f64> {
        let parsed = self.exclusive_area.trim().parse::<f64>().ok()?;
        (parsed > 0.0).then_some(parsed)
    }

    /// Deal amount in 10,000 KRW, if parsable.
    #[must_use]
    pub fn amount(&self) -> Option<i64> {
        self.deal_amount.trim().replace(',', "").parse::<i64>().ok()
    }

    /// Price per square meter of exclusive-use area.
    #[must_use]
    pub fn price_per_area(&self) -> Option<f64> {
        Some(self.amount()? as f64 / self.area()?)
    }
}
