//! Administrative region code rows
//!
//! The registry returns rows for every level of the administrative hierarchy
//! (province, district, town, village). The choropleth dataset only uses
//! district-level rows: district code present, town and village zeroed.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row of the administrative-code registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCode {
    /// Province code (2 digits)
    pub sido_cd: String,
    /// District code (3 digits, `"000"` at province level)
    pub sgg_cd: String,
    /// Town code (3 digits, `"000"` above town level)
    pub umd_cd: String,
    /// Village code (2 digits, `"00"` above village level)
    pub ri_cd: String,
    /// Full human-readable locality name
    pub locatadd_nm: String,
}

impl RegionCode {
    /// Parse a raw registry record. Rows missing the needed fields are
    /// dropped by returning `None`.
    pub fn from_record(record: &Value) -> Option<Self> {
        serde_json::from_value(record.clone()).ok()
    }

    /// The 5-digit province+district code trade records are keyed by.
    #[must_use]
    pub fn district_key(&self) -> String {
        format!("{}{}", self.sido_cd, self.sgg_cd)
    }

    /// District-level rows: a district code is set while the town and
    /// village positions are zeroed.
    #[must_use]
    pub fn is_district_level(&self) -> bool {
        self.sgg_cd != "000" && self.umd_cd == "000" && self.ri_cd == "00"
    }
}
