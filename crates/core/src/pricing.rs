//! Price-per-area aggregation and the region-name join

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::region::RegionCode;
use crate::trade::TradeRecord;

/// Mean area and mean price-per-area for one district code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionAverage {
    pub region_code: String,
    /// Mean exclusive-use area (m²)
    pub avg_area: f64,
    /// Mean price per m² (10,000 KRW)
    pub avg_price: f64,
}

/// A district average joined with its locality name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictPrice {
    pub sido_sgg: String,
    pub locatadd_nm: String,
    pub avg_area: f64,
    pub avg_price: f64,
}

/// Group live (non-cancelled, parsable) trades by district code and average
/// their area and price-per-area. Output is sorted by district code.
pub fn average_by_region(trades: &[TradeRecord]) -> Vec<RegionAverage> {
    let mut sums: BTreeMap<&str, (f64, f64, u64)> = BTreeMap::new();

    for trade in trades {
        if trade.is_cancelled() {
            continue;
        }
        let (Some(area), Some(price)) = (trade.area(), trade.price_per_area()) else {
            continue;
        };
        let entry = sums.entry(trade.region_code.as_str()).or_insert((0.0, 0.0, 0));
        entry.0 += area;
        entry.1 += price;
        entry.2 += 1;
    }

    sums.into_iter()
        .map(|(code, (area_sum, price_sum, n))| RegionAverage {
            region_code: code.to_string(),
            avg_area: area_sum / n as f64,
            avg_price: price_sum / n as f64,
        })
        .collect()
}

/// Inner-join district averages with district-level region names. Averages
/// without a matching district row are dropped; output is sorted by locality
/// name.
pub fn join_with_regions(
    averages: &[RegionAverage],
    regions: &[RegionCode],
) -> Vec<DistrictPrice> {
    let names: BTreeMap<String, &str> = regions
        .iter()
        .filter(|r| r.is_district_level())
        .map(|r| (r.district_key(), r.locatadd_nm.as_str()))
        .collect();

    let mut joined: Vec<DistrictPrice> = averages
        .iter()
        .filter_map(|avg| {
            names.get(&avg.region_code).map(|name| DistrictPrice {
                sido_sgg: avg.region_code.clone(),
                locatadd_nm: (*name).to_string(),
                avg_area: avg.avg_area,
                avg_price: avg.avg_price,
            })
        })
        .collect();

    joined.sort_by(|a, b| a.locatadd_nm.cmp(&b.locatadd_nm));
    joined
}
