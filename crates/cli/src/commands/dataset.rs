//! `dataset`: assemble the averaged price table and the merged GeoJSON

use std::path::Path;
use std::str::FromStr;

use aptmap_core::{
    average_by_region, join_with_regions, merge_prices_into_boundaries, RegionCode, TradeRecord,
};
use geojson::{FeatureCollection, GeoJson};
use serde::Deserialize;
use tracing::info;

use super::trades::TradeRow;
use super::{APT_TRADE_CSV, AVG_PRICE_CSV, GEO_DATA_GEOJSON, MERGE_GEOJSON, REGION_CODE_CSV};

#[derive(Debug, Deserialize)]
struct DistrictRow {
    sido_sgg: String,
    locatadd_nm: String,
}

pub fn run(out_dir: &Path) -> anyhow::Result<()> {
    let trades = read_trades(&out_dir.join(APT_TRADE_CSV))?;
    let regions = read_regions(&out_dir.join(REGION_CODE_CSV))?;

    let averages = average_by_region(&trades);
    let prices = join_with_regions(&averages, &regions);
    anyhow::ensure!(!prices.is_empty(), "no districts with both trades and a region name");

    let avg_path = out_dir.join(AVG_PRICE_CSV);
    let mut writer = csv::Writer::from_path(&avg_path)?;
    for price in &prices {
        writer.serialize(price)?;
    }
    writer.flush()?;
    info!(districts = prices.len(), path = %avg_path.display(), "wrote price averages");

    let boundary_raw = std::fs::read_to_string(out_dir.join(GEO_DATA_GEOJSON))?;
    let boundaries = FeatureCollection::try_from(GeoJson::from_str(&boundary_raw)?)?;
    let merged = merge_prices_into_boundaries(boundaries, &prices);

    let merge_path = out_dir.join(MERGE_GEOJSON);
    std::fs::write(&merge_path, serde_json::to_string_pretty(&merged)?)?;
    info!(features = merged.features.len(), path = %merge_path.display(), "wrote merged dataset");

    Ok(())
}

fn read_trades(path: &Path) -> anyhow::Result<Vec<TradeRecord>> {
    let mut trades = Vec::new();
    for row in csv::Reader::from_path(path)?.deserialize() {
        let row: TradeRow = row?;
        trades.push(TradeRecord {
            region_code: row.region_code,
            deal_year: Some(row.deal_year),
            deal_month: Some(row.deal_month),
            deal_kind: Some(row.deal_kind),
            neighborhood: Some(row.neighborhood),
            complex_name: Some(row.complex_name),
            exclusive_area: row.exclusive_area,
            deal_amount: row.deal_amount,
            // The trades stage already dropped cancelled deals.
            cancelled_on: None,
        });
    }
    Ok(trades)
}

fn read_regions(path: &Path) -> anyhow::Result<Vec<RegionCode>> {
    let mut regions = Vec::new();
    for row in csv::Reader::from_path(path)?.deserialize() {
        let row: DistrictRow = row?;
        anyhow::ensure!(
            row.sido_sgg.len() == 5 && row.sido_sgg.bytes().all(|b| b.is_ascii_digit()),
            "malformed district code {:?} in {}",
            row.sido_sgg,
            path.display()
        );
        regions.push(RegionCode {
            sido_cd: row.sido_sgg[..2].to_string(),
            sgg_cd: row.sido_sgg[2..].to_string(),
            umd_cd: "000".to_string(),
            ri_cd: "00".to_string(),
            locatadd_nm: row.locatadd_nm,
        });
    }
    Ok(regions)
}
