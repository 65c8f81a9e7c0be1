//! `codes`: fetch district-level administrative codes

use std::path::Path;

use aptmap_core::RegionCode;
use aptmap_infra::DatagokrClient;
use serde::Serialize;
use tracing::info;

use super::REGION_CODE_CSV;

/// One row of `region_code.csv`.
#[derive(Debug, Serialize)]
pub struct DistrictCodeRow {
    pub sido_sgg: String,
    pub locatadd_nm: String,
}

pub async fn run(out_dir: &Path, region: Option<&str>, page_size: u32) -> anyhow::Result<()> {
    let config = aptmap_infra::config::load()?;
    let client = DatagokrClient::new(config.datago)?;

    let records = client.lookup_codes(region, page_size).await?;
    let rows = district_rows(&records);

    let out_path = out_dir.join(REGION_CODE_CSV);
    let mut writer = csv::Writer::from_path(&out_path)?;
    for row in &rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(districts = rows.len(), path = %out_path.display(), "wrote district codes");
    Ok(())
}

/// Keep district-level rows only, sorted by locality name.
fn district_rows(records: &[serde_json::Value]) -> Vec<DistrictCodeRow> {
    let mut rows: Vec<DistrictCodeRow> = records
        .iter()
        .filter_map(RegionCode::from_record)
        .filter(RegionCode::is_district_level)
        .map(|region| DistrictCodeRow {
            sido_sgg: region.district_key(),
            locatadd_nm: region.locatadd_nm,
        })
        .collect();

    rows.sort_by(|a, b| a.locatadd_nm.cmp(&b.locatadd_nm));
    rows
}
