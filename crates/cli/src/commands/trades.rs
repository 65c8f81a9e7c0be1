//! `trades`: fetch apartment trades for every district over a month range

use std::path::Path;

use aptmap_core::TradeRecord;
use aptmap_infra::DatagokrClient;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{APT_TRADE_CSV, REGION_CODE_CSV};

/// One row of `region_code.csv` (read back from the `codes` stage).
#[derive(Debug, Deserialize)]
struct DistrictRow {
    sido_sgg: String,
    locatadd_nm: String,
}

/// One row of `apt_trade.csv`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TradeRow {
    pub region_code: String,
    pub deal_year: String,
    pub deal_month: String,
    pub deal_kind: String,
    pub neighborhood: String,
    pub complex_name: String,
    pub exclusive_area: String,
    pub deal_amount: String,
}

impl From<TradeRecord> for TradeRow {
    fn from(record: TradeRecord) -> Self {
        Self {
            region_code: record.region_code,
            deal_year: record.deal_year.unwrap_or_default(),
            deal_month: record.deal_month.unwrap_or_default(),
            deal_kind: record.deal_kind.unwrap_or_default(),
            neighborhood: record.neighborhood.unwrap_or_default(),
            complex_name: record.complex_name.unwrap_or_default(),
            exclusive_area: record.exclusive_area,
            deal_amount: record.deal_amount,
        }
    }
}

pub async fn run(out_dir: &Path, from: &str, to: &str, page_size: u32) -> anyhow::Result<()> {
    let months = month_range(from, to)?;

    let districts_path = out_dir.join(REGION_CODE_CSV);
    let mut districts: Vec<DistrictRow> = Vec::new();
    for row in csv::Reader::from_path(&districts_path)?.deserialize() {
        districts.push(row?);
    }
    anyhow::ensure!(
        !districts.is_empty(),
        "{} holds no districts; run the codes stage first",
        districts_path.display()
    );

    let config = aptmap_infra::config::load()?;
    let client = DatagokrClient::new(config.datago)?;

    let out_path = out_dir.join(APT_TRADE_CSV);
    let mut writer = csv::Writer::from_path(&out_path)?;
    let mut kept: u64 = 0;

    for district in &districts {
        for month in &months {
            let records = client.lookup_trades(&district.sido_sgg, month, page_size).await?;
            for record in &records {
                // Rows with missing price fields or a cancellation date
                // never reach the dataset.
                let Some(trade) = TradeRecord::from_record(record) else { continue };
                if trade.is_cancelled() {
                    continue;
                }
                writer.serialize(TradeRow::from(trade))?;
                kept += 1;
            }
        }
        info!(district = %district.locatadd_nm, months = months.len(), "district fetched");
    }
    writer.flush()?;

    info!(trades = kept, path = %out_path.display(), "wrote apartment trades");
    Ok(())
}

/// Expand an inclusive `YYYYMM` range into its months.
fn month_range(from: &str, to: &str) -> anyhow::Result<Vec<String>> {
    let parse = |value: &str| -> anyhow::Result<(u32, u32)> {
        anyhow::ensure!(
            value.len() == 6 && value.bytes().all(|b| b.is_ascii_digit()),
            "contract month must be YYYYMM, got {value:?}"
        );
        let year: u32 = value[..4].parse()?;
        let month: u32 = value[4..].parse()?;
        anyhow::ensure!((1..=12).contains(&month), "month out of range in {value:?}");
        Ok((year, month))
    };

    let (from_year, from_month) = parse(from)?;
    let (to_year, to_month) = parse(to)?;
    anyhow::ensure!(
        (from_year, from_month) <= (to_year, to_month),
        "month range {from}..{to} is inverted"
    );

    let mut months = Vec::new();
    let (mut year, mut month) = (from_year, from_month);
    while (year, month) <= (to_year, to_month) {
        months.push(format!("{year}{month:02}"));
        month += 1;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }
    Ok(months)
}
