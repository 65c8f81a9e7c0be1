//! Pipeline commands
//!
//! Each subcommand mirrors one stage of the pipeline and leaves its artifact
//! in the output directory, so stages can be re-run independently:
//!
//! 1. `codes`    → `region_code.csv`
//! 2. `trades`   → `apt_trade.csv`
//! 3. `boundary` → `geo_data.geojson`
//! 4. `dataset`  → `avg_price.csv` + `merge.geojson`

use std::path::PathBuf;

use aptmap_domain::{DEFAULT_CODE_PAGE_SIZE, DEFAULT_TRADE_PAGE_SIZE};
use clap::{Parser, Subcommand};

pub mod boundary;
pub mod codes;
pub mod dataset;
pub mod trades;

pub const REGION_CODE_CSV: &str = "region_code.csv";
pub const APT_TRADE_CSV: &str = "apt_trade.csv";
pub const GEO_DATA_GEOJSON: &str = "geo_data.geojson";
pub const AVG_PRICE_CSV: &str = "avg_price.csv";
pub const MERGE_GEOJSON: &str = "merge.geojson";

#[derive(Parser)]
#[command(name = "aptmap", version, about = "Apartment-trade price-per-area choropleth pipeline")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Directory the pipeline artifacts are written to
    #[arg(long, global = true, default_value = "output")]
    out_dir: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch district-level administrative codes
    Codes {
        /// Locality-name filter, e.g. a province name
        #[arg(long)]
        region: Option<String>,

        #[arg(long, default_value_t = DEFAULT_CODE_PAGE_SIZE)]
        page_size: u32,
    },

    /// Fetch apartment trades for every district over a month range
    Trades {
        /// First contract month, YYYYMM
        #[arg(long, default_value = "202401")]
        from: String,

        /// Last contract month, YYYYMM (inclusive)
        #[arg(long, default_value = "202412")]
        to: String,

        #[arg(long, default_value_t = DEFAULT_TRADE_PAGE_SIZE)]
        page_size: u32,
    },

    /// Fetch administrative boundaries as WGS84 GeoJSON
    Boundary {
        /// Administrative code to fetch below (absent = whole country)
        #[arg(long)]
        adm_cd: Option<String>,

        /// Descent depth: 0 = the region itself, 1 = one level down, 2 = all
        #[arg(long, default_value_t = 1)]
        low_search: u8,

        /// Boundary reference year
        #[arg(long, default_value = "2023")]
        year: String,
    },

    /// Assemble the averaged price dataset and the merged choropleth GeoJSON
    Dataset,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.out_dir)?;

        match self.command {
            Command::Codes { region, page_size } => {
                codes::run(&self.out_dir, region.as_deref(), page_size).await
            }
            Command::Trades { from, to, page_size } => {
                trades::run(&self.out_dir, &from, &to, page_size).await
            }
            Command::Boundary { adm_cd, low_search, year } => {
                boundary::run(&self.out_dir, adm_cd.as_deref(), low_search, &year).await
            }
            Command::Dataset => dataset::run(&self.out_dir),
        }
    }
}
