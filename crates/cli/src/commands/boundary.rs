//! `boundary`: fetch administrative boundaries as WGS84 GeoJSON

use std::path::Path;

use aptmap_infra::{LowSearch, SgisClient};
use tracing::info;

use super::GEO_DATA_GEOJSON;

pub async fn run(
    out_dir: &Path,
    adm_cd: Option<&str>,
    low_search: u8,
    year: &str,
) -> anyhow::Result<()> {
    let depth = match low_search {
        0 => LowSearch::Exact,
        1 => LowSearch::Children,
        2 => LowSearch::Descendants,
        other => anyhow::bail!("low_search must be 0, 1 or 2, got {other}"),
    };

    let config = aptmap_infra::config::load()?;
    let client = SgisClient::new(config.sgis)?;

    let collection = client.boundary(adm_cd, depth, year).await?;

    let out_path = out_dir.join(GEO_DATA_GEOJSON);
    std::fs::write(&out_path, &collection)?;

    info!(bytes = collection.len(), path = %out_path.display(), "wrote boundaries");
    Ok(())
}
