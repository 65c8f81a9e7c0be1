//! Boundary re-projection and property restriction
//!
//! The boundary endpoint serves coordinates in the service's native planar
//! reference (UTM-K, EPSG:5179). Downstream consumers expect geographic
//! WGS84 (EPSG:4326) in decimal degrees, with each feature restricted to the
//! `adm_cd`/`adm_nm`/`addr_en` columns. The projection math itself is
//! delegated to `proj4rs`; this module only walks the coordinates and tags
//! them correctly.

use std::str::FromStr;

use aptmap_domain::{AptMapError, Result};
use geojson::{FeatureCollection, GeoJson, Geometry, JsonObject};
use proj4rs::Proj;

/// UTM-K (GRS80), the service's native planar reference.
const UTMK_DEFINITION: &str = "+proj=tmerc +lat_0=38 +lon_0=127.5 +k=0.9996 \
     +x_0=1000000 +y_0=2000000 +ellps=GRS80 +towgs84=0,0,0,0,0,0,0 +units=m +no_defs";

/// Geographic WGS84 output reference.
const WGS84_DEFINITION: &str = "+proj=longlat +ellps=WGS84 +datum=WGS84 +no_defs";

const KEPT_PROPERTIES: [&str; 3] = ["adm_cd", "adm_nm", "addr_en"];

/// Re-project a boundary feature collection to WGS84, restrict its
/// properties, and serialize it compactly.
pub(crate) fn reproject_to_wgs84(body: &str) -> Result<String> {
    let parsed = GeoJson::from_str(body).map_err(|e| {
        AptMapError::MalformedResponse(format!("boundary payload is not GeoJSON: {e}"))
    })?;
    let mut collection = FeatureCollection::try_from(parsed).map_err(|e| {
        AptMapError::MalformedResponse(format!(
            "boundary payload is not a feature collection: {e}"
        ))
    })?;

    let source = projection(UTMK_DEFINITION)?;
    let target = projection(WGS84_DEFINITION)?;

    for feature in &mut collection.features {
        if let Some(geometry) = feature.geometry.as_mut() {
            reproject_geometry(geometry, &source, &target)?;
        }
        feature.id = None;
        feature.properties = feature.properties.take().map(restrict_properties);
    }

    serde_json::to_string(&collection)
        .map_err(|e| AptMapError::Internal(format!("failed to serialize boundaries: {e}")))
}

fn projection(definition: &str) -> Result<Proj> {
    Proj::from_proj_string(definition)
        .map_err(|e| AptMapError::Internal(format!("invalid projection definition: {e}")))
}

fn restrict_properties(properties: JsonObject) -> JsonObject {
    let mut kept = JsonObject::new();
    for key in KEPT_PROPERTIES {
        if let Some(value) = properties.get(key) {
            kept.insert(key.to_string(), value.clone());
        }
    }
    kept
}

fn reproject_geometry(geometry: &mut Geometry, source: &Proj, target: &Proj) -> Result<()> {
    match &mut geometry.value {
        geojson::Value::Point(position) => reproject_position(position, source, target)?,
        geojson::Value::MultiPoint(positions) | geojson::Value::LineString(positions) => {
            for position in positions {
                reproject_position(position, source, target)?;
            }
        }
        geojson::Value::MultiLineString(lines) | geojson::Value::Polygon(lines) => {
            for line in lines {
                for position in line {
                    reproject_position(position, source, target)?;
                }
            }
        }
        geojson::Value::MultiPolygon(polygons) => {
            for polygon in polygons {
                for ring in polygon {
                    for position in ring {
                        reproject_position(position, source, target)?;
                    }
                }
            }
        }
        geojson::Value::GeometryCollection(members) => {
            for member in members {
                reproject_geometry(member, source, target)?;
            }
        }
    }
    Ok(())
}

fn reproject_position(position: &mut Vec<f64>, source: &Proj, target: &Proj) -> Result<()> {
    if position.len() < 2 {
        return Err(AptMapError::MalformedResponse(
            "boundary coordinate has fewer than two components".to_string(),
        ));
    }

    let mut point = (position[0], position[1], 0.0);
    proj4rs::transform::transform(source, target, &mut point)
        .map_err(|e| AptMapError::Internal(format!("projection failed: {e}")))?;

    // Geographic output comes back in radians.
    position[0] = point.0.to_degrees();
    position[1] = point.1.to_degrees();
    Ok(())
}
