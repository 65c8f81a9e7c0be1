//! Merging district price averages into the boundary feature collection

use geojson::{Feature, FeatureCollection, JsonObject, JsonValue};

use crate::pricing::DistrictPrice;

/// Inner-join `prices` into `boundaries` on the locality name.
///
/// Features whose `adm_nm` matches a district's `locatadd_nm` are kept with
/// their properties replaced by `{adm_nm, avg_area, avg_price}`; everything
/// else (unmatched features, features without a name) is dropped, matching
/// an inner join.
pub fn merge_prices_into_boundaries(
    boundaries: FeatureCollection,
    prices: &[DistrictPrice],
) -> FeatureCollection {
    let features = boundaries
        .features
        .into_iter()
        .filter_map(|feature| {
            let name = feature
                .properties
                .as_ref()
                .and_then(|props| props.get("adm_nm"))
                .and_then(JsonValue::as_str)?;
            let price = prices.iter().find(|p| p.locatadd_nm == name)?;

            let mut properties = JsonObject::new();
            properties.insert("adm_nm".to_string(), JsonValue::from(name));
            properties.insert("avg_area".to_string(), JsonValue::from(price.avg_area));
            properties.insert("avg_price".to_string(), JsonValue::from(price.avg_price));

            Some(Feature {
                bbox: None,
                geometry: feature.geometry,
                id: None,
                properties: Some(properties),
                foreign_members: None,
            })
        })
        .collect();

    FeatureCollection { bbox: None, features, foreign_members: None }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use geojson::GeoJson;

    use super::*;

    fn boundary_collection() -> FeatureCollection {
        let parsed = GeoJson::from_str(
            r#"{
                "type": "FeatureCollection",
                "features": [
                    {
                        "type": "Feature",
                        "geometry": {"type": "Point", "coordinates": [126.98, 37.57]},
                        "properties": {"adm_cd": "11010", "adm_nm": "서울특별시 종로구", "addr_en": "Jongno-gu"}
                    },
                    {
                        "type": "Feature",
                        "geometry": {"type": "Point", "coordinates": [127.0, 37.56]},
                        "properties": {"adm_cd": "11020", "adm_nm": "서울특별시 중구", "addr_en": "Jung-gu"}
                    }
                ]
            }"#,
        )
        .unwrap();
        FeatureCollection::try_from(parsed).unwrap()
    }

    #[test]
    fn keeps_only_matched_features_with_price_properties() {
        let prices = vec![DistrictPrice {
            sido_sgg: "11110".to_string(),
            locatadd_nm: "서울특별시 종로구".to_string(),
            avg_area: 75.0,
            avg_price: 750.0,
        }];

        let merged = merge_prices_into_boundaries(boundary_collection(), &prices);

        assert_eq!(merged.features.len(), 1);
        let props = merged.features[0].properties.as_ref().unwrap();
        assert_eq!(props.get("adm_nm").unwrap(), "서울특별시 종로구");
        assert_eq!(props.get("avg_area").unwrap().as_f64(), Some(75.0));
        assert_eq!(props.get("avg_price").unwrap().as_f64(), Some(750.0));
        // Columns outside the merged schema are gone.
        assert!(props.get("adm_cd").is_none());
        assert!(props.get("addr_en").is_none());
        // Geometry is carried through untouched.
        assert!(merged.features[0].geometry.is_some());
    }

    #[test]
    fn no_matches_yields_an_empty_collection() {
        let merged = merge_prices_into_boundaries(boundary_collection(), &[]);
        assert!(merged.features.is_empty());
    }
}
