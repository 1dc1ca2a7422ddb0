use crate::apis::arcgis::ArcGisClient;
use crate::config::Config;
use crate::error::Result;
use crate::types::TableRow;
use geojson::{Feature, FeatureCollection};
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{error, info, instrument};

/// District columns that duplicate information already carried by the
/// scraped rating table (the service's own index/rating pair is staler than
/// the scraped one) or that are internal bookkeeping, dropped after the join.
const DROPPED_COLUMNS: [&str; 13] = [
    "OBJECTID",
    "AAC",
    "DIST_NO",
    "SOURCE",
    "FireBehavIndex",
    "FireDanger",
    "Forecast_Period",
    "Start_Time",
    "End_Time",
    "Start_Time_UTC_str",
    "End_Time_UTC_str",
    "STATE_CODE",
    "DIST_NAME",
];

/// Fetch the fire weather district polygons and join the scraped rating
/// table onto them by (district name, state code).
#[instrument(skip(arcgis, config, rating_table))]
pub async fn merge_districts_and_ratings(
    arcgis: &ArcGisClient,
    config: &Config,
    rating_table: &mut Vec<TableRow>,
) -> Result<FeatureCollection> {
    info!("Fetching fire weather districts");
    println!("Fetching fire weather districts...");

    let districts = arcgis
        .query_geojson(&config.bom_districts_url)
        .await
        .map_err(|e| {
            error!("merge_districts_and_ratings failed fetching districts: {}", e);
            e
        })?;

    let mut districts = dedup_by_area_code(districts);
    apply_district_aliases(&mut districts);
    apply_rating_table_fixups(rating_table);

    let joined = join_ratings(districts, rating_table);
    info!("Joined ratings onto {} district polygons", joined.features.len());
    Ok(joined)
}

/// Keep the first polygon per unique area code (`AAC`), in source order.
/// Features without an area code are kept as-is. Idempotent.
pub fn dedup_by_area_code(collection: FeatureCollection) -> FeatureCollection {
    let mut seen = HashSet::new();
    let features = collection
        .features
        .into_iter()
        .filter(|feature| match property_str(feature, "AAC") {
            Some(aac) => seen.insert(aac.to_string()),
            None => true,
        })
        .collect();

    FeatureCollection {
        bbox: collection.bbox,
        features,
        foreign_members: collection.foreign_members,
    }
}

/// The two known district name mismatches between the polygon service and
/// the rating tables, fixed on the polygon side before matching.
pub fn apply_district_aliases(collection: &mut FeatureCollection) {
    for feature in &mut collection.features {
        let Some(props) = feature.properties.as_mut() else { continue };
        let renamed = match props.get("DIST_NAME").and_then(Value::as_str) {
            Some("Australian Capital Territory") => "The Australian Capital Territory",
            Some("Northern Fire Protection Area") => "Northern Fire Protection Zone",
            _ => continue,
        };
        props.insert("DIST_NAME".to_string(), Value::String(renamed.to_string()));
    }
}

/// The capital territory row is scraped from the NSW page but the polygon
/// carries its own state code; reassign it so the join keys line up.
pub fn apply_rating_table_fixups(rating_table: &mut [TableRow]) {
    for row in rating_table {
        if row.get("District").and_then(Value::as_str) == Some("The Australian Capital Territory") {
            row.insert("state".to_string(), Value::String("ACT".to_string()));
        }
    }
}

/// Left join from polygons: every polygon is kept; matching rating rows
/// contribute their columns, unmatched polygons get nulls for the rating
/// columns. Output carries an EPSG:4326 CRS tag.
pub fn join_ratings(districts: FeatureCollection, rating_table: &[TableRow]) -> FeatureCollection {
    // Union of rating/index column names across the table, so unmatched
    // polygons carry the same (null) columns as matched ones.
    let mut rating_columns: Vec<&String> = rating_table
        .iter()
        .flat_map(|row| row.keys())
        .filter(|key| key.ends_with("_rating") || key.ends_with("_index"))
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    rating_columns.sort();

    let features = districts
        .features
        .into_iter()
        .map(|mut feature| {
            let dist_name = property_str(&feature, "DIST_NAME").map(str::to_string);
            let state_code = property_str(&feature, "STATE_CODE").map(str::to_string);

            let matching_row = rating_table.iter().find(|row| {
                row.get("District").and_then(Value::as_str) == dist_name.as_deref()
                    && row.get("state").and_then(Value::as_str) == state_code.as_deref()
            });

            let props = feature.properties.get_or_insert_with(Default::default);
            match matching_row {
                Some(row) => {
                    for (key, value) in row {
                        props.insert(key.clone(), value.clone());
                    }
                }
                None => {
                    // Kept with null ratings; identity comes from the polygon
                    props.insert(
                        "District".to_string(),
                        dist_name.map_or(Value::Null, Value::String),
                    );
                    props.insert(
                        "state".to_string(),
                        state_code.map_or(Value::Null, Value::String),
                    );
                    for column in &rating_columns {
                        props.insert((*column).clone(), Value::Null);
                    }
                }
            }

            for column in DROPPED_COLUMNS {
                props.remove(column);
            }
            feature
        })
        .collect();

    FeatureCollection {
        bbox: districts.bbox,
        features,
        foreign_members: Some(crs_member()),
    }
}

fn crs_member() -> serde_json::Map<String, Value> {
    let mut members = serde_json::Map::new();
    members.insert(
        "crs".to_string(),
        json!({ "type": "name", "properties": { "name": "EPSG:4326" } }),
    );
    members
}

fn property_str<'a>(feature: &'a Feature, key: &str) -> Option<&'a str> {
    feature
        .properties
        .as_ref()
        .and_then(|props| props.get(key))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn district_feature(aac: &str, dist_name: &str, state_code: &str) -> Feature {
        serde_json::from_value(json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[[140.0, -35.0], [141.0, -35.0], [141.0, -34.0], [140.0, -35.0]]] },
            "properties": {
                "OBJECTID": 1,
                "AAC": aac,
                "DIST_NAME": dist_name,
                "STATE_CODE": state_code,
                "FireDanger": "High",
                "FireBehavIndex": 30
            }
        }))
        .unwrap()
    }

    fn collection(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }

    fn rating_row(district: &str, state: &str) -> TableRow {
        let mut row = TableRow::new();
        row.insert("District".to_string(), json!(district));
        row.insert("state".to_string(), json!(state));
        row.insert("2025-10-20_rating".to_string(), json!("Extreme"));
        row.insert("2025-10-20_index".to_string(), json!("78"));
        row
    }

    #[test]
    fn test_dedup_by_area_code_first_occurrence_wins() {
        let fc = collection(vec![
            district_feature("NSW_FW001", "Mallee", "NSW"),
            district_feature("NSW_FW001", "Mallee Duplicate", "NSW"),
            district_feature("NSW_FW002", "Riverina", "NSW"),
        ]);
        let deduped = dedup_by_area_code(fc);
        assert_eq!(deduped.features.len(), 2);
        assert_eq!(property_str(&deduped.features[0], "DIST_NAME"), Some("Mallee"));
    }

    #[test]
    fn test_dedup_by_area_code_is_idempotent() {
        let fc = collection(vec![
            district_feature("A", "One", "NSW"),
            district_feature("A", "Two", "NSW"),
            district_feature("B", "Three", "VIC"),
        ]);
        let once = dedup_by_area_code(fc);
        let count_once = once.features.len();
        let twice = dedup_by_area_code(once);
        assert_eq!(twice.features.len(), count_once);
    }

    #[test]
    fn test_capital_territory_alias_matches_after_rename() {
        let mut districts = collection(vec![district_feature(
            "ACT_FW001",
            "Australian Capital Territory",
            "ACT",
        )]);
        apply_district_aliases(&mut districts);

        let mut table = vec![rating_row("The Australian Capital Territory", "NSW")];
        apply_rating_table_fixups(&mut table);
        assert_eq!(table[0]["state"], "ACT");

        let joined = join_ratings(districts, &table);
        let props = joined.features[0].properties.as_ref().unwrap();
        assert_eq!(props["2025-10-20_rating"], "Extreme");
        assert_eq!(props["District"], "The Australian Capital Territory");
    }

    #[test]
    fn test_fire_protection_zone_alias() {
        let mut districts = collection(vec![district_feature(
            "TAS_FW004",
            "Northern Fire Protection Area",
            "TAS",
        )]);
        apply_district_aliases(&mut districts);
        assert_eq!(
            property_str(&districts.features[0], "DIST_NAME"),
            Some("Northern Fire Protection Zone")
        );
    }

    #[test]
    fn test_left_join_keeps_every_polygon() {
        let districts = collection(vec![
            district_feature("A", "Mallee", "VIC"),
            district_feature("B", "Wimmera", "VIC"),
            district_feature("C", "Riverina", "NSW"),
        ]);
        let table = vec![rating_row("Mallee", "VIC")];

        let joined = join_ratings(districts, &table);
        assert_eq!(joined.features.len(), 3);

        let matched = joined.features[0].properties.as_ref().unwrap();
        assert_eq!(matched["2025-10-20_index"], "78");

        // unmatched polygons keep null ratings instead of being dropped
        let unmatched = joined.features[1].properties.as_ref().unwrap();
        assert_eq!(unmatched["2025-10-20_rating"], Value::Null);
        assert_eq!(unmatched["District"], "Wimmera");
    }

    #[test]
    fn test_join_drops_bookkeeping_and_stale_rating_columns() {
        let districts = collection(vec![district_feature("A", "Mallee", "VIC")]);
        let joined = join_ratings(districts, &[rating_row("Mallee", "VIC")]);
        let props = joined.features[0].properties.as_ref().unwrap();
        for column in DROPPED_COLUMNS {
            assert!(!props.contains_key(column), "{column} should have been dropped");
        }
    }

    #[test]
    fn test_join_output_carries_wgs84_crs_tag() {
        let joined = join_ratings(collection(vec![]), &[]);
        let members = joined.foreign_members.unwrap();
        assert_eq!(members["crs"]["properties"]["name"], "EPSG:4326");
    }
}
