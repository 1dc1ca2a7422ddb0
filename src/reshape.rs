use crate::error::Result;
use crate::types::DayCollections;
use chrono::Utc;
use geojson::{Feature, FeatureCollection};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Regroup a joined feature collection into a mapping from ISO calendar
/// date to a self-contained, serialized feature collection for that date.
///
/// Server-grouped responses carry an explicit `Forecast_Period` field and
/// are grouped by it; wide tables are split by their `<date>_rating` /
/// `<date>_index` column pairs. If neither yields any date information the
/// whole collection is keyed under the current date.
pub fn to_day_collections(collection: &FeatureCollection) -> Result<DayCollections> {
    let grouped = collection
        .features
        .iter()
        .any(|feature| property(feature, "Forecast_Period").is_some());

    let day_collections = if grouped {
        by_forecast_period(collection)?
    } else {
        by_date_columns(collection)?
    };

    if day_collections.is_empty() {
        warn!("No forecast date information found, keying under the current date");
        let mut fallback = DayCollections::new();
        fallback.insert(
            Utc::now().format("%Y-%m-%d").to_string(),
            serde_json::to_string(collection)?,
        );
        return Ok(fallback);
    }

    info!("Created day-keyed mapping with {} date entries", day_collections.len());
    Ok(day_collections)
}

/// Wide-table path: discover date tokens from the column names, then emit
/// one collection per date holding geometry, the identifying columns and
/// that date's value pair renamed to canonical `rating` / `index`.
pub fn by_date_columns(collection: &FeatureCollection) -> Result<DayCollections> {
    let mut dates: Vec<String> = collection
        .features
        .iter()
        .filter_map(|feature| feature.properties.as_ref())
        .flat_map(|props| props.keys())
        .filter_map(date_token)
        .collect();
    dates.sort();
    dates.dedup();

    let mut day_collections = DayCollections::new();

    for date in dates {
        let features = collection
            .features
            .iter()
            .map(|feature| {
                let mut props = serde_json::Map::new();
                for key in ["District", "state"] {
                    props.insert(
                        key.to_string(),
                        property(feature, key).cloned().unwrap_or(Value::Null),
                    );
                }
                props.insert(
                    "rating".to_string(),
                    property(feature, &format!("{date}_rating"))
                        .cloned()
                        .unwrap_or(Value::Null),
                );
                props.insert(
                    "index".to_string(),
                    property(feature, &format!("{date}_index"))
                        .cloned()
                        .unwrap_or(Value::Null),
                );

                Feature {
                    bbox: feature.bbox.clone(),
                    geometry: feature.geometry.clone(),
                    id: None,
                    properties: Some(props),
                    foreign_members: None,
                }
            })
            .collect();

        let day_collection = FeatureCollection {
            bbox: None,
            features,
            foreign_members: collection.foreign_members.clone(),
        };
        day_collections.insert(date, serde_json::to_string(&day_collection)?);
    }

    Ok(day_collections)
}

/// Grouped-response path: one collection per `Forecast_Period`, keyed by
/// the calendar date of the period's start timestamp (the part before the
/// time separator). Groups without a usable timestamp are skipped.
pub fn by_forecast_period(collection: &FeatureCollection) -> Result<DayCollections> {
    let mut groups: BTreeMap<i64, Vec<Feature>> = BTreeMap::new();
    for feature in &collection.features {
        let Some(period) = property(feature, "Forecast_Period").and_then(Value::as_i64) else {
            continue;
        };
        groups.entry(period).or_default().push(feature.clone());
    }

    let mut day_collections = DayCollections::new();

    for (period, features) in groups {
        let start_time = features
            .first()
            .and_then(|feature| property(feature, "Start_Time_UTC_str"))
            .and_then(Value::as_str)
            .unwrap_or_default();

        if start_time.is_empty() {
            warn!("No Start_Time_UTC_str found for forecast period {}", period);
            continue;
        }

        // Start_Time_UTC_str looks like 2025-10-22T13:00:00Z
        let date = start_time.split('T').next().unwrap_or(start_time).to_string();

        let group_collection = FeatureCollection {
            bbox: None,
            features,
            foreign_members: collection.foreign_members.clone(),
        };
        day_collections.insert(date, serde_json::to_string(&group_collection)?);
    }

    Ok(day_collections)
}

/// True when any day carries an "Extreme" or "Catastrophic" rating, in
/// either the canonical `rating` column or a dated `<date>_rating` one.
pub fn has_extreme_or_catastrophic(day_collections: &DayCollections) -> Result<bool> {
    for serialized in day_collections.values() {
        let collection: FeatureCollection = serialized.parse()?;
        for feature in &collection.features {
            let Some(props) = feature.properties.as_ref() else { continue };
            let extreme = props.iter().any(|(key, value)| {
                (key == "rating" || key.ends_with("_rating"))
                    && matches!(value.as_str(), Some("Extreme") | Some("Catastrophic"))
            });
            if extreme {
                return Ok(true);
            }
        }
    }
    Ok(false)
}

/// The day token of a per-day value column: whatever precedes the
/// `_rating` / `_index` suffix. The normalizer writes ISO dates here, so
/// the tokens sort chronologically as strings.
fn date_token(column: &String) -> Option<String> {
    let prefix = column.strip_suffix("_rating").or_else(|| column.strip_suffix("_index"))?;
    Some(prefix.to_string())
}

fn property<'a>(feature: &'a Feature, key: &str) -> Option<&'a Value> {
    feature.properties.as_ref().and_then(|props| props.get(key))
}
