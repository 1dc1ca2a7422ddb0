#[cfg(test)]
mod tests {
    use chrono::Utc;
    use firewx_maps::reshape::{
        by_forecast_period, has_extreme_or_catastrophic, to_day_collections,
    };
    use geojson::FeatureCollection;
    use serde_json::json;

    fn collection(features: serde_json::Value) -> FeatureCollection {
        json!({ "type": "FeatureCollection", "features": features })
            .to_string()
            .parse()
            .unwrap()
    }

    fn wide_feature(district: &str, state: &str) -> serde_json::Value {
        json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[[140.0, -35.0], [141.0, -35.0], [141.0, -34.0], [140.0, -35.0]]] },
            "properties": {
                "District": district,
                "state": state,
                "Monday_rating": "High",
                "Monday_index": "32",
                "Tuesday_rating": "Extreme",
                "Tuesday_index": "78"
            }
        })
    }

    #[test]
    fn test_wide_table_reshapes_to_one_collection_per_day() {
        let fc = collection(json!([wide_feature("A", "NSW"), wide_feature("B", "VIC")]));

        let day_collections = to_day_collections(&fc).unwrap();
        let keys: Vec<&String> = day_collections.keys().collect();
        assert_eq!(keys, ["Monday", "Tuesday"]);

        for serialized in day_collections.values() {
            let day: FeatureCollection = serialized.parse().unwrap();
            assert_eq!(day.features.len(), 2);
            for feature in &day.features {
                let props = feature.properties.as_ref().unwrap();
                // canonical names, no per-day prefixes left
                assert!(props.contains_key("rating"));
                assert!(props.contains_key("index"));
                assert!(props.keys().all(|key| !key.starts_with("Monday_")));
                assert!(props.keys().all(|key| !key.starts_with("Tuesday_")));
                assert!(feature.geometry.is_some());
            }
        }

        let monday: FeatureCollection = day_collections["Monday"].parse().unwrap();
        let props = monday.features[0].properties.as_ref().unwrap();
        assert_eq!(props["rating"], "High");
        assert_eq!(props["index"], "32");
    }

    #[test]
    fn test_day_keys_are_sorted_ascending() {
        let fc = collection(json!([{
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[[140.0, -35.0], [141.0, -35.0], [141.0, -34.0], [140.0, -35.0]]] },
            "properties": {
                "District": "A",
                "state": "NSW",
                "2025-10-24_rating": "High",
                "2025-10-24_index": "45",
                "2025-10-22_rating": "Moderate",
                "2025-10-22_index": "18",
                "2025-10-23_rating": "High",
                "2025-10-23_index": "41"
            }
        }]));

        let day_collections = to_day_collections(&fc).unwrap();
        let keys: Vec<&String> = day_collections.keys().collect();
        assert_eq!(keys, ["2025-10-22", "2025-10-23", "2025-10-24"]);
    }

    #[test]
    fn test_grouped_response_keys_by_period_start_date() {
        let fc = collection(json!([
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [[[140.0, -35.0], [141.0, -35.0], [141.0, -34.0], [140.0, -35.0]]] },
                "properties": {
                    "DIST_NAME": "Mallee",
                    "Forecast_Period": 1,
                    "Start_Time_UTC_str": "2025-10-22T13:00:00Z"
                }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [[[145.0, -36.0], [146.0, -36.0], [146.0, -35.0], [145.0, -36.0]]] },
                "properties": {
                    "DIST_NAME": "Mallee",
                    "Forecast_Period": 2,
                    "Start_Time_UTC_str": "2025-10-23T13:00:00Z"
                }
            }
        ]));

        let day_collections = by_forecast_period(&fc).unwrap();
        let keys: Vec<&String> = day_collections.keys().collect();
        assert_eq!(keys, ["2025-10-22", "2025-10-23"]);

        // grouped features are serialized as-is, columns intact
        let day: FeatureCollection = day_collections["2025-10-22"].parse().unwrap();
        assert_eq!(day.features.len(), 1);
        let props = day.features[0].properties.as_ref().unwrap();
        assert_eq!(props["Forecast_Period"], 1);
    }

    #[test]
    fn test_no_date_information_falls_back_to_current_date() {
        let fc = collection(json!([{
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": [[[140.0, -35.0], [141.0, -35.0], [141.0, -34.0], [140.0, -35.0]]] },
            "properties": { "District": "A", "state": "NSW" }
        }]));

        let day_collections = to_day_collections(&fc).unwrap();
        assert_eq!(day_collections.len(), 1);
        let key = day_collections.keys().next().unwrap();
        assert_eq!(key, &Utc::now().format("%Y-%m-%d").to_string());
    }

    #[test]
    fn test_has_extreme_or_catastrophic() {
        let calm = collection(json!([wide_feature("A", "NSW")]));
        let mut calm_days = to_day_collections(&calm).unwrap();
        // Monday is "High", Tuesday is "Extreme"
        assert!(has_extreme_or_catastrophic(&calm_days).unwrap());

        calm_days.remove("Tuesday");
        assert!(!has_extreme_or_catastrophic(&calm_days).unwrap());
    }
}
