use crate::apis::arcgis::ArcGisClient;
use crate::config::Config;
use crate::error::Result;
use crate::types::OutlookDay;
use geojson::FeatureCollection;
use tracing::{error, info, instrument};

/// Fetches the Storm Prediction Center fire weather outlooks for forecast
/// days 0..=3. Each day pairs a general outlook layer with a dry lightning
/// layer on the same map service.
pub struct SpcOutlookClient {
    arcgis: ArcGisClient,
}

impl SpcOutlookClient {
    pub fn new() -> Self {
        Self {
            arcgis: ArcGisClient::new(),
        }
    }

    /// Fetch all four forecast days, one layer at a time in fixed order.
    #[instrument(skip(self, config))]
    pub async fn fetch_outlooks(&self, config: &Config) -> Result<Vec<OutlookDay>> {
        info!("Getting Storm Prediction Center Fire Weather Outlooks");
        println!("Getting Storm Prediction Center Fire Weather Outlooks");

        let mut days = Vec::with_capacity(config.spc_days.len());

        for (day, urls) in config.spc_days.iter().enumerate() {
            let fire_wx_outlook = self.arcgis.query_geojson(&urls.outlook_url).await.map_err(|e| {
                error!("fetch_outlooks failed for day {} outlook layer: {}", day, e);
                e
            })?;
            let dry_lightning = self
                .arcgis
                .query_geojson(&urls.dry_lightning_url)
                .await
                .map_err(|e| {
                    error!("fetch_outlooks failed for day {} dry lightning layer: {}", day, e);
                    e
                })?;

            let has_fire_wx_risk = has_risk_features(&fire_wx_outlook);
            let has_dry_lightning_risk = has_risk_features(&dry_lightning);

            let status = match (has_fire_wx_risk, has_dry_lightning_risk) {
                (true, true) => "Both fire weather outlooks and dry lightning risk areas found",
                (true, false) => "Fire weather outlooks found (no dry lightning risk)",
                (false, true) => "Dry lightning risk areas found (no general fire weather outlooks)",
                (false, false) => "No active fire weather outlooks (no elevated fire weather conditions)",
            };
            info!("Day {}: {}", day + 1, status);
            println!("  Day {}: {}", day + 1, status);

            days.push(OutlookDay {
                day,
                fire_wx_outlook,
                dry_lightning,
                has_fire_wx_risk,
                has_dry_lightning_risk,
            });
        }

        log_summary(&days);
        Ok(days)
    }
}

impl Default for SpcOutlookClient {
    fn default() -> Self {
        Self::new()
    }
}

/// True when the collection has at least one feature with real geometry and
/// an actual risk code (`dn` present and nonzero). Layers with no current
/// risk still return features, just with dn == 0 or empty geometry.
pub fn has_risk_features(collection: &FeatureCollection) -> bool {
    collection.features.iter().any(|feature| {
        feature.geometry.is_some()
            && feature
                .properties
                .as_ref()
                .and_then(|props| props.get("dn"))
                .and_then(|dn| dn.as_i64())
                .is_some_and(|dn| dn != 0)
    })
}

fn log_summary(days: &[OutlookDay]) {
    let fire_wx_days = days.iter().filter(|d| d.has_fire_wx_risk).count();
    let dry_lightning_days = days.iter().filter(|d| d.has_dry_lightning_risk).count();

    if fire_wx_days == 0 && dry_lightning_days == 0 {
        println!("  No active fire weather outlooks found for any forecast day.");
        println!("  This is normal when there are no elevated fire weather conditions expected.");
    } else {
        println!(
            "  Summary: {} day(s) with fire weather outlooks, {} day(s) with dry lightning risk",
            fire_wx_days, dry_lightning_days
        );
    }
}
