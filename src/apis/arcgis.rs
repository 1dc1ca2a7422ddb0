use crate::error::Result;
use geojson::FeatureCollection;
use std::time::Duration;
use tracing::{debug, instrument};

/// Query parameters that return every feature with geometry as GeoJSON.
const GEOJSON_QUERY_PARAMS: [(&str, &str); 4] = [
    ("f", "geojson"),
    ("where", "1=1"),
    ("outFields", "*"),
    ("returnGeometry", "true"),
];

/// Thin client for ArcGIS map/feature service layers. One reusable
/// `reqwest::Client`; no retry, a failed request aborts the run.
pub struct ArcGisClient {
    client: reqwest::Client,
}

impl ArcGisClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Fetch all features of a service layer as a GeoJSON feature
    /// collection via the layer's `/query` endpoint.
    #[instrument(skip(self))]
    pub async fn query_geojson(&self, url: &str) -> Result<FeatureCollection> {
        let query_url = format!("{url}/query");

        let response = self
            .client
            .get(&query_url)
            .query(&GEOJSON_QUERY_PARAMS)
            .timeout(Duration::from_secs(60))
            .send()
            .await?
            .error_for_status()?;

        let body = response.text().await?;
        let collection: FeatureCollection = body.parse()?;

        debug!("Fetched {} features from {}", collection.features.len(), url);
        Ok(collection)
    }
}

impl Default for ArcGisClient {
    fn default() -> Self {
        Self::new()
    }
}
