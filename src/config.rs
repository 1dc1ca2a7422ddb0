use crate::constants::SPC_FORECAST_DAYS;
use crate::error::{FireWxError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One SPC forecast day: the general fire weather outlook layer and the
/// dry lightning layer of the same map service.
#[derive(Debug, Clone, Deserialize)]
pub struct SpcDayUrls {
    pub outlook_url: String,
    pub dry_lightning_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SPC fire weather outlook layers for forecast days 0..=3, in order.
    pub spc_days: Vec<SpcDayUrls>,
    /// BOM fire danger rating pages, one per state, in fetch order.
    pub bom_rating_pages: Vec<String>,
    /// BOM fire weather districts map service (polygons + forecast periods).
    pub bom_districts_url: String,
    /// Directory the rendered maps are written to.
    pub output_dir: String,
}

const SPC_FIREWX_SERVICE: &str =
    "https://mapservices.weather.noaa.gov/vector/rest/services/fire_weather/SPC_firewx/MapServer";

impl Default for Config {
    fn default() -> Self {
        // Layer indices follow the SPC_firewx map service layout: each
        // forecast day groups an outlook layer and a dry lightning layer.
        let spc_days = [(1, 2), (4, 5), (7, 8), (10, 11)]
            .iter()
            .map(|(outlook, lightning)| SpcDayUrls {
                outlook_url: format!("{SPC_FIREWX_SERVICE}/{outlook}"),
                dry_lightning_url: format!("{SPC_FIREWX_SERVICE}/{lightning}"),
            })
            .collect();

        let bom_rating_pages = ["nsw", "vic", "qld", "wa", "sa", "tas", "nt"]
            .iter()
            .map(|state| format!("http://www.bom.gov.au/{state}/forecasts/fire-danger-ratings.shtml"))
            .collect();

        Self {
            spc_days,
            bom_rating_pages,
            bom_districts_url:
                "https://services.arcgis.com/cGd0oJQdA3TAln3w/arcgis/rest/services/Fire_Danger_Ratings/FeatureServer/0"
                    .to_string(),
            output_dir: "outputs".to_string(),
        }
    }
}

impl Config {
    /// Load the configuration from `config.toml`, falling back to the
    /// built-in source URLs when no file is present.
    pub fn load() -> Result<Self> {
        let config_path = "config.toml";
        let config = if Path::new(config_path).exists() {
            let config_content = fs::read_to_string(config_path)?;
            toml::from_str(&config_content)?
        } else {
            Self::default()
        };

        if config.spc_days.len() != SPC_FORECAST_DAYS {
            return Err(FireWxError::Config(format!(
                "expected {} SPC forecast day entries, got {}",
                SPC_FORECAST_DAYS,
                config.spc_days.len()
            )));
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_four_spc_days_and_seven_bom_pages() {
        let config = Config::default();
        assert_eq!(config.spc_days.len(), 4);
        assert_eq!(config.bom_rating_pages.len(), 7);
        assert!(config.spc_days[0].outlook_url.ends_with("/1"));
        assert!(config.spc_days[3].dry_lightning_url.ends_with("/11"));
    }
}
