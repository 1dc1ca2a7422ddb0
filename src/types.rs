use geojson::FeatureCollection;
use std::collections::BTreeMap;

/// One row of a scraped or normalized rating table, keyed by column name.
pub type TableRow = serde_json::Map<String, serde_json::Value>;

/// Day-keyed forecast output: ISO calendar date -> serialized feature
/// collection for that date. BTreeMap keeps the keys in ascending date
/// order, which ISO strings sort by.
pub type DayCollections = BTreeMap<String, String>;

/// A single SPC forecast day: the general outlook and the dry lightning
/// layer, plus whether each actually carries any risk polygons.
#[derive(Debug)]
pub struct OutlookDay {
    pub day: usize,
    pub fire_wx_outlook: FeatureCollection,
    pub dry_lightning: FeatureCollection,
    pub has_fire_wx_risk: bool,
    pub has_dry_lightning_risk: bool,
}
