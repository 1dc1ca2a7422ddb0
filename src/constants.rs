/// Number of forecast days fetched from the SPC map service (days 0..=3).
pub const SPC_FORECAST_DAYS: usize = 4;

/// Fire danger index at or above which a district is drawn on the map.
pub const HIGH_FIRE_DANGER_INDEX_MIN: i64 = 41;

/// Australian state codes, in the fixed order the rating pages are fetched.
pub const AUSTRALIAN_STATE_CODES: [&str; 7] = ["NSW", "VIC", "QLD", "WA", "SA", "TAS", "NT"];

/// Derive the state code for a BOM rating page from its URL.
///
/// The pages live under a state path segment (e.g. `/nsw/forecasts/...`),
/// so an exact substring match on the fixed set of segments is enough.
pub fn state_code_for_url(url: &str) -> Option<&'static str> {
    AUSTRALIAN_STATE_CODES
        .iter()
        .find(|code| url.contains(&format!("/{}/", code.to_ascii_lowercase())))
        .copied()
}
