use plotters::style::RGBColor;

// Display palette shared by both map panels
pub const ORANGE: RGBColor = RGBColor(255, 165, 0);
pub const DARK_ORANGE: RGBColor = RGBColor(255, 140, 0);
pub const RED: RGBColor = RGBColor(255, 0, 0);
pub const DARK_RED: RGBColor = RGBColor(139, 0, 0);
pub const PURPLE: RGBColor = RGBColor(128, 0, 128);
pub const INDIGO: RGBColor = RGBColor(75, 0, 130);
pub const YELLOW: RGBColor = RGBColor(255, 255, 0);
pub const DARK_YELLOW: RGBColor = RGBColor(204, 204, 0);
pub const GREEN: RGBColor = RGBColor(0, 128, 0);

/// Fill and edge colors for one polygon. `None` draws nothing for that part.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonStyle {
    pub fill: Option<RGBColor>,
    pub edge: Option<RGBColor>,
}

/// Symbology for the SPC outlook layers, keyed by the numeric danger code.
///
/// Codes outside the lookup are "no risk": transparent fill with the
/// feature's own fill color (when it has one) as the edge. A pure lookup
/// with an explicit default, never an error.
pub fn outlook_style(dn: Option<i64>, fallback_edge: Option<RGBColor>) -> PolygonStyle {
    match dn {
        Some(5) => PolygonStyle {
            fill: Some(ORANGE),
            edge: Some(DARK_ORANGE),
        },
        Some(8) => PolygonStyle {
            fill: Some(RED),
            edge: Some(DARK_RED),
        },
        Some(10) => PolygonStyle {
            fill: Some(PURPLE),
            edge: Some(INDIGO),
        },
        _ => PolygonStyle {
            fill: None,
            edge: fallback_edge,
        },
    }
}

/// Symbology for the BOM fire danger ratings, keyed by the category label.
/// Labels outside the three-tier scheme default to the catastrophic colors.
pub fn rating_style(rating: &str) -> PolygonStyle {
    match rating {
        "High" => PolygonStyle {
            fill: Some(YELLOW),
            edge: Some(DARK_YELLOW),
        },
        "Extreme" => PolygonStyle {
            fill: Some(ORANGE),
            edge: Some(DARK_ORANGE),
        },
        _ => PolygonStyle {
            fill: Some(RED),
            edge: Some(DARK_RED),
        },
    }
}

/// Parse a `#RRGGBB` color string, as carried in the SPC `fill` property.
/// Blank or malformed values yield `None`.
pub fn parse_hex_color(text: &str) -> Option<RGBColor> {
    let hex = text.trim().strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(RGBColor(r, g, b))
}
