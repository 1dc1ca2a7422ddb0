use crate::constants::HIGH_FIRE_DANGER_INDEX_MIN;
use crate::error::{FireWxError, Result};
use crate::symbology::{
    outlook_style, parse_hex_color, rating_style, PolygonStyle, DARK_ORANGE, DARK_RED,
    DARK_YELLOW, GREEN, INDIGO, ORANGE, PURPLE, RED, YELLOW,
};
use crate::types::{DayCollections, OutlookDay};
use chrono::{Duration, NaiveDate, Utc};
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoValue};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

const IMAGE_SIZE: (u32, u32) = (1280, 720);

// Map extents (x0, x1, y0, y1) in WGS84
const US_EXTENT: (f64, f64, f64, f64) = (-122.006, -71.734, 21.727, 49.879);
const AUSTRALIA_EXTENT: (f64, f64, f64, f64) = (105.339, 161.569, -42.035, -8.568);

fn render_err(e: impl std::fmt::Display) -> FireWxError {
    FireWxError::Render(e.to_string())
}

/// Render the four SPC forecast days as a 2x2 panel of the continental US.
#[instrument(skip(days))]
pub fn render_outlook_maps(days: &[OutlookDay], output_dir: &Path) -> Result<PathBuf> {
    info!("Plotting Storm Prediction Center Fire Weather Outlooks");
    println!("Plotting Storm Prediction Center Fire Weather Outlooks");

    let issued = Utc::now();
    let path = output_dir.join(format!("fire_wx_outlook_spc_{}.png", issued.format("%Y%m%d")));

    {
        let root = BitMapBackend::new(&path, IMAGE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let panel = root
            .titled(
                "Storm Prediction Center Fire Weather Outlooks",
                ("sans-serif", 26),
            )
            .map_err(render_err)?;

        let areas = panel.split_evenly((2, 2));
        for (day, area) in days.iter().zip(areas.iter()) {
            let date = issued + Duration::days(day.day as i64);
            let title = date.format("%A %b %d").to_string();
            draw_outlook_panel(area, day, &title)?;
        }

        draw_legend(
            &root,
            "Fire Weather Outlook",
            &[
                ("Elevated", ORANGE, DARK_ORANGE),
                ("Critical", RED, DARK_RED),
                ("Extreme", PURPLE, INDIGO),
            ],
        )?;
        draw_issued_footer(&root, &issued.format("%Y-%m-%d %H:%M").to_string())?;

        root.present().map_err(render_err)?;
    }

    info!("Fire weather outlook maps saved to {}", path.display());
    println!("Fire Weather Outlook maps completed and saved to outputs folder");
    Ok(path)
}

/// Render up to four days of BOM fire danger ratings as a 2x2 panel of
/// Australia. Only districts at or above the high fire danger index are
/// drawn.
#[instrument(skip(day_collections))]
pub fn render_fire_danger_maps(
    day_collections: &DayCollections,
    output_dir: &Path,
) -> Result<PathBuf> {
    info!("Plotting Bureau of Meteorology Fire Danger Ratings");
    println!("Plotting Bureau of Meteorology Fire Danger Ratings");

    let issued = Utc::now();
    let path = output_dir.join(format!("fire_wx_outlook_bom_{}.png", issued.format("%Y%m%d")));

    {
        let root = BitMapBackend::new(&path, IMAGE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let panel = root
            .titled(
                "Bureau of Meteorology Fire Danger Ratings",
                ("sans-serif", 26),
            )
            .map_err(render_err)?;

        let areas = panel.split_evenly((2, 2));
        for ((date, serialized), area) in day_collections.iter().zip(areas.iter()) {
            let collection: FeatureCollection = serialized.parse()?;
            let title = match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                Ok(parsed) => parsed.format("%A %b %d").to_string(),
                Err(_) => date.clone(),
            };
            draw_fire_danger_panel(area, &collection, &title)?;
        }

        draw_legend(
            &root,
            "Fire Danger",
            &[
                ("High", YELLOW, DARK_YELLOW),
                ("Extreme", ORANGE, DARK_ORANGE),
                ("Catastrophic", RED, DARK_RED),
            ],
        )?;
        draw_issued_footer(&root, &issued.format("%Y-%m-%d %H:%M").to_string())?;

        root.present().map_err(render_err)?;
    }

    info!("Fire danger rating maps saved to {}", path.display());
    println!("Fire Weather Outlook maps completed and saved to outputs folder");
    Ok(path)
}

fn draw_outlook_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    day: &OutlookDay,
    title: &str,
) -> Result<()> {
    let (x0, x1, y0, y1) = US_EXTENT;
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 18))
        .margin(8)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    for collection in [&day.fire_wx_outlook, &day.dry_lightning] {
        for feature in &collection.features {
            let Some(geometry) = feature.geometry.as_ref() else { continue };

            let dn = feature_property(feature, "dn").and_then(Value::as_i64);
            let fallback_edge = feature_property(feature, "fill")
                .and_then(Value::as_str)
                .and_then(parse_hex_color);
            let style = outlook_style(dn, fallback_edge);

            draw_geometry(&mut chart, geometry, style)?;
        }
    }

    if !day.has_fire_wx_risk && !day.has_dry_lightning_risk {
        draw_no_risk_annotation(area)?;
    }

    Ok(())
}

fn draw_fire_danger_panel(
    area: &DrawingArea<BitMapBackend<'_>, Shift>,
    collection: &FeatureCollection,
    title: &str,
) -> Result<()> {
    let (x0, x1, y0, y1) = AUSTRALIA_EXTENT;
    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 18))
        .margin(8)
        .build_cartesian_2d(x0..x1, y0..y1)
        .map_err(render_err)?;

    let mut drew_any = false;

    for feature in &collection.features {
        let Some(geometry) = feature.geometry.as_ref() else { continue };

        let Some(index) = danger_index(feature) else { continue };
        if index < HIGH_FIRE_DANGER_INDEX_MIN {
            continue;
        }

        let rating = danger_rating(feature).unwrap_or_default();
        draw_geometry(&mut chart, geometry, rating_style(&rating))?;
        drew_any = true;
    }

    if !drew_any {
        draw_no_risk_annotation(area)?;
    }

    Ok(())
}

fn draw_geometry(
    chart: &mut ChartContext<'_, BitMapBackend<'_>, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    geometry: &Geometry,
    style: PolygonStyle,
) -> Result<()> {
    for ring in polygon_rings(geometry) {
        if ring.len() < 3 {
            continue;
        }

        if let Some(fill) = style.fill {
            chart
                .draw_series(std::iter::once(Polygon::new(ring.clone(), fill.mix(0.5).filled())))
                .map_err(render_err)?;
        }
        if let Some(edge) = style.edge {
            let mut outline = ring.clone();
            outline.push(ring[0]);
            chart
                .draw_series(std::iter::once(PathElement::new(
                    outline,
                    ShapeStyle::from(&edge).stroke_width(2),
                )))
                .map_err(render_err)?;
        }
    }
    Ok(())
}

/// Exterior rings of a polygon or multipolygon as (lon, lat) point lists.
fn polygon_rings(geometry: &Geometry) -> Vec<Vec<(f64, f64)>> {
    fn ring_points(ring: &[Vec<f64>]) -> Vec<(f64, f64)> {
        ring.iter()
            .filter(|position| position.len() >= 2)
            .map(|position| (position[0], position[1]))
            .collect()
    }

    match &geometry.value {
        GeoValue::Polygon(polygon) => polygon.first().map(|ring| ring_points(ring)).into_iter().collect(),
        GeoValue::MultiPolygon(multi) => multi
            .iter()
            .filter_map(|polygon| polygon.first().map(|ring| ring_points(ring)))
            .collect(),
        GeoValue::GeometryCollection(geometries) => {
            geometries.iter().flat_map(polygon_rings).collect()
        }
        _ => Vec::new(),
    }
}

fn draw_no_risk_annotation(area: &DrawingArea<BitMapBackend<'_>, Shift>) -> Result<()> {
    let (width, height) = area.dim_in_pixel();
    area.draw(&Text::new(
        "Limited Fire Weather Concerns",
        (width as i32 / 2 - 110, height as i32 / 2),
        ("sans-serif", 15).into_font().color(&GREEN),
    ))
    .map_err(render_err)?;
    Ok(())
}

fn draw_legend(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    title: &str,
    entries: &[(&str, RGBColor, RGBColor)],
) -> Result<()> {
    let (width, _) = root.dim_in_pixel();
    let x = width as i32 - 170;
    let mut y = 40;

    root.draw(&Text::new(title.to_string(), (x, y), ("sans-serif", 15)))
        .map_err(render_err)?;
    y += 22;

    for (label, fill, edge) in entries {
        root.draw(&Rectangle::new(
            [(x, y), (x + 18, y + 12)],
            fill.mix(0.5).filled(),
        ))
        .map_err(render_err)?;
        root.draw(&Rectangle::new(
            [(x, y), (x + 18, y + 12)],
            ShapeStyle::from(edge).stroke_width(1),
        ))
        .map_err(render_err)?;
        root.draw(&Text::new(
            label.to_string(),
            (x + 26, y),
            ("sans-serif", 13),
        ))
        .map_err(render_err)?;
        y += 20;
    }

    Ok(())
}

fn draw_issued_footer(root: &DrawingArea<BitMapBackend<'_>, Shift>, timestamp: &str) -> Result<()> {
    let (_, height) = root.dim_in_pixel();
    root.draw(&Text::new(
        format!("Issued: {timestamp} UTC"),
        (10, height as i32 - 18),
        ("sans-serif", 12),
    ))
    .map_err(render_err)?;
    Ok(())
}

fn feature_property<'a>(feature: &'a Feature, key: &str) -> Option<&'a Value> {
    feature.properties.as_ref().and_then(|props| props.get(key))
}

/// The numeric danger index, in the canonical `index` column, a dated
/// `<date>_index` column, or the service's `FireBehavIndex` field.
fn danger_index(feature: &Feature) -> Option<i64> {
    let props = feature.properties.as_ref()?;
    let value = props
        .get("index")
        .or_else(|| props.iter().find(|(key, _)| key.ends_with("_index")).map(|(_, v)| v))
        .or_else(|| props.get("FireBehavIndex"))?;
    value.as_i64().or_else(|| value.as_str()?.trim().parse().ok())
}

/// The rating label, in the canonical `rating` column, a dated
/// `<date>_rating` column, or the service's `FireDanger` field.
fn danger_rating(feature: &Feature) -> Option<String> {
    let props = feature.properties.as_ref()?;
    let value = props
        .get("rating")
        .or_else(|| props.iter().find(|(key, _)| key.ends_with("_rating")).map(|(_, v)| v))
        .or_else(|| props.get("FireDanger"))?;
    value.as_str().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_polygon_rings_takes_exterior_rings() {
        let geometry: Geometry = serde_json::from_value(json!({
            "type": "MultiPolygon",
            "coordinates": [
                [[[140.0, -35.0], [141.0, -35.0], [141.0, -34.0], [140.0, -35.0]]],
                [[[145.0, -36.0], [146.0, -36.0], [146.0, -35.0], [145.0, -36.0]]]
            ]
        }))
        .unwrap();

        let rings = polygon_rings(&geometry);
        assert_eq!(rings.len(), 2);
        assert_eq!(rings[0][0], (140.0, -35.0));
    }

    #[test]
    fn test_danger_index_reads_dated_and_canonical_columns() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": null,
            "properties": { "2025-10-20_index": "78" }
        }))
        .unwrap();
        assert_eq!(danger_index(&feature), Some(78));

        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": null,
            "properties": { "index": 45 }
        }))
        .unwrap();
        assert_eq!(danger_index(&feature), Some(45));
    }

    #[test]
    fn test_danger_rating_falls_back_to_service_field() {
        let feature: Feature = serde_json::from_value(json!({
            "type": "Feature",
            "geometry": null,
            "properties": { "FireDanger": "Extreme" }
        }))
        .unwrap();
        assert_eq!(danger_rating(&feature), Some("Extreme".to_string()));
    }
}
