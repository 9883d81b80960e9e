//! Styled map overlays built from feature collections.

use crate::feature::{Feature, FeatureCollection, Geometry, Position};
use crate::projection::{point_geometry, to_web_mercator, GeoBounds};
use crate::source::LayerKind;
use crate::style::{self, MarkerStyle, ShapeStyle};
use geo_types::Coord;
use log::debug;
use serde_json::Value;

/// Popup text attached to a map item, as label/value rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Popup {
    pub rows: Vec<(String, String)>,
}

impl Popup {
    pub fn text(&self) -> String {
        self.rows
            .iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn hotspot(feature: &Feature) -> Self {
        let field = |value: Option<String>| value.unwrap_or_else(|| "n/a".to_string());
        Self {
            rows: vec![
                ("Fecha".into(), field(feature.acq_date())),
                ("Hora".into(), field(feature.acq_time())),
                ("Satélite".into(), field(feature.display_property("satellite"))),
                ("Confianza".into(), field(feature.display_property("confidence"))),
                ("FRP".into(), field(feature.display_property("frp"))),
            ],
        }
    }

    fn all_properties(feature: &Feature) -> Self {
        let rows = feature
            .properties
            .iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), text)
            })
            .collect();
        Self { rows }
    }
}

/// One drawable item, with coordinates already projected to Web Mercator meters.
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayItem {
    Marker {
        position: Coord<f64>,
        style: MarkerStyle,
        popup: Popup,
    },
    Shape {
        rings: Vec<Vec<Coord<f64>>>,
        closed: bool,
        style: ShapeStyle,
        popup: Popup,
    },
}

/// A styled layer ready to be mapped onto the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub kind: LayerKind,
    pub layer: String,
    pub items: Vec<OverlayItem>,
    /// Geographic extent of every item, used to fit the view.
    pub bounds: Option<GeoBounds>,
}

impl Overlay {
    /// Builds the overlay for a layer of the given kind.
    pub fn build(kind: LayerKind, layer: &str, collection: &FeatureCollection) -> Self {
        let mut items = Vec::with_capacity(collection.len());
        let mut geo_coords = Vec::new();

        for feature in &collection.features {
            let before = items.len();
            match kind {
                LayerKind::Hotspots => push_hotspot(feature, &mut items, &mut geo_coords),
                LayerKind::Selector => push_selector(feature, &mut items, &mut geo_coords),
            }
            if items.len() == before {
                debug!("feature without drawable geometry skipped in {layer}");
            }
        }

        Self {
            kind,
            layer: layer.to_string(),
            items,
            bounds: GeoBounds::enclosing(geo_coords),
        }
    }

    pub fn marker_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| matches!(item, OverlayItem::Marker { .. }))
            .count()
    }

    pub fn shape_count(&self) -> usize {
        self.items.len() - self.marker_count()
    }
}

fn push_hotspot(feature: &Feature, items: &mut Vec<OverlayItem>, geo: &mut Vec<Coord<f64>>) {
    if let Some(location) = feature.location() {
        geo.push(location);
        items.push(OverlayItem::Marker {
            position: point_geometry(location.x, location.y),
            style: style::hotspot_marker_style(feature),
            popup: Popup::hotspot(feature),
        });
    } else if let Some(geometry) = &feature.geometry {
        push_shapes(geometry, Popup::hotspot(feature), items, geo);
    }
}

fn push_selector(feature: &Feature, items: &mut Vec<OverlayItem>, geo: &mut Vec<Coord<f64>>) {
    let popup = Popup::all_properties(feature);
    match &feature.geometry {
        Some(Geometry::Point(position)) => {
            push_marker(position, feature, popup, items, geo);
        }
        Some(Geometry::MultiPoint(positions)) => {
            for position in positions {
                push_marker(position, feature, popup.clone(), items, geo);
            }
        }
        Some(geometry) => push_shapes(geometry, popup, items, geo),
        None => {
            if let Some(location) = feature.location() {
                geo.push(location);
                items.push(OverlayItem::Marker {
                    position: to_web_mercator(location),
                    style: style::selector_point_style(feature),
                    popup,
                });
            }
        }
    }
}

fn push_marker(
    position: &Position,
    feature: &Feature,
    popup: Popup,
    items: &mut Vec<OverlayItem>,
    geo: &mut Vec<Coord<f64>>,
) {
    if let Some(coord) = Geometry::coord(position) {
        geo.push(coord);
        items.push(OverlayItem::Marker {
            position: to_web_mercator(coord),
            style: style::selector_point_style(feature),
            popup,
        });
    }
}

fn push_shapes(
    geometry: &Geometry,
    popup: Popup,
    items: &mut Vec<OverlayItem>,
    geo: &mut Vec<Coord<f64>>,
) {
    let (parts, closed): (Vec<&Vec<Position>>, bool) = match geometry {
        Geometry::LineString(line) => (vec![line], false),
        Geometry::MultiLineString(lines) => (lines.iter().collect(), false),
        Geometry::Polygon(rings) => (rings.iter().collect(), true),
        Geometry::MultiPolygon(polygons) => (polygons.iter().flatten().collect(), true),
        Geometry::Point(_) | Geometry::MultiPoint(_) => return,
    };

    let rings: Vec<Vec<Coord<f64>>> = parts
        .into_iter()
        .map(|ring| {
            ring.iter()
                .filter_map(|p| Geometry::coord(p))
                .inspect(|coord| geo.push(*coord))
                .map(to_web_mercator)
                .collect::<Vec<_>>()
        })
        .filter(|ring| ring.len() >= 2)
        .collect();

    if !rings.is_empty() {
        items.push(OverlayItem::Shape {
            rings,
            closed,
            style: style::selector_shape_style(),
            popup,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{radius_for_frp, radius_for_frp_linear, Color};
    use serde_json::json;

    fn collection(value: serde_json::Value) -> FeatureCollection {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn hotspot_overlay_uses_confidence_colors_and_sqrt_radius() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-86.0, 14.0]},
                 "properties": {"confidence": "n", "frp": 36.0, "acq_date": "2024-03-14"}},
                {"type": "Feature", "geometry": null,
                 "properties": {"confidence": "h", "longitude": -87.0, "latitude": 15.0}}
            ]
        }));

        let overlay = Overlay::build(LayerKind::Hotspots, "firms", &fc);
        assert_eq!(overlay.marker_count(), 2);

        let OverlayItem::Marker { style, popup, .. } = &overlay.items[0] else {
            panic!("expected a marker");
        };
        assert_eq!(style.fill, Color::ORANGE);
        assert_eq!(style.radius, radius_for_frp(36.0));
        assert_eq!(popup.rows[0], ("Fecha".to_string(), "2024-03-14".to_string()));
        assert_eq!(popup.rows[1].1, "n/a");

        let bounds = overlay.bounds.unwrap();
        assert_eq!(bounds.min, Coord { x: -87.0, y: 14.0 });
        assert_eq!(bounds.max, Coord { x: -86.0, y: 15.0 });
    }

    #[test]
    fn selector_overlay_draws_polygons_and_linear_points() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature",
                 "geometry": {"type": "Polygon", "coordinates": [[[-87.0, 14.0], [-86.0, 14.0], [-86.0, 15.0], [-87.0, 14.0]]]},
                 "properties": {"nombre": "Olancho", "area": 24351}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-86.5, 14.5]},
                 "properties": {"frp": 50.0}}
            ]
        }));

        let overlay = Overlay::build(LayerKind::Selector, "departamentos", &fc);
        assert_eq!(overlay.shape_count(), 1);
        assert_eq!(overlay.marker_count(), 1);

        let OverlayItem::Shape { style, popup, closed, rings } = &overlay.items[0] else {
            panic!("expected a shape");
        };
        assert!(*closed);
        assert_eq!(rings[0].len(), 4);
        assert_eq!(style.stroke, Color::SLATE);
        assert_eq!(popup.text(), "nombre: Olancho\narea: 24351");

        let OverlayItem::Marker { style, .. } = &overlay.items[1] else {
            panic!("expected a marker");
        };
        assert_eq!(style.radius, radius_for_frp_linear(50.0));
    }

    #[test]
    fn features_without_geometry_are_skipped() {
        let fc = collection(json!({
            "type": "FeatureCollection",
            "features": [{"type": "Feature", "geometry": null, "properties": {"confidence": "h"}}]
        }));
        let overlay = Overlay::build(LayerKind::Hotspots, "firms", &fc);
        assert!(overlay.items.is_empty());
        assert!(overlay.bounds.is_none());
    }
}
