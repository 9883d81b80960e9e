//! Visual style functions for hotspot markers and auxiliary layers.
//!
//! Two rendering paths use two different radius curves: hotspot markers grow with the square
//! root of FRP, while point features in a selector layer grow linearly up to 100 MW. The
//! curves are kept as separate functions on purpose.

use crate::feature::{ConfidenceClass, Feature};
use std::fmt;

/// Smallest marker radius, in pixels, for either curve.
pub const MIN_RADIUS: f64 = 4.0;
/// Largest radius of the square-root curve.
pub const MAX_RADIUS: f64 = 20.0;
/// Largest radius of the linear curve.
pub const MAX_LINEAR_RADIUS: f64 = 15.0;
/// FRP at which the linear radius and the gradient color saturate.
pub const FRP_SATURATION: f64 = 100.0;
/// FRP assumed by the selector-layer point style when the attribute is missing.
pub const DEFAULT_STYLE_FRP: f64 = 10.0;

/// An sRGB color with an optional CSS keyword it was named by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    name: Option<&'static str>,
}

impl Color {
    pub const RED: Color = Color::named("red", 255, 0, 0);
    pub const ORANGE: Color = Color::named("orange", 255, 165, 0);
    pub const YELLOW: Color = Color::named("yellow", 255, 255, 0);
    pub const GRAY: Color = Color::named("gray", 128, 128, 128);
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const SLATE: Color = Color::rgb(0x2c, 0x3e, 0x50);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, name: None }
    }

    const fn named(name: &'static str, r: u8, g: u8, b: u8) -> Self {
        Self {
            r,
            g,
            b,
            name: Some(name),
        }
    }

    /// Parses `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Channels scaled to `0.0..=1.0`, the form canvas renderers take.
    pub fn to_rgb_f32(&self) -> [f32; 3] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
        ]
    }

    /// CSS form: the keyword for named colors, `rgb(r, g, b)` otherwise.
    pub fn css(&self) -> String {
        match self.name {
            Some(name) => name.to_string(),
            None => format!("rgb({}, {}, {})", self.r, self.g, self.b),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css())
    }
}

/// Bar colors for the confidence chart, in `h`, `n`, `l` order.
pub const CONFIDENCE_BAR_COLORS: [Color; 3] = [
    Color::rgb(0xe7, 0x4c, 0x3c),
    Color::rgb(0xf3, 0x9c, 0x12),
    Color::rgb(0xf1, 0xc4, 0x0f),
];

/// Pie palette for the satellite chart, cycled when there are more satellites than colors.
pub const SATELLITE_PALETTE: [Color; 7] = [
    Color::rgb(0x34, 0x98, 0xdb),
    Color::rgb(0x9b, 0x59, 0xb6),
    Color::rgb(0x2e, 0xcc, 0x71),
    Color::rgb(0x34, 0x49, 0x5e),
    Color::rgb(0xe6, 0x7e, 0x22),
    Color::rgb(0x1a, 0xbc, 0x9c),
    Color::rgb(0xd3, 0x54, 0x00),
];

pub fn satellite_color(index: usize) -> Color {
    SATELLITE_PALETTE[index % SATELLITE_PALETTE.len()]
}

pub fn confidence_color(class: ConfidenceClass) -> Color {
    match class {
        ConfidenceClass::High => Color::RED,
        ConfidenceClass::Nominal => Color::ORANGE,
        ConfidenceClass::Low => Color::YELLOW,
    }
}

/// Marker fill for a confidence code; unrecognized codes are gray.
pub fn color_for_confidence(code: &str) -> Color {
    ConfidenceClass::from_code(code)
        .map(confidence_color)
        .unwrap_or(Color::GRAY)
}

/// Square-root radius curve used by hotspot markers.
pub fn radius_for_frp(frp: f64) -> f64 {
    let radius = frp.max(0.0).sqrt() * 2.0;
    if radius.is_nan() {
        return MIN_RADIUS;
    }
    radius.clamp(MIN_RADIUS, MAX_RADIUS)
}

/// Linear radius curve used by point features of selector layers.
pub fn radius_for_frp_linear(frp: f64) -> f64 {
    let frp = if frp.is_nan() { 0.0 } else { frp };
    MIN_RADIUS + frp.clamp(0.0, FRP_SATURATION) / FRP_SATURATION * (MAX_LINEAR_RADIUS - MIN_RADIUS)
}

/// Yellow at zero FRP fading to pure red at 100 MW and above.
pub fn color_for_frp_gradient(frp: f64) -> Color {
    let frp = if frp.is_nan() { 0.0 } else { frp };
    let fraction = (frp / FRP_SATURATION).clamp(0.0, 1.0);
    let green = (255.0 * (1.0 - fraction)).round() as u8;
    Color::rgb(255, green, 0)
}

/// Circle-marker style.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub radius: f64,
    pub fill: Color,
    pub stroke: Color,
    pub weight: f64,
    pub opacity: f64,
    pub fill_opacity: f64,
}

impl MarkerStyle {
    fn circle(radius: f64, fill: Color) -> Self {
        Self {
            radius,
            fill,
            stroke: Color::BLACK,
            weight: 0.5,
            opacity: 1.0,
            fill_opacity: 0.8,
        }
    }
}

/// Outline style for lines and polygons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeStyle {
    pub stroke: Color,
    pub weight: f64,
}

pub fn hotspot_marker_style(feature: &Feature) -> MarkerStyle {
    let fill = feature
        .confidence_code()
        .map(color_for_confidence)
        .unwrap_or(Color::GRAY);
    MarkerStyle::circle(radius_for_frp(feature.frp().unwrap_or(0.0)), fill)
}

pub fn selector_point_style(feature: &Feature) -> MarkerStyle {
    let frp = feature.frp().unwrap_or(DEFAULT_STYLE_FRP);
    MarkerStyle::circle(radius_for_frp_linear(frp), color_for_frp_gradient(frp))
}

pub fn selector_shape_style() -> ShapeStyle {
    ShapeStyle {
        stroke: Color::SLATE,
        weight: 1.0,
    }
}

/// One row of the map legend.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub label: &'static str,
    pub color: Color,
}

pub const LEGEND_TITLE: &str = "Confianza";

pub fn confidence_legend() -> Vec<LegendEntry> {
    ConfidenceClass::ALL
        .iter()
        .map(|class| LegendEntry {
            label: class.label(),
            color: confidence_color(*class),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature(properties: serde_json::Value) -> Feature {
        serde_json::from_value(json!({"type": "Feature", "properties": properties})).unwrap()
    }

    #[test]
    fn sqrt_radius_stays_within_bounds() {
        let mut frp = 0.0;
        while frp <= 1_000.0 {
            let radius = radius_for_frp(frp);
            assert!((MIN_RADIUS..=MAX_RADIUS).contains(&radius), "frp {frp} -> {radius}");
            frp += 0.75;
        }
        assert_eq!(radius_for_frp(f64::INFINITY), MAX_RADIUS);
        assert_eq!(radius_for_frp(-5.0), MIN_RADIUS);
        assert_eq!(radius_for_frp(f64::NAN), MIN_RADIUS);
    }

    #[test]
    fn sqrt_radius_follows_curve_between_clamps() {
        assert_eq!(radius_for_frp(25.0), 10.0);
        assert_eq!(radius_for_frp(1.0), MIN_RADIUS);
        assert_eq!(radius_for_frp(400.0), MAX_RADIUS);
    }

    #[test]
    fn linear_radius_differs_from_sqrt_curve() {
        assert_eq!(radius_for_frp_linear(0.0), 4.0);
        assert_eq!(radius_for_frp_linear(50.0), 9.5);
        assert_eq!(radius_for_frp_linear(100.0), 15.0);
        assert_eq!(radius_for_frp_linear(250.0), 15.0);
        assert_eq!(radius_for_frp_linear(-3.0), 4.0);
        assert_ne!(radius_for_frp_linear(25.0), radius_for_frp(25.0));
    }

    #[test]
    fn confidence_colors_are_case_insensitive() {
        assert_eq!(color_for_confidence("h"), Color::RED);
        assert_eq!(color_for_confidence("H"), Color::RED);
        assert_eq!(color_for_confidence("n"), Color::ORANGE);
        assert_eq!(color_for_confidence("N"), Color::ORANGE);
        assert_eq!(color_for_confidence("l"), Color::YELLOW);
        assert_eq!(color_for_confidence("L"), Color::YELLOW);
        assert_eq!(color_for_confidence("high"), Color::GRAY);
        assert_eq!(color_for_confidence(""), Color::GRAY);
    }

    #[test]
    fn confidence_colors_come_from_four_values() {
        let allowed = [Color::RED, Color::ORANGE, Color::YELLOW, Color::GRAY];
        for code in ["h", "n", "l", "H", "x", "nominal", "0", "ñ", "hh"] {
            assert!(allowed.contains(&color_for_confidence(code)), "{code}");
        }
    }

    #[test]
    fn gradient_runs_from_yellow_to_red() {
        assert_eq!(color_for_frp_gradient(0.0), Color::rgb(255, 255, 0));
        assert_eq!(color_for_frp_gradient(50.0), Color::rgb(255, 128, 0));
        assert_eq!(color_for_frp_gradient(100.0), Color::rgb(255, 0, 0));
        assert_eq!(color_for_frp_gradient(500.0), Color::rgb(255, 0, 0));
        assert_eq!(color_for_frp_gradient(50.0).css(), "rgb(255, 128, 0)");
    }

    #[test]
    fn hotspot_style_uses_confidence_and_sqrt_radius() {
        let style = hotspot_marker_style(&feature(json!({"confidence": "h", "frp": 100.0})));
        assert_eq!(style.fill, Color::RED);
        assert_eq!(style.radius, 20.0);
        assert_eq!(style.stroke, Color::BLACK);

        let missing = hotspot_marker_style(&feature(json!({})));
        assert_eq!(missing.fill, Color::GRAY);
        assert_eq!(missing.radius, MIN_RADIUS);
    }

    #[test]
    fn selector_point_style_defaults_missing_frp() {
        let style = selector_point_style(&feature(json!({})));
        assert_eq!(style.radius, radius_for_frp_linear(DEFAULT_STYLE_FRP));
        assert_eq!(style.fill, color_for_frp_gradient(DEFAULT_STYLE_FRP));
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(Color::from_hex("#2c3e50"), Some(Color::SLATE));
        assert_eq!(Color::from_hex("2c3e50"), None);
        assert_eq!(Color::from_hex("#2c3e5"), None);
        assert_eq!(Color::RED.to_rgb_f32(), [1.0, 0.0, 0.0]);
    }

    #[test]
    fn legend_lists_three_classes() {
        let legend = confidence_legend();
        assert_eq!(legend.len(), 3);
        assert_eq!(legend[0].label, "Alta (h)");
        assert_eq!(legend[2].color, Color::YELLOW);
    }
}
