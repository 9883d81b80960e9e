//! Map projection and coordinate transformation.
//!
//! Geographic coordinates are carried as `geo_types::Coord` with `x = lon`, `y = lat`.
//! Overlays are stored in spherical Web Mercator (EPSG:3857) meters, and a [`Viewport`]
//! turns those into canvas pixels for a given center and zoom.

use geo_types::Coord;

/// Sphere radius used by EPSG:3857.
pub const EARTH_RADIUS_M: f64 = 6_378_137.0;
/// Latitude beyond which Web Mercator is undefined in practice.
pub const MAX_LATITUDE: f64 = 85.051_128_78;
/// Size of one map tile in pixels at any zoom level.
pub const TILE_SIZE: f64 = 256.0;

/// Projects lon/lat degrees to Web Mercator meters.
pub fn to_web_mercator(coord: Coord<f64>) -> Coord<f64> {
    let lat = coord.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    Coord {
        x: EARTH_RADIUS_M * coord.x.to_radians(),
        y: EARTH_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
    }
}

/// Inverse of [`to_web_mercator`].
pub fn from_web_mercator(coord: Coord<f64>) -> Coord<f64> {
    Coord {
        x: (coord.x / EARTH_RADIUS_M).to_degrees(),
        y: (2.0 * (coord.y / EARTH_RADIUS_M).exp().atan() - std::f64::consts::FRAC_PI_2)
            .to_degrees(),
    }
}

/// Projected point geometry for a hotspot given by its `longitude`/`latitude` attributes.
pub fn point_geometry(longitude: f64, latitude: f64) -> Coord<f64> {
    to_web_mercator(Coord {
        x: longitude,
        y: latitude,
    })
}

/// Geographic bounding box in lon/lat degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoBounds {
    pub min: Coord<f64>,
    pub max: Coord<f64>,
}

impl GeoBounds {
    pub fn from_point(coord: Coord<f64>) -> Self {
        Self {
            min: coord,
            max: coord,
        }
    }

    pub fn extend(&mut self, coord: Coord<f64>) {
        self.min.x = self.min.x.min(coord.x);
        self.min.y = self.min.y.min(coord.y);
        self.max.x = self.max.x.max(coord.x);
        self.max.y = self.max.y.max(coord.y);
    }

    /// Bounds of all coordinates, `None` when the iterator is empty.
    pub fn enclosing<I: IntoIterator<Item = Coord<f64>>>(coords: I) -> Option<Self> {
        let mut iter = coords.into_iter();
        let mut bounds = Self::from_point(iter.next()?);
        for coord in iter {
            bounds.extend(coord);
        }
        Some(bounds)
    }

    pub fn center(&self) -> Coord<f64> {
        Coord {
            x: (self.min.x + self.max.x) / 2.0,
            y: (self.min.y + self.max.y) / 2.0,
        }
    }
}

/// Canvas view onto the projected map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// View center in lon/lat degrees.
    pub center: Coord<f64>,
    pub zoom: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        // Honduras, where the FIRMS extract is centered.
        Self::new(Coord { x: -86.2, y: 14.75 }, 8.0)
    }
}

impl Viewport {
    pub const MIN_ZOOM: f64 = 1.0;
    pub const MAX_ZOOM: f64 = 18.0;

    pub fn new(center: Coord<f64>, zoom: f64) -> Self {
        Self {
            center,
            zoom: zoom.clamp(Self::MIN_ZOOM, Self::MAX_ZOOM),
            width: 800.0,
            height: 600.0,
        }
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width.max(1.0);
        self.height = height.max(1.0);
    }

    /// Meters covered by one pixel at the current zoom.
    pub fn resolution(&self) -> f64 {
        2.0 * std::f64::consts::PI * EARTH_RADIUS_M / (TILE_SIZE * 2f64.powf(self.zoom))
    }

    /// Canvas position of a projected (Web Mercator) coordinate.
    pub fn to_screen(&self, projected: Coord<f64>) -> Coord<f64> {
        let center = to_web_mercator(self.center);
        let resolution = self.resolution();
        Coord {
            x: self.width / 2.0 + (projected.x - center.x) / resolution,
            y: self.height / 2.0 - (projected.y - center.y) / resolution,
        }
    }

    /// Lon/lat under a canvas position.
    pub fn to_geo(&self, screen: Coord<f64>) -> Coord<f64> {
        let center = to_web_mercator(self.center);
        let resolution = self.resolution();
        from_web_mercator(Coord {
            x: center.x + (screen.x - self.width / 2.0) * resolution,
            y: center.y - (screen.y - self.height / 2.0) * resolution,
        })
    }

    /// Recenters and picks the largest whole zoom that shows `bounds` with `padding` pixels
    /// of margin on every side.
    pub fn fit_bounds(&mut self, bounds: GeoBounds, padding: f64) {
        let min = to_web_mercator(bounds.min);
        let max = to_web_mercator(bounds.max);
        self.center = from_web_mercator(Coord {
            x: (min.x + max.x) / 2.0,
            y: (min.y + max.y) / 2.0,
        });

        let usable_w = (self.width - 2.0 * padding).max(1.0);
        let usable_h = (self.height - 2.0 * padding).max(1.0);
        let span_x = (max.x - min.x).abs();
        let span_y = (max.y - min.y).abs();
        if span_x == 0.0 && span_y == 0.0 {
            return;
        }

        let world = 2.0 * std::f64::consts::PI * EARTH_RADIUS_M / TILE_SIZE;
        let zoom_x = if span_x > 0.0 {
            (world * usable_w / span_x).log2()
        } else {
            Self::MAX_ZOOM
        };
        let zoom_y = if span_y > 0.0 {
            (world * usable_h / span_y).log2()
        } else {
            Self::MAX_ZOOM
        };
        self.zoom = zoom_x.min(zoom_y).floor().clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.zoom = (self.zoom + delta).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn origin_projects_to_origin() {
        let projected = to_web_mercator(Coord { x: 0.0, y: 0.0 });
        assert!(close(projected.x, 0.0, 1e-9));
        assert!(close(projected.y, 0.0, 1e-9));
    }

    #[test]
    fn projection_matches_known_value() {
        // Tegucigalpa.
        let projected = point_geometry(-87.2068, 14.0818);
        assert!(close(projected.x, -9_707_816.57, 0.1), "{}", projected.x);
        assert!(close(projected.y, 1_583_602.92, 0.1), "{}", projected.y);
    }

    #[test]
    fn inverse_recovers_coordinates() {
        let geo = Coord { x: -86.2, y: 14.75 };
        let back = from_web_mercator(to_web_mercator(geo));
        assert!(close(back.x, geo.x, 1e-9));
        assert!(close(back.y, geo.y, 1e-9));
    }

    #[test]
    fn polar_latitudes_are_clamped() {
        let north = to_web_mercator(Coord { x: 0.0, y: 90.0 });
        assert!(north.y.is_finite());
    }

    #[test]
    fn viewport_center_maps_to_canvas_center() {
        let viewport = Viewport::default();
        let screen = viewport.to_screen(to_web_mercator(viewport.center));
        assert!(close(screen.x, 400.0, 1e-6));
        assert!(close(screen.y, 300.0, 1e-6));

        let geo = viewport.to_geo(Coord { x: 400.0, y: 300.0 });
        assert!(close(geo.x, -86.2, 1e-9));
        assert!(close(geo.y, 14.75, 1e-9));
    }

    #[test]
    fn fit_bounds_contains_both_corners() {
        let mut viewport = Viewport::default();
        let bounds = GeoBounds {
            min: Coord { x: -89.4, y: 12.9 },
            max: Coord { x: -83.1, y: 16.5 },
        };
        viewport.fit_bounds(bounds, 20.0);

        for corner in [bounds.min, bounds.max] {
            let screen = viewport.to_screen(to_web_mercator(corner));
            assert!(screen.x >= 0.0 && screen.x <= viewport.width, "{screen:?}");
            assert!(screen.y >= 0.0 && screen.y <= viewport.height, "{screen:?}");
        }
    }

    #[test]
    fn bounds_enclose_all_points() {
        let bounds = GeoBounds::enclosing(vec![
            Coord { x: 1.0, y: 5.0 },
            Coord { x: -2.0, y: 3.0 },
            Coord { x: 0.5, y: 7.0 },
        ])
        .unwrap();
        assert_eq!(bounds.min, Coord { x: -2.0, y: 3.0 });
        assert_eq!(bounds.max, Coord { x: 1.0, y: 7.0 });
        assert!(GeoBounds::enclosing(Vec::new()).is_none());
    }
}
