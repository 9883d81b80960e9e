use crate::charts::iced_color;
use firmscore::overlay::{Overlay, OverlayItem, Popup};
use firmscore::projection::{point_geometry, Viewport};
use firmscore::source::LayerKind;
use firmscore::style::{confidence_legend, LEGEND_TITLE};
use geo_types::Coord;
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke, Text},
    Color, Point, Rectangle, Renderer, Size, Theme,
};

const MAP_BACKGROUND: Color = Color::from_rgb(0.06, 0.08, 0.1);
const GRATICULE: Color = Color::from_rgb(0.14, 0.17, 0.2);
const PANEL: Color = Color::from_rgba(0.0, 0.0, 0.0, 0.75);
const PANEL_TEXT: Color = Color::from_rgb(0.92, 0.92, 0.92);
/// Extra pixels around a marker that still count as a hit.
const HIT_SLOP: f32 = 2.0;
/// Distance from a line that counts as a hit.
const LINE_SLOP: f32 = 4.0;
/// Wheel pixels per zoom step.
const PIXELS_PER_LINE: f32 = 60.0;

/// View changes requested by mouse interaction on the map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    Panned { dx: f32, dy: f32 },
    Zoomed(f32),
    Resized { width: f32, height: f32 },
}

/// Applies a map interaction to the viewport.
pub fn apply(viewport: &mut Viewport, event: MapEvent) {
    match event {
        MapEvent::Panned { dx, dy } => {
            viewport.center = viewport.to_geo(Coord {
                x: viewport.width / 2.0 - f64::from(dx),
                y: viewport.height / 2.0 - f64::from(dy),
            });
        }
        MapEvent::Zoomed(lines) => viewport.zoom_by(f64::from(lines.clamp(-1.0, 1.0))),
        MapEvent::Resized { width, height } => {
            viewport.resize(f64::from(width), f64::from(height))
        }
    }
}

fn screen(viewport: &Viewport, projected: Coord<f64>) -> Point {
    let p = viewport.to_screen(projected);
    Point::new(p.x as f32, p.y as f32)
}

fn point_in_ring(point: Point, ring: &[Point]) -> bool {
    let mut inside = false;
    let mut j = ring.len().wrapping_sub(1);
    for i in 0..ring.len() {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > point.y) != (b.y > point.y)
            && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

fn distance_to_segment(point: Point, a: Point, b: Point) -> f32 {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let length_sq = dx * dx + dy * dy;
    let t = if length_sq == 0.0 {
        0.0
    } else {
        (((point.x - a.x) * dx + (point.y - a.y) * dy) / length_sq).clamp(0.0, 1.0)
    };
    point.distance(Point::new(a.x + t * dx, a.y + t * dy))
}

fn item_hit(item: &OverlayItem, viewport: &Viewport, point: Point) -> bool {
    match item {
        OverlayItem::Marker {
            position, style, ..
        } => screen(viewport, *position).distance(point) <= style.radius as f32 + HIT_SLOP,
        OverlayItem::Shape { rings, closed, .. } => rings.iter().any(|ring| {
            let ring: Vec<Point> = ring.iter().map(|c| screen(viewport, *c)).collect();
            if *closed && point_in_ring(point, &ring) {
                return true;
            }
            ring.windows(2)
                .any(|pair| distance_to_segment(point, pair[0], pair[1]) <= LINE_SLOP)
        }),
    }
}

/// Popup of the topmost item under `point`. Overlays are given bottom to top.
pub fn hit_test<'a>(
    overlays: &[&'a Overlay],
    viewport: &Viewport,
    point: Point,
) -> Option<&'a Popup> {
    overlays.iter().rev().find_map(|overlay| {
        overlay
            .items
            .iter()
            .rev()
            .find(|item| item_hit(item, viewport, point))
            .map(|item| match item {
                OverlayItem::Marker { popup, .. } | OverlayItem::Shape { popup, .. } => popup,
            })
    })
}

#[derive(Debug, Default)]
pub struct Interaction {
    drag_from: Option<Point>,
}

/// Canvas program drawing the mapped overlays, the legend and the hovered popup.
pub struct MapView<'a> {
    overlays: Vec<&'a Overlay>,
    viewport: &'a Viewport,
}

impl<'a> MapView<'a> {
    /// Selector overlays are drawn under hotspot overlays.
    pub fn new(overlays: impl Iterator<Item = &'a Overlay>, viewport: &'a Viewport) -> Self {
        let mut overlays: Vec<&Overlay> = overlays.collect();
        overlays.sort_by_key(|overlay| overlay.kind == LayerKind::Hotspots);
        Self { overlays, viewport }
    }

    fn draw_graticule(&self, frame: &mut Frame, viewport: &Viewport, size: Size) {
        let top_left = viewport.to_geo(Coord { x: 0.0, y: 0.0 });
        let bottom_right = viewport.to_geo(Coord {
            x: viewport.width,
            y: viewport.height,
        });
        let step = if viewport.zoom >= 6.0 { 1.0 } else { 10.0 };
        let lines = Path::new(|builder| {
            let mut lon = (top_left.x / step).floor() * step;
            while lon <= bottom_right.x {
                let x = screen(viewport, point_geometry(lon, 0.0)).x;
                builder.move_to(Point::new(x, 0.0));
                builder.line_to(Point::new(x, size.height));
                lon += step;
            }
            let mut lat = (bottom_right.y / step).floor() * step;
            while lat <= top_left.y {
                let y = screen(viewport, point_geometry(0.0, lat)).y;
                builder.move_to(Point::new(0.0, y));
                builder.line_to(Point::new(size.width, y));
                lat += step;
            }
        });
        frame.stroke(&lines, Stroke::default().with_color(GRATICULE).with_width(1.0));
    }

    fn draw_item(frame: &mut Frame, viewport: &Viewport, item: &OverlayItem) {
        match item {
            OverlayItem::Marker {
                position, style, ..
            } => {
                let circle = Path::circle(screen(viewport, *position), style.radius as f32);
                frame.fill(
                    &circle,
                    Color {
                        a: style.fill_opacity as f32,
                        ..iced_color(style.fill)
                    },
                );
                frame.stroke(
                    &circle,
                    Stroke::default()
                        .with_color(Color {
                            a: style.opacity as f32,
                            ..iced_color(style.stroke)
                        })
                        .with_width(style.weight as f32),
                );
            }
            OverlayItem::Shape {
                rings,
                closed,
                style,
                ..
            } => {
                let path = Path::new(|builder| {
                    for ring in rings {
                        let mut points = ring.iter().map(|c| screen(viewport, *c));
                        if let Some(first) = points.next() {
                            builder.move_to(first);
                            points.for_each(|p| builder.line_to(p));
                            if *closed {
                                builder.close();
                            }
                        }
                    }
                });
                frame.stroke(
                    &path,
                    Stroke::default()
                        .with_color(iced_color(style.stroke))
                        .with_width(style.weight as f32),
                );
            }
        }
    }

    fn draw_legend(frame: &mut Frame, size: Size) {
        let entries = confidence_legend();
        let panel = Size::new(130.0, 30.0 + entries.len() as f32 * 18.0);
        let origin = Point::new(size.width - panel.width - 10.0, size.height - panel.height - 10.0);
        frame.fill_rectangle(origin, panel, PANEL);
        frame.fill_text(Text {
            content: LEGEND_TITLE.to_string(),
            position: Point::new(origin.x + 8.0, origin.y + 6.0),
            color: PANEL_TEXT,
            size: 14.0.into(),
            ..Text::default()
        });
        for (index, entry) in entries.iter().enumerate() {
            let y = origin.y + 28.0 + index as f32 * 18.0;
            frame.fill(
                &Path::circle(Point::new(origin.x + 14.0, y + 6.0), 5.0),
                iced_color(entry.color),
            );
            frame.fill_text(Text {
                content: entry.label.to_string(),
                position: Point::new(origin.x + 26.0, y),
                color: PANEL_TEXT,
                size: 12.0.into(),
                ..Text::default()
            });
        }
    }

    fn draw_popup(frame: &mut Frame, popup: &Popup, anchor: Point, size: Size) {
        let line_height = 16.0;
        let width = popup
            .rows
            .iter()
            .map(|(label, value)| (label.chars().count() + value.chars().count() + 2) as f32 * 7.0)
            .fold(80.0, f32::max)
            + 16.0;
        let height = popup.rows.len() as f32 * line_height + 12.0;
        let origin = Point::new(
            (anchor.x + 12.0).min(size.width - width).max(0.0),
            (anchor.y + 12.0).min(size.height - height).max(0.0),
        );
        frame.fill_rectangle(origin, Size::new(width, height), PANEL);
        for (index, (label, value)) in popup.rows.iter().enumerate() {
            frame.fill_text(Text {
                content: format!("{label}: {value}"),
                position: Point::new(origin.x + 8.0, origin.y + 6.0 + index as f32 * line_height),
                color: PANEL_TEXT,
                size: 12.0.into(),
                ..Text::default()
            });
        }
    }
}

impl canvas::Program<MapEvent> for MapView<'_> {
    type State = Interaction;

    fn update(
        &self,
        state: &mut Self::State,
        event: &canvas::Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<MapEvent>> {
        if (self.viewport.width - f64::from(bounds.width)).abs() > 0.5
            || (self.viewport.height - f64::from(bounds.height)).abs() > 0.5
        {
            return Some(canvas::Action::publish(MapEvent::Resized {
                width: bounds.width,
                height: bounds.height,
            }));
        }

        match event {
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                cursor.position_in(bounds)?;
                let lines = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => *y,
                    mouse::ScrollDelta::Pixels { y, .. } => *y / PIXELS_PER_LINE,
                };
                Some(canvas::Action::publish(MapEvent::Zoomed(lines)).and_capture())
            }
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                state.drag_from = Some(cursor.position_in(bounds)?);
                Some(canvas::Action::capture())
            }
            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.drag_from.take().map(|_| canvas::Action::capture())
            }
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                match (state.drag_from, cursor.position_in(bounds)) {
                    (Some(from), Some(to)) => {
                        state.drag_from = Some(to);
                        Some(
                            canvas::Action::publish(MapEvent::Panned {
                                dx: to.x - from.x,
                                dy: to.y - from.y,
                            })
                            .and_capture(),
                        )
                    }
                    _ => Some(canvas::Action::request_redraw()),
                }
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let size = bounds.size();
        let mut viewport = *self.viewport;
        viewport.resize(f64::from(size.width), f64::from(size.height));

        let mut frame = Frame::new(renderer, size);
        frame.fill_rectangle(Point::ORIGIN, size, MAP_BACKGROUND);
        self.draw_graticule(&mut frame, &viewport, size);

        for overlay in &self.overlays {
            for item in &overlay.items {
                Self::draw_item(&mut frame, &viewport, item);
            }
        }

        Self::draw_legend(&mut frame, size);

        if let Some(position) = cursor.position_in(bounds) {
            if let Some(popup) = hit_test(&self.overlays, &viewport, position) {
                Self::draw_popup(&mut frame, popup, position, size);
            }
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &Self::State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.drag_from.is_some() {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}
