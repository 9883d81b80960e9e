use firmscore::port::{ChartKind, ChartSpec};
use firmscore::style;
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke, Text},
    Color, Point, Rectangle, Renderer, Size, Theme,
};
use std::f32::consts::PI;

const BACKGROUND: Color = Color::from_rgb(0.05, 0.05, 0.05);
const AXIS: Color = Color::from_rgb(0.35, 0.35, 0.45);
const LABEL: Color = Color::from_rgb(0.85, 0.85, 0.85);
const PADDING: f32 = 28.0;
/// Line segments per full turn when tracing pie wedges.
const ARC_STEPS: f32 = 96.0;

pub fn iced_color(color: style::Color) -> Color {
    let [r, g, b] = color.to_rgb_f32();
    Color::from_rgb(r, g, b)
}

fn label(frame: &mut Frame, content: String, position: Point, size: f32) {
    frame.fill_text(Text {
        content,
        position,
        color: LABEL,
        size: size.into(),
        ..Text::default()
    });
}

/// Canvas program drawing one chart spec as bars or a pie.
#[derive(Debug, Clone)]
pub struct ChartView<'a> {
    spec: &'a ChartSpec,
}

impl<'a> ChartView<'a> {
    pub fn new(spec: &'a ChartSpec) -> Self {
        Self { spec }
    }

    fn draw_bars(&self, frame: &mut Frame, size: Size) {
        let entries = &self.spec.entries;
        let max = entries.iter().map(|e| e.value).max().unwrap_or(0).max(1) as f32;
        let plot_height = (size.height - 2.0 * PADDING).max(1.0);
        let slot_width = (size.width - 2.0 * PADDING).max(1.0) / entries.len().max(1) as f32;
        let baseline = size.height - PADDING;

        let axis = Path::new(|builder| {
            builder.move_to(Point::new(PADDING, PADDING));
            builder.line_to(Point::new(PADDING, baseline));
            builder.line_to(Point::new(size.width - PADDING, baseline));
        });
        frame.stroke(&axis, Stroke::default().with_color(AXIS).with_width(1.0));

        for (index, entry) in entries.iter().enumerate() {
            let height = entry.value as f32 / max * plot_height;
            let x = PADDING + index as f32 * slot_width + slot_width * 0.15;
            let width = slot_width * 0.7;
            frame.fill_rectangle(
                Point::new(x, baseline - height),
                Size::new(width, height),
                iced_color(entry.color),
            );
            label(
                frame,
                format!("{} ({})", entry.value, entry.percent_label),
                Point::new(x, (baseline - height - 16.0).max(0.0)),
                12.0,
            );
            label(frame, entry.label.clone(), Point::new(x, baseline + 4.0), 12.0);
        }
    }

    fn draw_pie(&self, frame: &mut Frame, size: Size) {
        let total = self.spec.total();
        if total == 0 {
            label(
                frame,
                "Sin datos".to_string(),
                Point::new(PADDING, PADDING),
                14.0,
            );
            return;
        }

        let radius = ((size.width * 0.5).min(size.height) / 2.0 - PADDING * 0.5).max(4.0);
        let center = Point::new(PADDING * 0.5 + radius, size.height / 2.0);
        let mut start = -PI / 2.0;

        for entry in &self.spec.entries {
            let sweep = entry.value as f32 / total as f32 * 2.0 * PI;
            let steps = ((sweep / (2.0 * PI)) * ARC_STEPS).ceil().max(1.0) as usize;
            let wedge = Path::new(|builder| {
                builder.move_to(center);
                for step in 0..=steps {
                    let angle = start + sweep * step as f32 / steps as f32;
                    builder.line_to(Point::new(
                        center.x + radius * angle.cos(),
                        center.y + radius * angle.sin(),
                    ));
                }
                builder.close();
            });
            frame.fill(&wedge, iced_color(entry.color));
            frame.stroke(&wedge, Stroke::default().with_color(BACKGROUND).with_width(1.0));
            start += sweep;
        }

        let legend_x = center.x + radius + PADDING * 0.5;
        for (index, entry) in self.spec.entries.iter().enumerate() {
            let y = PADDING * 0.5 + index as f32 * 18.0;
            frame.fill_rectangle(
                Point::new(legend_x, y + 2.0),
                Size::new(10.0, 10.0),
                iced_color(entry.color),
            );
            label(
                frame,
                format!("{}: {} ({})", entry.label, entry.value, entry.percent_label),
                Point::new(legend_x + 16.0, y),
                12.0,
            );
        }
    }
}

impl<Message> canvas::Program<Message> for ChartView<'_> {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);

        match self.spec.kind {
            ChartKind::Bar => self.draw_bars(&mut frame, bounds.size()),
            ChartKind::Pie => self.draw_pie(&mut frame, bounds.size()),
        }

        vec![frame.into_geometry()]
    }
}
