//! Pushes a [`Summary`] into the display slots, the satellite list, and the two charts.

use crate::aggregate::{round1, Summary};
use crate::feature::ConfidenceClass;
use crate::port::{ChartEntry, ChartKind, ChartSlot, ChartSpec, DisplaySlot, UiPort};
use crate::state::DashboardState;
use crate::style::{satellite_color, CONFIDENCE_BAR_COLORS};

/// Shown in a slot that has no value.
pub const EMPTY_VALUE: &str = "—";

/// Percentage-of-total label with one decimal, ties rounded up. A zero total yields `0.0%`.
pub fn format_percentage(value: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", round1(value as f64 / total as f64 * 100.0))
}

/// Average FRP as displayed: one decimal, with a trailing `.0` dropped.
pub fn format_average(average: Option<f64>) -> String {
    match average {
        Some(value) => format!("{}", round1(value)),
        None => EMPTY_VALUE.to_string(),
    }
}

pub fn confidence_chart_spec(summary: &Summary) -> ChartSpec {
    let total = summary.counts.tracked();
    let entries = ConfidenceClass::ALL
        .iter()
        .zip(CONFIDENCE_BAR_COLORS)
        .map(|(class, color)| {
            let value = summary.counts.get(*class);
            ChartEntry {
                label: class.label().to_string(),
                value,
                color,
                percent_label: format_percentage(value, total),
            }
        })
        .collect();

    ChartSpec {
        kind: ChartKind::Bar,
        title: "Distribución por Confianza".to_string(),
        dataset_label: "Cantidad por Confianza".to_string(),
        entries,
    }
}

pub fn satellite_chart_spec(summary: &Summary) -> ChartSpec {
    let total = summary.total;
    let entries = summary
        .satellite_counts
        .iter()
        .enumerate()
        .map(|(index, (label, value))| ChartEntry {
            label: label.to_string(),
            value,
            color: satellite_color(index),
            percent_label: format_percentage(value, total),
        })
        .collect();

    ChartSpec {
        kind: ChartKind::Pie,
        title: "Incendios por Satélite".to_string(),
        dataset_label: "Detecciones por Satélite".to_string(),
        entries,
    }
}

/// Writes summaries to a [`UiPort`], keeping at most one chart per slot.
pub struct Renderer;

impl Renderer {
    pub fn render(state: &mut DashboardState, port: &mut dyn UiPort, summary: &Summary) {
        port.set_display(DisplaySlot::Total, &summary.total.to_string());
        port.set_display(DisplaySlot::High, &summary.counts.h.to_string());
        port.set_display(DisplaySlot::Nominal, &summary.counts.n.to_string());
        port.set_display(DisplaySlot::Low, &summary.counts.l.to_string());
        port.set_display(
            DisplaySlot::FrpTotal,
            &format!("{}", summary.frp_sum.round()),
        );
        port.set_display(
            DisplaySlot::FrpAverage,
            &format_average(summary.frp_average),
        );

        let satellites: Vec<String> = summary
            .satellite_counts
            .iter()
            .map(|(label, count)| format!("{label}: {count}"))
            .collect();
        port.set_satellite_list(&satellites);

        state.replace_chart(port, ChartSlot::Confidence, confidence_chart_spec(summary));
        state.replace_chart(port, ChartSlot::Satellite, satellite_chart_spec(summary));
    }

    /// Blanks every slot and the satellite list, and destroys both charts.
    pub fn reset(state: &mut DashboardState, port: &mut dyn UiPort) {
        for slot in DisplaySlot::ALL {
            port.set_display(slot, EMPTY_VALUE);
        }
        port.set_satellite_list(&[]);
        state.clear_charts(port);
    }
}
