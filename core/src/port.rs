//! The abstract UI the dashboard drives, and the events it receives from it.

use crate::overlay::Overlay;
use crate::projection::GeoBounds;
use crate::style::Color;
use std::time::Duration;

/// Named text slots showing summary values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DisplaySlot {
    Total,
    High,
    Nominal,
    Low,
    FrpTotal,
    FrpAverage,
}

impl DisplaySlot {
    pub const ALL: [DisplaySlot; 6] = [
        DisplaySlot::Total,
        DisplaySlot::High,
        DisplaySlot::Nominal,
        DisplaySlot::Low,
        DisplaySlot::FrpTotal,
        DisplaySlot::FrpAverage,
    ];

    /// Stable element id of the slot.
    pub fn id(&self) -> &'static str {
        match self {
            DisplaySlot::Total => "total-incendios",
            DisplaySlot::High => "alta",
            DisplaySlot::Nominal => "nominal",
            DisplaySlot::Low => "baja",
            DisplaySlot::FrpTotal => "frp-total",
            DisplaySlot::FrpAverage => "frp-prom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DisplaySlot::Total => "Total de incendios",
            DisplaySlot::High => "Alta",
            DisplaySlot::Nominal => "Nominal",
            DisplaySlot::Low => "Baja",
            DisplaySlot::FrpTotal => "FRP total",
            DisplaySlot::FrpAverage => "FRP promedio",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// The two chart widgets of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartSlot {
    Confidence,
    Satellite,
}

impl ChartSlot {
    pub const ALL: [ChartSlot; 2] = [ChartSlot::Confidence, ChartSlot::Satellite];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Bar,
    Pie,
}

/// One bar or pie wedge.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartEntry {
    pub label: String,
    pub value: usize,
    pub color: Color,
    /// Percentage-of-total label, e.g. `33.3%`.
    pub percent_label: String,
}

/// Everything needed to draw a chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub dataset_label: String,
    pub entries: Vec<ChartEntry>,
}

impl ChartSpec {
    pub fn total(&self) -> usize {
        self.entries.iter().map(|entry| entry.value).sum()
    }
}

/// Identity of a live chart instance, issued by the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(pub u64);

/// Identity of a live map overlay, issued by the port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OverlayHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// A user-visible message the port dismisses on its own after `duration`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransientMessage {
    pub kind: MessageKind,
    pub text: String,
    pub duration: Duration,
}

/// User interactions the dashboard reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// The load button was pressed with the date picker's current value.
    LoadClicked { date: Option<String> },
    /// A layer was picked in the layer selector.
    LayerSelected(String),
    /// The clear button was pressed.
    ClearClicked,
}

/// Display surface driven by the dashboard.
///
/// Implementations own the actual widgets. Chart and overlay handles they return are only
/// ever passed back to `destroy_chart`/`remove_overlay` once.
pub trait UiPort {
    fn set_display(&mut self, slot: DisplaySlot, value: &str);
    fn set_satellite_list(&mut self, entries: &[String]);
    fn create_chart(&mut self, slot: ChartSlot, spec: ChartSpec) -> ChartHandle;
    fn destroy_chart(&mut self, handle: ChartHandle);
    fn add_overlay(&mut self, overlay: Overlay) -> OverlayHandle;
    fn remove_overlay(&mut self, handle: OverlayHandle);
    fn fit_bounds(&mut self, bounds: GeoBounds);
    fn show_message(&mut self, message: TransientMessage);
    fn set_layer_options(&mut self, names: &[String]);
}
