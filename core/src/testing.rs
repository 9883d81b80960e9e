//! In-memory port and source used by the unit tests.

use crate::feature::FeatureCollection;
use crate::overlay::Overlay;
use crate::port::{
    ChartHandle, ChartSlot, ChartSpec, DisplaySlot, OverlayHandle, TransientMessage, UiPort,
};
use crate::prelude::FetchError;
use crate::projection::GeoBounds;
use crate::source::{FeatureSource, LayerRequest};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
pub struct MemoryPort {
    pub displays: BTreeMap<DisplaySlot, String>,
    pub satellites: Vec<String>,
    pub charts: Vec<(ChartHandle, ChartSlot, ChartSpec)>,
    pub destroyed_charts: Vec<ChartHandle>,
    pub chart_log: Vec<String>,
    pub overlays: Vec<(OverlayHandle, Overlay)>,
    pub fitted: Vec<GeoBounds>,
    pub messages: Vec<TransientMessage>,
    pub layer_options: Vec<String>,
    next_chart: u64,
    next_overlay: u64,
}

impl MemoryPort {
    pub fn display(&self, slot: DisplaySlot) -> Option<&str> {
        self.displays.get(&slot).map(String::as_str)
    }

    pub fn live_charts(&self, slot: ChartSlot) -> usize {
        self.charts.iter().filter(|(_, s, _)| *s == slot).count()
    }

    pub fn chart(&self, slot: ChartSlot) -> Option<&ChartSpec> {
        self.charts
            .iter()
            .find(|(_, s, _)| *s == slot)
            .map(|(_, _, spec)| spec)
    }
}

impl UiPort for MemoryPort {
    fn set_display(&mut self, slot: DisplaySlot, value: &str) {
        self.displays.insert(slot, value.to_string());
    }

    fn set_satellite_list(&mut self, entries: &[String]) {
        self.satellites = entries.to_vec();
    }

    fn create_chart(&mut self, slot: ChartSlot, spec: ChartSpec) -> ChartHandle {
        self.next_chart += 1;
        let handle = ChartHandle(self.next_chart);
        self.chart_log.push(format!("create {}", handle.0));
        self.charts.push((handle, slot, spec));
        handle
    }

    fn destroy_chart(&mut self, handle: ChartHandle) {
        self.chart_log.push(format!("destroy {}", handle.0));
        self.charts.retain(|(h, _, _)| *h != handle);
        self.destroyed_charts.push(handle);
    }

    fn add_overlay(&mut self, overlay: Overlay) -> OverlayHandle {
        self.next_overlay += 1;
        let handle = OverlayHandle(self.next_overlay);
        self.overlays.push((handle, overlay));
        handle
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        self.overlays.retain(|(h, _)| *h != handle);
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        self.fitted.push(bounds);
    }

    fn show_message(&mut self, message: TransientMessage) {
        self.messages.push(message);
    }

    fn set_layer_options(&mut self, names: &[String]) {
        self.layer_options = names.to_vec();
    }
}

/// Source answering from canned responses keyed by layer name.
#[derive(Debug, Clone)]
pub struct StubSource {
    pub layers: Result<Vec<String>, FetchError>,
    pub responses: HashMap<String, Result<FeatureCollection, FetchError>>,
}

impl StubSource {
    pub fn new() -> Self {
        Self {
            layers: Ok(Vec::new()),
            responses: HashMap::new(),
        }
    }

    pub fn with(mut self, layer: &str, response: Result<FeatureCollection, FetchError>) -> Self {
        self.responses.insert(layer.to_string(), response);
        self
    }
}

impl FeatureSource for StubSource {
    fn layer_names(&self) -> Result<Vec<String>, FetchError> {
        self.layers.clone()
    }

    fn fetch(&self, request: &LayerRequest) -> Result<FeatureCollection, FetchError> {
        self.responses
            .get(&request.layer)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Status {
                code: 404,
                body: format!("unknown layer {}", request.layer),
            }))
    }
}
