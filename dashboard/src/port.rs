use firmscore::overlay::Overlay;
use firmscore::port::{
    ChartHandle, ChartSlot, ChartSpec, DisplaySlot, OverlayHandle, TransientMessage, UiPort,
};
use firmscore::projection::{GeoBounds, Viewport};
use firmscore::render::EMPTY_VALUE;
use log::debug;
use std::time::Instant;

/// Margin kept around fitted bounds, in pixels.
const FIT_PADDING: f64 = 24.0;

/// What the iced view shows. The controller writes it through [`UiPort`], the view reads it.
#[derive(Debug)]
pub struct ScreenPort {
    displays: [String; 6],
    satellites: Vec<String>,
    charts: Vec<(ChartHandle, ChartSlot, ChartSpec)>,
    overlays: Vec<(OverlayHandle, Overlay)>,
    viewport: Viewport,
    message: Option<(TransientMessage, Instant)>,
    layer_options: Vec<String>,
    next_handle: u64,
}

impl ScreenPort {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            displays: DisplaySlot::ALL.map(|_| EMPTY_VALUE.to_string()),
            satellites: Vec::new(),
            charts: Vec::new(),
            overlays: Vec::new(),
            viewport,
            message: None,
            layer_options: Vec::new(),
            next_handle: 0,
        }
    }

    fn issue(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn display(&self, slot: DisplaySlot) -> &str {
        &self.displays[slot.index()]
    }

    pub fn satellites(&self) -> &[String] {
        &self.satellites
    }

    pub fn chart(&self, slot: ChartSlot) -> Option<&ChartSpec> {
        self.charts
            .iter()
            .find(|(_, s, _)| *s == slot)
            .map(|(_, _, spec)| spec)
    }

    pub fn overlays(&self) -> impl Iterator<Item = &Overlay> + '_ {
        self.overlays.iter().map(|(_, overlay)| overlay)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn layer_options(&self) -> &[String] {
        &self.layer_options
    }

    pub fn message(&self) -> Option<&TransientMessage> {
        self.message.as_ref().map(|(message, _)| message)
    }

    /// Drops the message once its duration has passed. Returns whether one was dropped.
    pub fn expire_message(&mut self, now: Instant) -> bool {
        match &self.message {
            Some((message, shown_at)) if now.duration_since(*shown_at) >= message.duration => {
                self.message = None;
                true
            }
            _ => false,
        }
    }
}

impl UiPort for ScreenPort {
    fn set_display(&mut self, slot: DisplaySlot, value: &str) {
        self.displays[slot.index()] = value.to_string();
    }

    fn set_satellite_list(&mut self, entries: &[String]) {
        self.satellites = entries.to_vec();
    }

    fn create_chart(&mut self, slot: ChartSlot, spec: ChartSpec) -> ChartHandle {
        let handle = ChartHandle(self.issue());
        self.charts.push((handle, slot, spec));
        handle
    }

    fn destroy_chart(&mut self, handle: ChartHandle) {
        self.charts.retain(|(h, _, _)| *h != handle);
    }

    fn add_overlay(&mut self, overlay: Overlay) -> OverlayHandle {
        let handle = OverlayHandle(self.issue());
        debug!(
            "overlay {} mapped: {} markers, {} shapes",
            overlay.layer,
            overlay.marker_count(),
            overlay.shape_count()
        );
        self.overlays.push((handle, overlay));
        handle
    }

    fn remove_overlay(&mut self, handle: OverlayHandle) {
        self.overlays.retain(|(h, _)| *h != handle);
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        self.viewport.fit_bounds(bounds, FIT_PADDING);
    }

    fn show_message(&mut self, message: TransientMessage) {
        self.message = Some((message, Instant::now()));
    }

    fn set_layer_options(&mut self, names: &[String]) {
        self.layer_options = names.to_vec();
    }
}
