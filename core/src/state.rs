use crate::overlay::Overlay;
use crate::port::{ChartHandle, ChartSlot, ChartSpec, OverlayHandle, UiPort};
use crate::source::LayerKind;

/// Holder for at most one live instance of something the port created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot<H> {
    live: Option<H>,
}

impl<H: Copy> Slot<H> {
    pub const fn empty() -> Self {
        Self { live: None }
    }

    pub fn get(&self) -> Option<H> {
        self.live
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    /// Hands the current instance back for destruction and leaves the slot empty.
    pub fn take(&mut self) -> Option<H> {
        self.live.take()
    }

    /// Installs a new instance. The previous one must already have been taken and destroyed.
    pub fn install(&mut self, new: H) -> H {
        debug_assert!(self.live.is_none(), "slot still holds a live instance");
        self.live = Some(new);
        new
    }
}

impl<H: Copy> Default for Slot<H> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Dashboard lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Loaded { kind: LayerKind, layer: String },
}

/// Chart and overlay handles owned by the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    phase: Phase,
    confidence_chart: Slot<ChartHandle>,
    satellite_chart: Slot<ChartHandle>,
    hotspot_overlay: Slot<OverlayHandle>,
    selector_overlay: Slot<OverlayHandle>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardState {
    pub fn new() -> Self {
        Self {
            phase: Phase::Empty,
            confidence_chart: Slot::empty(),
            satellite_chart: Slot::empty(),
            hotspot_overlay: Slot::empty(),
            selector_overlay: Slot::empty(),
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn set_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }

    fn chart_slot(&mut self, slot: ChartSlot) -> &mut Slot<ChartHandle> {
        match slot {
            ChartSlot::Confidence => &mut self.confidence_chart,
            ChartSlot::Satellite => &mut self.satellite_chart,
        }
    }

    fn overlay_slot(&mut self, kind: LayerKind) -> &mut Slot<OverlayHandle> {
        match kind {
            LayerKind::Hotspots => &mut self.hotspot_overlay,
            LayerKind::Selector => &mut self.selector_overlay,
        }
    }

    pub fn chart(&self, slot: ChartSlot) -> Option<ChartHandle> {
        match slot {
            ChartSlot::Confidence => self.confidence_chart.get(),
            ChartSlot::Satellite => self.satellite_chart.get(),
        }
    }

    pub fn overlay(&self, kind: LayerKind) -> Option<OverlayHandle> {
        match kind {
            LayerKind::Hotspots => self.hotspot_overlay.get(),
            LayerKind::Selector => self.selector_overlay.get(),
        }
    }

    /// Destroys the chart currently in `slot`, then creates the new one.
    pub fn replace_chart(
        &mut self,
        port: &mut dyn UiPort,
        slot: ChartSlot,
        spec: ChartSpec,
    ) -> ChartHandle {
        let target = self.chart_slot(slot);
        if let Some(old) = target.take() {
            port.destroy_chart(old);
        }
        target.install(port.create_chart(slot, spec))
    }

    /// Removes the overlay of the same kind, then maps the new one.
    pub fn replace_overlay(&mut self, port: &mut dyn UiPort, overlay: Overlay) -> OverlayHandle {
        let target = self.overlay_slot(overlay.kind);
        if let Some(old) = target.take() {
            port.remove_overlay(old);
        }
        target.install(port.add_overlay(overlay))
    }

    pub fn remove_overlay(&mut self, port: &mut dyn UiPort, kind: LayerKind) {
        if let Some(old) = self.overlay_slot(kind).take() {
            port.remove_overlay(old);
        }
    }

    pub fn clear_charts(&mut self, port: &mut dyn UiPort) {
        for slot in ChartSlot::ALL {
            if let Some(old) = self.chart_slot(slot).take() {
                port.destroy_chart(old);
            }
        }
    }

    /// Destroys every chart and overlay and returns to [`Phase::Empty`].
    pub fn clear(&mut self, port: &mut dyn UiPort) {
        self.clear_charts(port);
        self.remove_overlay(port, LayerKind::Hotspots);
        self.remove_overlay(port, LayerKind::Selector);
        self.phase = Phase::Empty;
    }

    pub fn live_charts(&self) -> usize {
        usize::from(self.confidence_chart.is_live()) + usize::from(self.satellite_chart.is_live())
    }

    pub fn live_overlays(&self) -> usize {
        usize::from(self.hotspot_overlay.is_live()) + usize::from(self.selector_overlay.is_live())
    }
}
