//! Layer load/clear flow.
//!
//! The dashboard is either `Empty` or `Loaded`. A load is split into [`Controller::begin_load`]
//! and [`Controller::finish_load`] so an asynchronous front end can run the fetch in between.
//! In-flight loads are never cancelled: every `finish_load` renders its whole dataset in one
//! step, so when loads overlap the last one to complete is what stays on screen.

use crate::aggregate::{aggregate, Summary};
use crate::feature::FeatureCollection;
use crate::overlay::Overlay;
use crate::port::{MessageKind, TransientMessage, UiEvent, UiPort};
use crate::prelude::{DashboardError, DashboardResult, FetchError};
use crate::render::Renderer;
use crate::source::{FeatureSource, LayerKind, LayerRequest};
use crate::state::{DashboardState, Phase};
use crate::telemetry::LoadMetrics;
use log::{debug, error, info, warn};
use std::time::Duration;

/// A load that has been started and awaits its fetch result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub id: u64,
    pub request: LayerRequest,
}

pub struct Controller {
    state: DashboardState,
    metrics: LoadMetrics,
    hotspot_layer: String,
    message_duration: Duration,
    next_ticket: u64,
    summary: Option<Summary>,
}

impl Controller {
    pub const DEFAULT_MESSAGE_DURATION: Duration = Duration::from_secs(4);

    /// `hotspot_layer` is the layer requested when the load button is pressed.
    pub fn new(hotspot_layer: impl Into<String>) -> Self {
        Self {
            state: DashboardState::new(),
            metrics: LoadMetrics::new(),
            hotspot_layer: hotspot_layer.into(),
            message_duration: Self::DEFAULT_MESSAGE_DURATION,
            next_ticket: 0,
            summary: None,
        }
    }

    pub fn with_message_duration(mut self, duration: Duration) -> Self {
        self.message_duration = duration;
        self
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn phase(&self) -> &Phase {
        self.state.phase()
    }

    /// Summary currently on display.
    pub fn summary(&self) -> Option<&Summary> {
        self.summary.as_ref()
    }

    pub fn metrics(&self) -> &LoadMetrics {
        &self.metrics
    }

    /// The layer request an event asks for, if any.
    pub fn request_for(&self, event: &UiEvent) -> Option<LayerRequest> {
        match event {
            UiEvent::LoadClicked { date } => Some(LayerRequest::hotspots(
                self.hotspot_layer.clone(),
                date.clone(),
            )),
            UiEvent::LayerSelected(name) if !name.trim().is_empty() => {
                Some(LayerRequest::selector(name.clone()))
            }
            UiEvent::LayerSelected(_) | UiEvent::ClearClicked => None,
        }
    }

    /// Reacts to a UI event. Returns the ticket of the load it started, if any; the caller
    /// fetches the ticket's request and hands the result to [`Controller::finish_load`].
    pub fn on_event(&mut self, port: &mut dyn UiPort, event: &UiEvent) -> Option<LoadTicket> {
        if *event == UiEvent::ClearClicked {
            self.clear(port);
            return None;
        }
        let request = self.request_for(event)?;
        Some(self.begin_load(port, request))
    }

    /// Synchronous event handling against a blocking source.
    pub fn dispatch(
        &mut self,
        port: &mut dyn UiPort,
        source: &dyn FeatureSource,
        event: &UiEvent,
    ) -> Option<DashboardResult<Summary>> {
        let ticket = self.on_event(port, event)?;
        let result = source.fetch(&ticket.request);
        Some(self.finish_load(port, ticket, result))
    }

    /// Starts a load: the overlay of the same kind is removed right away.
    pub fn begin_load(&mut self, port: &mut dyn UiPort, request: LayerRequest) -> LoadTicket {
        self.next_ticket += 1;
        self.state.remove_overlay(port, request.kind);
        info!(
            "load #{} started: {} layer {}",
            self.next_ticket,
            request.kind,
            request.describe()
        );
        LoadTicket {
            id: self.next_ticket,
            request,
        }
    }

    /// Completes a load with its fetch result.
    ///
    /// Errors are already handled when this returns: the user has been shown a message and the
    /// dashboard is back to `Empty`. The result is returned for callers that want to log it.
    pub fn finish_load<E>(
        &mut self,
        port: &mut dyn UiPort,
        ticket: LoadTicket,
        result: Result<FeatureCollection, E>,
    ) -> DashboardResult<Summary>
    where
        E: Into<DashboardError>,
    {
        let LoadTicket { id, request } = ticket;

        let collection = match result {
            Ok(collection) if collection.is_empty() => {
                return Err(self.fail(
                    port,
                    id,
                    &request,
                    DashboardError::EmptyResult {
                        layer: request.describe(),
                    },
                ))
            }
            Ok(collection) => collection,
            Err(err) => return Err(self.fail(port, id, &request, err.into())),
        };

        let overlay = Overlay::build(request.kind, &request.layer, &collection);
        let bounds = overlay.bounds;
        self.state.replace_overlay(port, overlay);
        if request.kind == LayerKind::Selector {
            if let Some(bounds) = bounds {
                port.fit_bounds(bounds);
            }
        }

        let summary = aggregate(&collection.features);
        Renderer::render(&mut self.state, port, &summary);
        self.state.set_phase(Phase::Loaded {
            kind: request.kind,
            layer: request.layer.clone(),
        });
        self.metrics.record_loaded();
        info!(
            "load #{id} finished: {} features from {}",
            summary.total,
            request.describe()
        );
        debug!("load counters {:?}", self.metrics.snapshot());

        self.summary = Some(summary.clone());
        Ok(summary)
    }

    /// Blocking load: begin, fetch, finish.
    pub fn load(
        &mut self,
        port: &mut dyn UiPort,
        source: &dyn FeatureSource,
        request: LayerRequest,
    ) -> DashboardResult<Summary> {
        let ticket = self.begin_load(port, request);
        let result = source.fetch(&ticket.request);
        self.finish_load(port, ticket, result)
    }

    /// Removes both overlays, blanks the dashboard, and returns to `Empty`.
    pub fn clear(&mut self, port: &mut dyn UiPort) {
        Renderer::reset(&mut self.state, port);
        self.state.clear(port);
        self.summary = None;
        info!("dashboard cleared");
    }

    /// Fills the layer selector from the source.
    pub fn populate_layers(
        &mut self,
        port: &mut dyn UiPort,
        source: &dyn FeatureSource,
    ) -> Result<Vec<String>, FetchError> {
        let result = source.layer_names();
        self.apply_layer_names(port, result.clone());
        result
    }

    /// Hands a fetched layer list to the selector, or reports why there is none.
    pub fn apply_layer_names(
        &mut self,
        port: &mut dyn UiPort,
        result: Result<Vec<String>, FetchError>,
    ) {
        match result {
            Ok(names) => {
                info!("{} selectable layers", names.len());
                port.set_layer_options(&names);
            }
            Err(err) => {
                error!("layer list unavailable: {err}");
                port.show_message(TransientMessage {
                    kind: MessageKind::Error,
                    text: "No se pudo cargar la lista de capas.".to_string(),
                    duration: self.message_duration,
                });
            }
        }
    }

    fn fail(
        &mut self,
        port: &mut dyn UiPort,
        id: u64,
        request: &LayerRequest,
        err: DashboardError,
    ) -> DashboardError {
        let kind = match &err {
            DashboardError::EmptyResult { .. } => {
                warn!("load #{id}: {err}");
                self.metrics.record_empty();
                MessageKind::Info
            }
            DashboardError::Fetch(cause) => {
                error!(
                    "load #{id}: fetching {} layer {} failed: {cause:?}",
                    request.kind,
                    request.describe()
                );
                self.metrics.record_failed();
                MessageKind::Error
            }
            DashboardError::InvalidRequest(reason) => {
                error!("load #{id}: invalid request: {reason}");
                self.metrics.record_failed();
                MessageKind::Error
            }
        };

        self.state.remove_overlay(port, request.kind);
        Renderer::reset(&mut self.state, port);
        self.state.set_phase(Phase::Empty);
        self.summary = None;

        port.show_message(TransientMessage {
            kind,
            text: err.user_message(),
            duration: self.message_duration,
        });
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{ChartSlot, DisplaySlot};
    use crate::render::EMPTY_VALUE;
    use crate::testing::{MemoryPort, StubSource};
    use serde_json::json;

    fn collection(value: serde_json::Value) -> FeatureCollection {
        serde_json::from_value(value).unwrap()
    }

    fn hotspots() -> FeatureCollection {
        collection(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-86.1, 14.2]},
                 "properties": {"confidence": "h", "frp": 50, "satellite": "N"}},
                {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-86.4, 14.9]},
                 "properties": {"confidence": "n", "frp": 10, "satellite": "1"}}
            ]
        }))
    }

    fn departments() -> FeatureCollection {
        collection(json!({
            "type": "FeatureCollection",
            "features": [
                {"type": "Feature",
                 "geometry": {"type": "Polygon", "coordinates": [[[-87.0, 14.0], [-86.0, 14.0], [-86.0, 15.0], [-87.0, 14.0]]]},
                 "properties": {"confidence": "l", "frp": 7, "nombre": "Olancho"}}
            ]
        }))
    }

    fn source() -> StubSource {
        StubSource::new()
            .with("hotspots", Ok(hotspots()))
            .with("departamentos", Ok(departments()))
            .with("vacia", Ok(FeatureCollection::default()))
            .with("rota", Err(FetchError::Transport("connection reset".into())))
    }

    #[test]
    fn load_renders_and_enters_loaded() {
        let mut port = MemoryPort::default();
        let mut controller = Controller::new("hotspots");

        let summary = controller
            .dispatch(
                &mut port,
                &source(),
                &UiEvent::LoadClicked {
                    date: Some("2024-03-14".into()),
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(summary.total, 2);
        assert_eq!(port.display(DisplaySlot::Total), Some("2"));
        assert_eq!(port.display(DisplaySlot::FrpAverage), Some("30"));
        assert_eq!(port.overlays.len(), 1);
        assert!(port.fitted.is_empty());
        assert_eq!(
            controller.phase(),
            &Phase::Loaded {
                kind: LayerKind::Hotspots,
                layer: "hotspots".into()
            }
        );
    }

    #[test]
    fn selector_layer_fits_view_and_replaces_predecessor() {
        let mut port = MemoryPort::default();
        let mut controller = Controller::new("hotspots");
        let src = source();

        controller.dispatch(&mut port, &src, &UiEvent::LayerSelected("departamentos".into()));
        controller.dispatch(&mut port, &src, &UiEvent::LayerSelected("departamentos".into()));

        assert_eq!(port.overlays.len(), 1);
        assert_eq!(port.fitted.len(), 2);
        assert_eq!(controller.state().live_overlays(), 1);
    }

    #[test]
    fn one_overlay_of_each_kind() {
        let mut port = MemoryPort::default();
        let mut controller = Controller::new("hotspots");
        let src = source();

        controller.dispatch(&mut port, &src, &UiEvent::LoadClicked { date: None });
        controller.dispatch(&mut port, &src, &UiEvent::LayerSelected("departamentos".into()));
        controller.dispatch(&mut port, &src, &UiEvent::LoadClicked { date: None });

        assert_eq!(port.overlays.len(), 2);
        let kinds: Vec<LayerKind> = port.overlays.iter().map(|(_, o)| o.kind).collect();
        assert!(kinds.contains(&LayerKind::Hotspots));
        assert!(kinds.contains(&LayerKind::Selector));
        for slot in ChartSlot::ALL {
            assert_eq!(port.live_charts(slot), 1);
        }
    }

    #[test]
    fn empty_result_resets_to_empty_with_message() {
        let mut port = MemoryPort::default();
        let mut controller = Controller::new("hotspots");
        let src = source();

        controller.dispatch(&mut port, &src, &UiEvent::LayerSelected("departamentos".into()));
        let result = controller
            .dispatch(&mut port, &src, &UiEvent::LayerSelected("vacia".into()))
            .unwrap();

        assert!(matches!(result, Err(DashboardError::EmptyResult { .. })));
        assert_eq!(controller.phase(), &Phase::Empty);
        assert!(port.charts.is_empty());
        assert!(port.overlays.is_empty());
        assert_eq!(port.display(DisplaySlot::Total), Some(EMPTY_VALUE));
        assert_eq!(port.messages.len(), 1);
        assert_eq!(port.messages[0].kind, MessageKind::Info);
        assert_eq!(port.messages[0].duration, Controller::DEFAULT_MESSAGE_DURATION);
        assert!(controller.summary().is_none());
        assert_eq!(controller.metrics().snapshot().empty, 1);
    }

    #[test]
    fn fetch_failure_resets_to_empty_with_error_message() {
        let mut port = MemoryPort::default();
        let mut controller =
            Controller::new("hotspots").with_message_duration(Duration::from_millis(1500));
        let src = source();

        controller.dispatch(&mut port, &src, &UiEvent::LoadClicked { date: None });
        let result = controller
            .dispatch(&mut port, &src, &UiEvent::LayerSelected("rota".into()))
            .unwrap();

        assert!(matches!(
            result,
            Err(DashboardError::Fetch(FetchError::Transport(_)))
        ));
        assert_eq!(controller.phase(), &Phase::Empty);
        assert!(port.charts.is_empty());
        assert_eq!(port.messages.len(), 1);
        assert_eq!(port.messages[0].kind, MessageKind::Error);
        assert_eq!(port.messages[0].duration, Duration::from_millis(1500));
        assert_eq!(controller.metrics().snapshot().failed, 1);
        // The hotspot overlay is of the other kind and stays mapped.
        assert_eq!(port.overlays.len(), 1);
    }

    #[test]
    fn overlapping_loads_show_last_completed_dataset() {
        let mut port = MemoryPort::default();
        let mut controller = Controller::new("hotspots");

        let first = controller
            .on_event(&mut port, &UiEvent::LayerSelected("a".into()))
            .unwrap();
        let second = controller
            .on_event(&mut port, &UiEvent::LayerSelected("b".into()))
            .unwrap();
        assert!(second.id > first.id);

        controller
            .finish_load(&mut port, second, Ok::<_, FetchError>(departments()))
            .unwrap();
        controller
            .finish_load(&mut port, first, Ok::<_, FetchError>(hotspots()))
            .unwrap();

        // Only the first request's two hotspots are shown, nothing of the department layer.
        assert_eq!(port.display(DisplaySlot::Total), Some("2"));
        assert_eq!(port.display(DisplaySlot::Low), Some("0"));
        assert_eq!(port.satellites, vec!["N: 1".to_string(), "1: 1".to_string()]);
        assert_eq!(port.overlays.len(), 1);
        assert_eq!(port.overlays[0].1.layer, "a");
        for slot in ChartSlot::ALL {
            assert_eq!(port.live_charts(slot), 1);
        }
        let satellites = port.chart(ChartSlot::Satellite).unwrap();
        assert_eq!(satellites.total(), 2);
    }

    #[test]
    fn clear_returns_to_empty() {
        let mut port = MemoryPort::default();
        let mut controller = Controller::new("hotspots");
        let src = source();

        controller.dispatch(&mut port, &src, &UiEvent::LoadClicked { date: None });
        controller.dispatch(&mut port, &src, &UiEvent::LayerSelected("departamentos".into()));
        assert!(controller.dispatch(&mut port, &src, &UiEvent::ClearClicked).is_none());

        assert_eq!(controller.phase(), &Phase::Empty);
        assert!(port.overlays.is_empty());
        assert!(port.charts.is_empty());
        assert_eq!(controller.state().live_charts(), 0);
        assert_eq!(controller.state().live_overlays(), 0);
    }

    #[test]
    fn blank_selection_starts_nothing() {
        let mut port = MemoryPort::default();
        let mut controller = Controller::new("hotspots");
        assert!(controller
            .on_event(&mut port, &UiEvent::LayerSelected(String::new()))
            .is_none());
    }

    #[test]
    fn populate_layers_fills_selector() {
        let mut port = MemoryPort::default();
        let mut controller = Controller::new("hotspots");
        let mut src = source();
        src.layers = Ok(vec!["departamentos".into(), "municipios".into()]);

        controller.populate_layers(&mut port, &src).unwrap();
        assert_eq!(port.layer_options, vec!["departamentos", "municipios"]);

        src.layers = Err(FetchError::Status {
            code: 500,
            body: "boom".into(),
        });
        assert!(controller.populate_layers(&mut port, &src).is_err());
        assert_eq!(port.messages.len(), 1);
        assert_eq!(port.messages[0].text, "No se pudo cargar la lista de capas.");
        assert_eq!(port.layer_options.len(), 2);
    }
}
