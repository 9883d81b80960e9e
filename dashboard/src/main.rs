use anyhow::Context;
use charts::ChartView;
use config::DashboardConfig;
use fetch::HttpSource;
use firmscore::controller::{Controller, LoadTicket};
use firmscore::feature::FeatureCollection;
use firmscore::port::{ChartSlot, DisplaySlot, MessageKind, UiEvent};
use firmscore::prelude::{DashboardError, FetchError};
use firmscore::state::Phase;
use iced::{
    time,
    widget::{button, column, pick_list, row, scrollable, text, text_input, Canvas, Column, Container},
    Alignment, Color, Element, Length, Subscription, Task, Theme,
};
use log::{debug, info};
use map::{MapEvent, MapView};
use port::ScreenPort;
use std::time::{Duration, Instant};

mod charts;
mod config;
mod fetch;
mod map;
mod port;

const ERROR_TEXT: Color = Color::from_rgb(0.95, 0.4, 0.35);
const INFO_TEXT: Color = Color::from_rgb(0.6, 0.85, 0.6);

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let config = DashboardConfig::from_env()?;
    let source = HttpSource::new(config.source.clone(), config.request_timeout())?;
    info!("dashboard source: {:?}", config.source);

    iced::application(
        move || Dashboard::boot(&config, source.clone()),
        Dashboard::update,
        Dashboard::view,
    )
    .title(application_title)
    .subscription(application_subscription)
    .theme(application_theme)
    .run()
    .context("running dashboard window")
}

fn application_title(_: &Dashboard) -> String {
    "FIRMS Honduras: focos de calor".into()
}

fn application_subscription(_: &Dashboard) -> Subscription<Message> {
    time::every(Duration::from_millis(500)).map(|_| Message::Tick)
}

fn application_theme(_: &Dashboard) -> Theme {
    Theme::Dark
}

struct Dashboard {
    controller: Controller,
    port: ScreenPort,
    source: HttpSource,
    date: String,
    selected_layer: Option<String>,
    show_panel: bool,
    in_flight: usize,
}

#[derive(Debug, Clone)]
enum Message {
    Tick,
    LayersFetched(Result<Vec<String>, FetchError>),
    LayerSelected(String),
    DateChanged(String),
    LoadClicked,
    ClearClicked,
    LayerFetched(LoadTicket, Result<FeatureCollection, DashboardError>),
    Map(MapEvent),
    ToggleDashboard,
}

impl Dashboard {
    fn boot(config: &DashboardConfig, source: HttpSource) -> (Self, Task<Message>) {
        let controller = Controller::new(config.source.hotspot_layer())
            .with_message_duration(config.message_duration());
        let fetch_layers = source.clone().layer_names();
        (
            Dashboard {
                controller,
                port: ScreenPort::new(config.viewport()),
                source,
                date: String::new(),
                selected_layer: None,
                show_panel: true,
                in_flight: 0,
            },
            Task::perform(fetch_layers, Message::LayersFetched),
        )
    }

    fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => {
                state.port.expire_message(Instant::now());
                Task::none()
            }
            Message::LayersFetched(result) => {
                state.controller.apply_layer_names(&mut state.port, result);
                Task::none()
            }
            Message::LayerSelected(name) => {
                state.selected_layer = Some(name.clone());
                state.start(UiEvent::LayerSelected(name))
            }
            Message::DateChanged(date) => {
                state.date = date;
                Task::none()
            }
            Message::LoadClicked => {
                let date = Some(state.date.trim().to_string()).filter(|d| !d.is_empty());
                state.start(UiEvent::LoadClicked { date })
            }
            Message::ClearClicked => {
                state.selected_layer = None;
                state.start(UiEvent::ClearClicked)
            }
            Message::LayerFetched(ticket, result) => {
                state.in_flight = state.in_flight.saturating_sub(1);
                let id = ticket.id;
                if let Err(err) = state.controller.finish_load(&mut state.port, ticket, result) {
                    debug!("load #{id} ended without data: {err}");
                }
                Task::none()
            }
            Message::Map(event) => {
                map::apply(state.port.viewport_mut(), event);
                Task::none()
            }
            Message::ToggleDashboard => {
                state.show_panel = !state.show_panel;
                Task::none()
            }
        }
    }

    /// Hands an event to the controller and fetches whatever load it started.
    fn start(&mut self, event: UiEvent) -> Task<Message> {
        match self.controller.on_event(&mut self.port, &event) {
            Some(ticket) => {
                self.in_flight += 1;
                let fetch = self.source.clone().fetch(ticket.request.clone());
                Task::perform(fetch, move |result| {
                    Message::LayerFetched(ticket.clone(), result)
                })
            }
            None => Task::none(),
        }
    }

    fn view(state: &Self) -> Element<'_, Message> {
        let map = Canvas::new(MapView::new(state.port.overlays(), state.port.viewport()))
            .width(Length::Fill)
            .height(Length::Fill);
        let map: Element<'_, MapEvent> = map.into();

        let toggle_label = if state.show_panel {
            "Ocultar panel"
        } else {
            "Mostrar panel"
        };
        let map_column = column![
            row![
                button(toggle_label)
                    .on_press(Message::ToggleDashboard)
                    .padding(6),
                text(state.phase_label()).size(14),
            ]
            .spacing(12)
            .align_y(Alignment::Center),
            map.map(Message::Map),
        ]
        .spacing(8)
        .width(Length::Fill);

        let layout = if state.show_panel {
            row![state.panel(), map_column].spacing(16)
        } else {
            row![map_column]
        };

        Container::new(layout.padding(12))
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn phase_label(&self) -> String {
        let phase = match self.controller.phase() {
            Phase::Empty => "Sin capa cargada".to_string(),
            Phase::Loaded { layer, .. } => format!("Capa: {layer}"),
        };
        if self.in_flight > 0 {
            format!("{phase} (cargando...)")
        } else {
            phase
        }
    }

    fn panel(&self) -> Element<'_, Message> {
        let controls = column![
            text("Focos de calor FIRMS").size(24),
            pick_list(
                self.port.layer_options(),
                self.selected_layer.clone(),
                Message::LayerSelected,
            )
            .placeholder("Seleccione una capa")
            .width(Length::Fill),
            row![
                text_input("AAAA-MM-DD", &self.date)
                    .on_input(Message::DateChanged)
                    .on_submit(Message::LoadClicked)
                    .padding(6),
                button("Cargar").on_press(Message::LoadClicked).padding(6),
                button("Limpiar").on_press(Message::ClearClicked).padding(6),
            ]
            .spacing(8)
            .align_y(Alignment::Center),
        ]
        .spacing(10);

        let message = match self.port.message() {
            Some(message) => {
                let color = match message.kind {
                    MessageKind::Error => ERROR_TEXT,
                    MessageKind::Info => INFO_TEXT,
                };
                text(message.text.clone()).size(14).color(color)
            }
            None => text("").size(14),
        };

        let stats = DisplaySlot::ALL
            .iter()
            .fold(Column::new().spacing(4), |col, slot| {
                col.push(
                    row![
                        text(slot.label()).size(14).width(Length::Fixed(140.0)),
                        text(self.port.display(*slot)).size(18),
                    ]
                    .spacing(8),
                )
            });

        let satellites = if self.port.satellites().is_empty() {
            Column::new().push(text("Sin detecciones").size(12))
        } else {
            self.port
                .satellites()
                .iter()
                .fold(Column::new().spacing(2), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        let charts = ChartSlot::ALL
            .iter()
            .fold(Column::new().spacing(12), |col, slot| {
                match self.port.chart(*slot) {
                    Some(spec) => col.push(
                        column![
                            text(spec.title.clone()).size(16),
                            Canvas::new(ChartView::new(spec))
                                .width(Length::Fill)
                                .height(Length::Fixed(200.0)),
                        ]
                        .spacing(4),
                    ),
                    None => col,
                }
            });

        let content = column![
            controls,
            message,
            text("Resumen").size(18),
            stats,
            text("Por satélite").size(16),
            Container::new(satellites).padding(4),
            charts,
        ]
        .spacing(12)
        .padding(8);

        Container::new(scrollable(content))
            .width(Length::Fixed(380.0))
            .height(Length::Fill)
            .into()
    }
}
