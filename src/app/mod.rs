use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context, Pos2, Vec2};
use tracing::{error, info};
use url::Url;

use archgrow::layout::QuadtreeCell;
use archgrow::{Dataset, GraphLoader, GraphSession, LayoutConfig, NavigationState, NodeId};

use render_utils::CategoryPalette;

mod graph;
mod render_utils;
mod ui;

pub struct ViewerOptions {
    pub loader: GraphLoader,
    pub layout: LayoutConfig,
    pub architectures: Vec<String>,
}

pub struct ArchGrowApp {
    options: ViewerOptions,
    navigation: NavigationState,
    state: AppState,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Dataset, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
enum ViewerAction {
    Advance,
    ChangeArchitecture(String),
    DecreaseCharge,
    ShowQuadtree(bool),
}

struct ViewModel {
    session: GraphSession,
    pan: Vec2,
    zoom: f32,
    dragging: Option<NodeId>,
    show_quadtree_overlay: bool,
    palette: CategoryPalette,
    view_scratch: ViewScratch,
}

#[derive(Default)]
struct ViewScratch {
    screen_positions: Vec<Option<Pos2>>,
    screen_radii: Vec<f32>,
    quadtree_cells: Vec<QuadtreeCell>,
}

impl ViewModel {
    fn new(session: GraphSession) -> Self {
        Self {
            session,
            pan: Vec2::ZERO,
            zoom: 1.0,
            dragging: None,
            show_quadtree_overlay: false,
            palette: CategoryPalette::default(),
            view_scratch: ViewScratch::default(),
        }
    }
}

impl ArchGrowApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        options: ViewerOptions,
        navigation: NavigationState,
    ) -> Self {
        let state = Self::start_load(&options.loader, &navigation);
        Self {
            options,
            navigation,
            state,
        }
    }

    fn spawn_load(
        loader: GraphLoader,
        navigation: NavigationState,
    ) -> Receiver<Result<Dataset, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = loader
                .fetch(&navigation)
                .map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(loader: &GraphLoader, navigation: &NavigationState) -> AppState {
        info!(
            resource = %navigation.resource_key(),
            path = %loader.resource_path(navigation).display(),
            "loading dataset"
        );
        AppState::Loading {
            rx: Self::spawn_load(loader.clone(), navigation.clone()),
        }
    }

    fn build_session(&self, dataset: &Dataset) -> AppState {
        let mut session = GraphSession::new(self.navigation.clone(), self.options.layout);
        match session.load(dataset) {
            Ok(()) => AppState::Ready(Box::new(ViewModel::new(session))),
            Err(load_error) => {
                error!(
                    resource = %self.navigation.resource_key(),
                    error = %load_error,
                    "dataset references a node it never adds"
                );
                AppState::Error(format!(
                    "{}: {load_error}",
                    self.navigation.resource_key()
                ))
            }
        }
    }

    fn navigate(&mut self, target: Url) {
        info!(%target, "navigating");
        self.navigation = NavigationState::from_url(&target);
        self.state = Self::start_load(&self.options.loader, &self.navigation);
    }

    fn apply_action(&mut self, ctx: &Context, action: ViewerAction) {
        match action {
            ViewerAction::Advance => {
                let target = self.navigation.advance();
                self.navigate(target);
            }
            ViewerAction::ChangeArchitecture(architecture) => {
                let target = self.navigation.change_architecture(&architecture);
                self.navigate(target);
            }
            ViewerAction::DecreaseCharge => {
                if let AppState::Ready(model) = &mut self.state {
                    model.session.decrease_charge();
                }
            }
            ViewerAction::ShowQuadtree(show) => {
                if let AppState::Ready(model) = &mut self.state {
                    model.show_quadtree_overlay = show;
                }
            }
        }
        ctx.request_repaint();
    }
}

impl eframe::App for ArchGrowApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let model = match &self.state {
            AppState::Ready(model) => Some(model.as_ref()),
            _ => None,
        };
        let action = ui::show_top_bar(ctx, &self.navigation, &self.options.architectures, model);

        let mut transition = None;
        match &mut self.state {
            AppState::Loading { rx } => {
                match rx.try_recv() {
                    Ok(Ok(dataset)) => transition = Some(Ok(dataset)),
                    Ok(Err(message)) => transition = Some(Err(message)),
                    Err(TryRecvError::Empty) => {}
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(Err("Background load worker disconnected".to_owned()));
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading(format!("Loading {}...", self.navigation.resource_key()));
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(message) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load dataset");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                });
            }
            AppState::Ready(model) => {
                egui::CentralPanel::default()
                    .frame(egui::Frame::NONE)
                    .show(ctx, |ui| model.draw_graph(ui));
            }
        }

        if let Some(result) = transition {
            self.state = match result {
                Ok(dataset) => self.build_session(&dataset),
                Err(message) => {
                    error!(resource = %self.navigation.resource_key(), %message, "error loading dataset");
                    AppState::Error(message)
                }
            };
        }

        if let Some(action) = action {
            self.apply_action(ctx, action);
        }
    }
}
