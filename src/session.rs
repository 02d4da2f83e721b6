use eframe::egui::Vec2;
use url::Url;

use crate::dataset::Dataset;
use crate::graph::{GraphError, GraphStore, NodeId};
use crate::layout::{ChargeController, Frame, LayoutConfig, LayoutEngine};
use crate::navigation::NavigationState;

/// Everything belonging to one page view: where it was navigated to, the
/// graph grown from the loaded dataset, and the layout animating it.
pub struct GraphSession {
    navigation: NavigationState,
    store: GraphStore,
    layout: LayoutEngine,
    charge: ChargeController,
    dataset_version: Option<String>,
}

impl GraphSession {
    pub fn new(navigation: NavigationState, config: LayoutConfig) -> Self {
        Self {
            navigation,
            store: GraphStore::new(),
            layout: LayoutEngine::new(config),
            charge: ChargeController::new(config.charge_step),
            dataset_version: None,
        }
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn store(&self) -> &GraphStore {
        &self.store
    }

    pub fn layout(&self) -> &LayoutEngine {
        &self.layout
    }

    pub fn dataset_version(&self) -> Option<&str> {
        self.dataset_version.as_deref()
    }

    /// Applies `dataset` all-or-nothing, then starts the layout.
    pub fn load(&mut self, dataset: &Dataset) -> Result<(), GraphError> {
        let store = dataset.build_store()?;

        let charge = self.layout.charge();
        let mut layout = LayoutEngine::new(*self.layout.config());
        layout.lower_charge(charge);

        self.store = store;
        self.layout = layout;
        self.dataset_version = dataset.version.clone();
        tracing::info!(
            resource = %self.navigation.resource_key(),
            nodes = self.store.node_count(),
            edges = self.store.edge_count(),
            "graph built"
        );
        self.update();
        Ok(())
    }

    /// Gives new nodes a body and restarts the simulation.
    pub fn update(&mut self) {
        self.layout.start(&self.store);
        tracing::debug!(bodies = self.layout.materialized_count(), "update");
    }

    pub fn tick(&mut self) -> bool {
        self.layout.step(&self.store)
    }

    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        self.layout.run_until_settled(&self.store, max_ticks)
    }

    pub fn charge(&self) -> f32 {
        self.layout.charge()
    }

    pub fn decrease_charge(&mut self) -> f32 {
        let charge = self.charge.decrease_charge(&mut self.layout);
        self.update();
        charge
    }

    pub fn advance(&self) -> Url {
        self.navigation.advance()
    }

    pub fn change_architecture(&self, architecture: &str) -> Url {
        self.navigation.change_architecture(architecture)
    }

    pub fn frame(&self) -> Frame {
        self.layout.frame(&self.store)
    }

    pub fn position(&self, id: NodeId) -> Option<Vec2> {
        self.layout.position(id)
    }

    pub fn pin(&mut self, id: NodeId, position: Vec2) {
        self.layout.pin(id, position);
    }

    pub fn release(&mut self, id: NodeId) {
        self.layout.release(id);
    }
}
