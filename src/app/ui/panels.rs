use eframe::egui::{self, Align, Context, Layout};

use archgrow::NavigationState;

use super::super::{ViewModel, ViewerAction};
use super::controls::{advance_button, architecture_select, charge_controls, overlay_toggle};

pub(in crate::app) fn show_top_bar(
    ctx: &Context,
    navigation: &NavigationState,
    architectures: &[String],
    model: Option<&ViewModel>,
) -> Option<ViewerAction> {
    egui::TopBottomPanel::top("top_bar")
        .resizable(false)
        .show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading("archgrow");
                ui.separator();

                let selected = architecture_select(ui, navigation, architectures);
                let advanced = advance_button(ui, navigation);
                ui.separator();

                let charged = charge_controls(ui, model.map(|model| model.session.charge()));
                let toggled =
                    model.and_then(|model| overlay_toggle(ui, model.show_quadtree_overlay));

                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    ui.label(navigation.location().as_str());
                    if let Some(model) = model {
                        let store = model.session.store();
                        ui.label(format!(
                            "nodes: {}  edges: {}",
                            store.node_count(),
                            store.edge_count()
                        ));
                        if let Some(version) = model.session.dataset_version() {
                            ui.label(format!("version {version}"));
                        }
                    }
                });

                selected.or(advanced).or(charged).or(toggled)
            })
            .inner
        })
        .inner
}
