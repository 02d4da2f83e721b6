use eframe::egui::{self, Ui};

use archgrow::NavigationState;

use super::super::ViewerAction;

pub(super) fn architecture_select(
    ui: &mut Ui,
    navigation: &NavigationState,
    architectures: &[String],
) -> Option<ViewerAction> {
    let current = navigation.architecture();
    let mut chosen = None;

    egui::ComboBox::from_id_salt("architecture")
        .selected_text(current)
        .show_ui(ui, |ui| {
            let listed = architectures.iter().any(|name| name == current);
            if !listed {
                let _ = ui.selectable_label(true, current);
            }
            for name in architectures {
                if ui.selectable_label(name == current, name).clicked() && name != current {
                    chosen = Some(name.clone());
                }
            }
        })
        .response
        .on_hover_text("Dataset family to grow.");

    chosen.map(ViewerAction::ChangeArchitecture)
}

pub(super) fn advance_button(ui: &mut Ui, navigation: &NavigationState) -> Option<ViewerAction> {
    if !navigation.shows_advance() {
        return None;
    }

    let label = match navigation.step() {
        Some(step) => format!("Next (step {step} → {})", navigation.next_step()),
        None => "Next".to_owned(),
    };
    ui.button(label)
        .on_hover_text("Load the next increment of this architecture.")
        .clicked()
        .then_some(ViewerAction::Advance)
}

pub(super) fn charge_controls(ui: &mut Ui, charge: Option<f32>) -> Option<ViewerAction> {
    let clicked = ui
        .add_enabled(charge.is_some(), egui::Button::new("Decrease charge"))
        .on_hover_text("Push nodes further apart and restart the layout.")
        .clicked();
    if let Some(charge) = charge {
        ui.label(format!("charge: {charge:.0}"));
    }
    clicked.then_some(ViewerAction::DecreaseCharge)
}

pub(super) fn overlay_toggle(ui: &mut Ui, shown: bool) -> Option<ViewerAction> {
    let mut show = shown;
    ui.checkbox(&mut show, "Quadtree")
        .on_hover_text("Overlay the Barnes-Hut cells used for the charge force.")
        .changed()
        .then_some(ViewerAction::ShowQuadtree(show))
}
