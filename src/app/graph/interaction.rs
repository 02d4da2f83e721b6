use eframe::egui::{self, PointerButton, Rect, Ui, Vec2};

use super::super::ViewModel;
use super::super::render_utils::screen_to_world;

const HOVER_SLOP: f32 = 3.0;
const ZOOM_RANGE: std::ops::RangeInclusive<f32> = 0.1..=8.0;
const SCROLL_ZOOM_RATE: f32 = 0.0018;

impl ViewModel {
    /// Scroll or pinch zooms about the pointer; right or middle drag pans;
    /// double-click restores the unscaled view.
    pub(in crate::app) fn handle_view_navigation(
        &mut self,
        ui: &Ui,
        rect: Rect,
        response: &egui::Response,
    ) {
        if response.double_clicked() {
            self.pan = Vec2::ZERO;
            self.zoom = 1.0;
            return;
        }

        if response.dragged_by(PointerButton::Secondary) || response.dragged_by(PointerButton::Middle) {
            self.pan += response.drag_delta();
        }

        if !response.hovered() {
            return;
        }
        let (scroll, pinch, pointer) = ui.input(|input| {
            (
                input.raw_scroll_delta.y,
                input.zoom_delta(),
                input.pointer.hover_pos(),
            )
        });
        let factor = pinch * (1.0 + scroll * SCROLL_ZOOM_RATE).clamp(0.85, 1.15);
        if (factor - 1.0).abs() <= f32::EPSILON {
            return;
        }

        let anchor = pointer.unwrap_or_else(|| rect.center());
        let world = screen_to_world(rect, self.pan, self.zoom, anchor);
        self.zoom = (self.zoom * factor).clamp(*ZOOM_RANGE.start(), *ZOOM_RANGE.end());
        self.pan = (anchor - rect.left_top()) - world * self.zoom;
    }

    /// Node under the pointer, judged against last frame's screen positions.
    pub(in crate::app) fn hovered_index(&self, ui: &Ui) -> Option<usize> {
        let pointer = ui.input(|input| input.pointer.hover_pos())?;
        let scratch = &self.view_scratch;

        scratch
            .screen_positions
            .iter()
            .zip(&scratch.screen_radii)
            .enumerate()
            .filter_map(|(index, (position, radius))| {
                let distance = (*position)?.distance(pointer);
                (distance <= radius + HOVER_SLOP).then_some((index, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    /// Primary-button drags move a node: it is pinned under the pointer
    /// while dragged and handed back to the simulation on release.
    pub(in crate::app) fn handle_node_drag(
        &mut self,
        rect: Rect,
        response: &egui::Response,
        hovered: Option<usize>,
    ) {
        if response.drag_started_by(PointerButton::Primary) {
            self.dragging = hovered.and_then(|index| self.session.store().id_at(index));
        }

        let Some(id) = self.dragging else {
            return;
        };

        if response.drag_stopped() {
            self.session.release(id);
            self.dragging = None;
            return;
        }

        if let Some(pointer) = response.interact_pointer_pos() {
            let world = screen_to_world(rect, self.pan, self.zoom, pointer);
            self.session.pin(id, world);
        }
    }
}
