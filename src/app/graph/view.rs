use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, StrokeKind, Ui, vec2};

use archgrow::util::short_name;

use super::super::ViewModel;
use super::super::render_utils::{
    EDGE_COLOR, circle_visible, draw_background, world_to_screen,
};

impl ViewModel {
    fn update_screen_space(&mut self, rect: Rect) {
        let (pan, zoom) = (self.pan, self.zoom);
        let store = self.session.store();
        let scratch = &mut self.view_scratch;

        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        for (id, node) in store.node_ids().zip(store.nodes()) {
            let position = self
                .session
                .position(id)
                .map(|world| world_to_screen(rect, pan, zoom, world));
            scratch.screen_positions.push(position);
            scratch.screen_radii.push((node.radius() * zoom).max(1.0));
        }
    }

    /// Outlines the Barnes-Hut cells; leaves are drawn stronger than the
    /// cells that only aggregate them.
    fn draw_quadtree_overlay(&mut self, painter: &egui::Painter, rect: Rect) {
        let cells = &mut self.view_scratch.quadtree_cells;
        self.session.layout().quadtree_cells(cells);

        for cell in cells.iter() {
            let half = vec2(cell.half_extent, cell.half_extent);
            let outline = Rect::from_min_max(
                world_to_screen(rect, self.pan, self.zoom, cell.center - half),
                world_to_screen(rect, self.pan, self.zoom, cell.center + half),
            );
            if !outline.intersects(rect) {
                continue;
            }

            let opacity = if cell.is_leaf { 110 } else { 50 };
            let width = (1.4 - 0.08 * cell.depth as f32).max(0.4);
            painter.rect_stroke(
                outline,
                0.0,
                Stroke::new(width, Color32::from_rgba_unmultiplied(60, 130, 200, opacity)),
                StrokeKind::Middle,
            );
        }
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        draw_background(&painter, rect, self.pan, self.zoom);

        self.handle_view_navigation(ui, rect, &response);

        let hovered = self.hovered_index(ui);
        self.handle_node_drag(rect, &response, hovered);

        if self.session.tick() || self.dragging.is_some() || response.dragged() {
            ui.ctx().request_repaint();
        }

        self.update_screen_space(rect);

        if self.show_quadtree_overlay {
            self.draw_quadtree_overlay(&painter, rect);
        }

        let edge_width = (2.0 * self.zoom).clamp(0.5, 6.0);
        let scratch = &self.view_scratch;
        for edge in self.session.store().edges() {
            let (Some(start), Some(end)) = (
                scratch.screen_positions[edge.source.index()],
                scratch.screen_positions[edge.target.index()],
            ) else {
                continue;
            };
            painter.line_segment([start, end], Stroke::new(edge_width, EDGE_COLOR));
        }

        let store = self.session.store();
        for (index, node) in store.nodes().iter().enumerate() {
            let Some(position) = scratch.screen_positions[index] else {
                continue;
            };
            let radius = scratch.screen_radii[index];
            if !circle_visible(rect, position, radius) {
                continue;
            }

            let color = self.palette.color(node.color_key());
            painter.circle_filled(position, radius, color);

            let is_hovered = hovered == Some(index);
            if is_hovered {
                painter.circle_stroke(position, radius + 2.0, Stroke::new(1.5, Color32::from_gray(40)));
            }

            if is_hovered || self.zoom > 2.0 {
                painter.text(
                    position + vec2(radius + 4.0, 0.0),
                    Align2::LEFT_CENTER,
                    short_name(&node.name),
                    FontId::proportional(11.0),
                    Color32::from_gray(60),
                );
            }
        }

        if let Some(node) = hovered.and_then(|index| store.nodes().get(index)) {
            ui.ctx().set_cursor_icon(egui::CursorIcon::Grab);
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  size {}", node.name, node.size),
                FontId::proportional(13.0),
                Color32::from_gray(30),
            );
        }
    }
}
