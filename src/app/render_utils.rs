use std::collections::HashMap;

use eframe::egui::{Color32, Painter, Pos2, Rect, Stroke, Vec2};

const CATEGORY10: [[u8; 3]; 10] = [
    [0x1f, 0x77, 0xb4],
    [0xff, 0x7f, 0x0e],
    [0x2c, 0xa0, 0x2c],
    [0xd6, 0x27, 0x28],
    [0x94, 0x67, 0xbd],
    [0x8c, 0x56, 0x4b],
    [0xe3, 0x77, 0xc2],
    [0x7f, 0x7f, 0x7f],
    [0xbc, 0xbd, 0x22],
    [0x17, 0xbe, 0xcf],
];

pub(super) const EDGE_COLOR: Color32 = Color32::from_rgb(0xcc, 0xcc, 0xcc);

/// Ordinal ten-colour palette: keys get colours in the order they are first
/// seen, cycling after ten.
#[derive(Default)]
pub(super) struct CategoryPalette {
    assigned: HashMap<usize, usize>,
}

impl CategoryPalette {
    pub(super) fn color(&mut self, key: usize) -> Color32 {
        let next = self.assigned.len();
        let slot = *self.assigned.entry(key).or_insert(next);
        let [r, g, b] = CATEGORY10[slot % CATEGORY10.len()];
        Color32::from_rgb(r, g, b)
    }
}

pub(super) fn draw_background(painter: &Painter, rect: Rect, pan: Vec2, zoom: f32) {
    painter.rect_filled(rect, 0.0, Color32::WHITE);

    let step = (50.0 * zoom.clamp(0.6, 1.8)).max(20.0);
    let origin = rect.left_top() + pan;
    let stroke = Stroke::new(1.0, Color32::from_rgba_unmultiplied(200, 205, 210, 60));

    let mut x = rect.left() + (origin.x - rect.left()).rem_euclid(step);
    while x < rect.right() {
        painter.line_segment([Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())], stroke);
        x += step;
    }

    let mut y = rect.top() + (origin.y - rect.top()).rem_euclid(step);
    while y < rect.bottom() {
        painter.line_segment([Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)], stroke);
        y += step;
    }
}

pub(super) fn circle_visible(rect: Rect, position: Pos2, radius: f32) -> bool {
    !(position.x + radius < rect.left()
        || position.x - radius > rect.right()
        || position.y + radius < rect.top()
        || position.y - radius > rect.bottom())
}

/// Layout coordinates are viewport pixels with the origin at the top-left.
pub(super) fn world_to_screen(rect: Rect, pan: Vec2, zoom: f32, world: Vec2) -> Pos2 {
    rect.left_top() + pan + world * zoom
}

pub(super) fn screen_to_world(rect: Rect, pan: Vec2, zoom: f32, screen: Pos2) -> Vec2 {
    (screen - rect.left_top() - pan) / zoom
}
