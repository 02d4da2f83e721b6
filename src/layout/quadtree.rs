use eframe::egui::{Vec2, vec2};

const MAX_DEPTH: usize = 16;

/// Axis-aligned square region of layout space.
#[derive(Clone, Copy, Debug)]
pub(super) struct Square {
    pub(super) min: Vec2,
    pub(super) side: f32,
}

impl Square {
    fn enclosing(points: &[Vec2]) -> Option<Self> {
        let (min, max) = points.iter().fold(
            (Vec2::splat(f32::INFINITY), Vec2::splat(f32::NEG_INFINITY)),
            |(min, max), point| (min.min(*point), max.max(*point)),
        );
        if !(min.x.is_finite() && min.y.is_finite() && max.x.is_finite() && max.y.is_finite()) {
            return None;
        }

        let side = (max.x - min.x).max(max.y - min.y).max(1.0);
        Some(Self { min, side })
    }

    pub(super) fn center(self) -> Vec2 {
        self.min + Vec2::splat(self.side * 0.5)
    }

    pub(super) fn contains(self, point: Vec2) -> bool {
        let max = self.min + Vec2::splat(self.side);
        (self.min.x..=max.x).contains(&point.x) && (self.min.y..=max.y).contains(&point.y)
    }

    /// Quadrant index: bit 0 set for the right half, bit 1 for the lower half.
    fn quadrant_of(self, point: Vec2) -> usize {
        let center = self.center();
        usize::from(point.x >= center.x) | (usize::from(point.y >= center.y) << 1)
    }

    fn quadrant(self, quadrant: usize) -> Self {
        let half = self.side * 0.5;
        let offset = vec2(
            if quadrant & 1 == 1 { half } else { 0.0 },
            if quadrant & 2 == 2 { half } else { 0.0 },
        );
        Self {
            min: self.min + offset,
            side: half,
        }
    }
}

pub(super) struct Cell {
    pub(super) square: Square,
    pub(super) depth: usize,
    /// Number of bodies below this cell. Every body carries the same charge,
    /// so this is also the cell's share of the total charge.
    pub(super) weight: f32,
    pub(super) charge_center: Vec2,
    /// Bodies held directly; only leaves hold any.
    pub(super) bodies: Vec<usize>,
    children: [Option<usize>; 4],
}

impl Cell {
    pub(super) fn is_leaf(&self) -> bool {
        self.children.iter().all(Option::is_none)
    }
}

/// Cell geometry exposed for the debug overlay.
#[derive(Clone, Debug)]
pub struct QuadtreeCell {
    pub center: Vec2,
    pub half_extent: f32,
    pub depth: usize,
    pub is_leaf: bool,
}

/// Barnes-Hut tree over body positions, stored as a flat arena with the root
/// at index 0. Leaves hold a single body, or several when they coincide.
pub(super) struct ChargeTree {
    cells: Vec<Cell>,
}

impl ChargeTree {
    pub(super) fn build(positions: &[Vec2]) -> Option<Self> {
        let square = Square::enclosing(positions)?;
        let mut tree = Self {
            cells: Vec::with_capacity(positions.len() * 2),
        };
        tree.subdivide(square, 0, (0..positions.len()).collect(), positions);
        Some(tree)
    }

    fn subdivide(
        &mut self,
        square: Square,
        depth: usize,
        bodies: Vec<usize>,
        positions: &[Vec2],
    ) -> usize {
        let index = self.cells.len();
        let weight = bodies.len() as f32;
        let charge_center = if bodies.is_empty() {
            square.center()
        } else {
            bodies.iter().fold(Vec2::ZERO, |sum, &body| sum + positions[body]) / weight
        };
        self.cells.push(Cell {
            square,
            depth,
            weight,
            charge_center,
            bodies: Vec::new(),
            children: [None; 4],
        });

        let coincident = bodies
            .windows(2)
            .all(|pair| positions[pair[0]] == positions[pair[1]]);
        if coincident || depth >= MAX_DEPTH {
            self.cells[index].bodies = bodies;
            return index;
        }

        let mut quadrants: [Vec<usize>; 4] = Default::default();
        for body in bodies {
            quadrants[square.quadrant_of(positions[body])].push(body);
        }
        for (quadrant, members) in quadrants.into_iter().enumerate() {
            if members.is_empty() {
                continue;
            }
            let child = self.subdivide(square.quadrant(quadrant), depth + 1, members, positions);
            self.cells[index].children[quadrant] = Some(child);
        }
        index
    }

    pub(super) fn root(&self) -> &Cell {
        &self.cells[0]
    }

    pub(super) fn children<'a>(&'a self, cell: &'a Cell) -> impl Iterator<Item = &'a Cell> + 'a {
        cell.children
            .iter()
            .flatten()
            .map(move |&child| &self.cells[child])
    }

    pub(super) fn collect_cells(&self, out: &mut Vec<QuadtreeCell>) {
        out.extend(self.cells.iter().map(|cell| QuadtreeCell {
            center: cell.square.center(),
            half_extent: cell.square.side * 0.5,
            depth: cell.depth,
            is_leaf: cell.is_leaf(),
        }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_weight_and_charge_center() {
        let positions = vec![vec2(0.0, 0.0), vec2(10.0, 0.0), vec2(10.0, 10.0), vec2(0.0, 10.0)];
        let tree = ChargeTree::build(&positions).unwrap();

        assert_eq!(tree.root().weight, 4.0);
        assert_eq!(tree.root().charge_center, vec2(5.0, 5.0));
        assert!(positions.iter().all(|point| tree.root().square.contains(*point)));
    }

    #[test]
    fn separate_bodies_get_their_own_leaf() {
        let positions = vec![vec2(0.0, 0.0), vec2(100.0, 0.0), vec2(0.0, 100.0)];
        let tree = ChargeTree::build(&positions).unwrap();

        let leaves = tree
            .children(tree.root())
            .filter(|cell| cell.is_leaf())
            .map(|cell| cell.bodies.len())
            .collect::<Vec<_>>();
        assert_eq!(leaves, vec![1, 1, 1]);
    }

    #[test]
    fn coincident_bodies_share_a_leaf() {
        let positions = vec![vec2(3.0, 3.0); 40];
        let tree = ChargeTree::build(&positions).unwrap();

        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().bodies.len(), 40);
    }

    #[test]
    fn overlay_cells_cover_every_depth() {
        let positions = (0..64)
            .map(|index| vec2((index % 8) as f32 * 20.0, (index / 8) as f32 * 20.0))
            .collect::<Vec<_>>();
        let tree = ChargeTree::build(&positions).unwrap();

        let mut cells = Vec::new();
        tree.collect_cells(&mut cells);

        assert_eq!(cells[0].depth, 0);
        assert!(!cells[0].is_leaf);
        assert_eq!(cells.iter().filter(|cell| cell.is_leaf).count(), 64);
    }

    #[test]
    fn no_positions_no_tree() {
        assert!(ChargeTree::build(&[]).is_none());
    }
}
