use eframe::egui::Vec2;

use super::quadtree::ChargeTree;

const MIN_DISTANCE_SQ: f32 = 1e-6;

/// Charge impulse on `point` from a body (or cell) at `other` carrying
/// `strength`. The impulse is applied to the previous position, so a negative
/// strength pulls the previous position toward `other` and the body moves away.
fn charge_between(point: Vec2, other: Vec2, strength: f32) -> Vec2 {
    let delta = other - point;
    let distance_sq = delta.length_sq();
    if distance_sq <= MIN_DISTANCE_SQ {
        return Vec2::ZERO;
    }
    -delta * (strength / distance_sq)
}

/// Barnes-Hut approximated charge on the body at `index`. A cell is treated
/// as one body at its charge centre once `side / distance < theta`.
/// `strength` is the per-body charge already scaled by the cooling parameter.
pub(super) fn charge_impulse(
    tree: &ChargeTree,
    index: usize,
    positions: &[Vec2],
    strength: f32,
    theta: f32,
) -> Vec2 {
    let point = positions[index];
    let theta_sq = theta * theta;
    let mut impulse = Vec2::ZERO;
    let mut pending = vec![tree.root()];

    while let Some(cell) = pending.pop() {
        if cell.is_leaf() {
            impulse += cell
                .bodies
                .iter()
                .filter(|&&other| other != index)
                .fold(Vec2::ZERO, |sum, &other| {
                    sum + charge_between(point, positions[other], strength)
                });
            continue;
        }

        let distance_sq = (cell.charge_center - point).length_sq();
        let side = cell.square.side;
        if !cell.square.contains(point) && side * side < theta_sq * distance_sq {
            impulse += charge_between(point, cell.charge_center, strength * cell.weight);
            continue;
        }
        pending.extend(tree.children(cell));
    }

    impulse
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn negative_charge_pulls_previous_position_toward_neighbour() {
        let impulse = charge_between(vec2(0.0, 0.0), vec2(10.0, 0.0), -100.0);
        assert!(impulse.x > 0.0);
        assert_eq!(impulse.y, 0.0);
    }

    #[test]
    fn coincident_bodies_exert_nothing() {
        assert_eq!(charge_between(vec2(1.0, 1.0), vec2(1.0, 1.0), -100.0), Vec2::ZERO);
    }

    #[test]
    fn a_body_does_not_push_itself() {
        let positions = vec![vec2(5.0, 5.0)];
        let tree = ChargeTree::build(&positions).unwrap();

        assert_eq!(charge_impulse(&tree, 0, &positions, -10.0, 0.8), Vec2::ZERO);
    }

    #[test]
    fn approximation_matches_direct_sum_for_far_cluster() {
        let mut positions = vec![vec2(0.0, 0.0)];
        for index in 0..20 {
            positions.push(vec2(1000.0 + (index % 5) as f32, (index / 5) as f32));
        }
        let tree = ChargeTree::build(&positions).unwrap();

        let approximate = charge_impulse(&tree, 0, &positions, -10.0, 0.8);
        let direct = positions[1..]
            .iter()
            .fold(Vec2::ZERO, |sum, other| sum + charge_between(positions[0], *other, -10.0));

        assert!((approximate - direct).length() < direct.length() * 0.05);
    }
}
