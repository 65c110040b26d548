//! Axis-aligned bounding box collisions
//!
//! Overlap uses open intervals: boxes that only share an edge do not collide.
//! Callers pass the boxes in effect for the current tick (current animation
//! frame, inset collision boxes), never the visual ones.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, top-left origin, y grows downward
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Aabb {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_pos_size(pos: Vec2, size: Vec2) -> Self {
        Self::new(pos.x, pos.y, size.x, size.y)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict overlap test; touching edges is not a collision
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Index of the first box in `candidates` overlapping `target`
pub fn first_overlap(target: &Aabb, candidates: &[Aabb]) -> Option<usize> {
    candidates.iter().position(|c| target.overlaps(c))
}

/// Every overlapping `(a, b)` index pair, in list order
pub fn overlapping_pairs(a: &[Aabb], b: &[Aabb]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (i, abox) in a.iter().enumerate() {
        for (j, bbox) in b.iter().enumerate() {
            if abox.overlaps(bbox) {
                pairs.push((i, j));
            }
        }
    }
    pairs
}

/// Overlapping pairs where each entity is consumed at most once.
///
/// Walks `a` in order; each `a` takes the first unconsumed `b` it overlaps.
pub fn consuming_pairs(a: &[Aabb], b: &[Aabb]) -> Vec<(usize, usize)> {
    let mut taken = vec![false; b.len()];
    let mut pairs = Vec::new();
    for (i, abox) in a.iter().enumerate() {
        let hit = b
            .iter()
            .enumerate()
            .find(|(j, bbox)| !taken[*j] && abox.overlaps(bbox));
        if let Some((j, _)) = hit {
            taken[j] = true;
            pairs.push((i, j));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn overlapping_boxes_collide() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn touching_edges_do_not_collide() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let right = Aabb::new(10.0, 0.0, 10.0, 10.0);
        let below = Aabb::new(0.0, 10.0, 10.0, 10.0);
        let corner = Aabb::new(10.0, 10.0, 5.0, 5.0);
        assert!(!a.overlaps(&right));
        assert!(!a.overlaps(&below));
        assert!(!a.overlaps(&corner));
    }

    #[test]
    fn first_overlap_takes_list_order() {
        let player = Aabb::new(200.0, 230.0, 24.0, 35.0);
        let obstacles = [
            Aabb::new(600.0, 215.0, 60.0, 44.0),
            Aabb::new(210.0, 215.0, 60.0, 44.0),
            Aabb::new(190.0, 215.0, 60.0, 44.0),
        ];
        assert_eq!(first_overlap(&player, &obstacles), Some(1));
        assert_eq!(first_overlap(&player, &obstacles[..1]), None);
    }

    #[test]
    fn overlapping_pairs_reports_all() {
        let a = [Aabb::new(0.0, 0.0, 10.0, 10.0), Aabb::new(100.0, 0.0, 10.0, 10.0)];
        let b = [Aabb::new(5.0, 5.0, 10.0, 10.0), Aabb::new(2.0, 2.0, 2.0, 2.0)];
        assert_eq!(overlapping_pairs(&a, &b), vec![(0, 0), (0, 1)]);
    }

    #[test]
    fn consuming_pairs_use_each_entity_once() {
        // two bullets over one enemy: only the first bullet scores
        let bullets = [Aabb::new(10.0, 10.0, 6.0, 18.0), Aabb::new(12.0, 12.0, 6.0, 18.0)];
        let enemies = [Aabb::new(0.0, 0.0, 64.0, 64.0)];
        assert_eq!(consuming_pairs(&bullets, &enemies), vec![(0, 0)]);

        // one bullet over two enemies: first enemy in list order
        let bullets = [Aabb::new(60.0, 10.0, 6.0, 18.0)];
        let enemies = [Aabb::new(0.0, 0.0, 64.0, 64.0), Aabb::new(40.0, 0.0, 64.0, 64.0)];
        assert_eq!(consuming_pairs(&bullets, &enemies), vec![(0, 0)]);
    }

    proptest! {
        #[test]
        fn shared_vertical_edge_never_collides(
            x in -500.0f32..500.0,
            y in -500.0f32..500.0,
            w in 1.0f32..200.0,
            h in 1.0f32..200.0,
            w2 in 1.0f32..200.0,
            dy in -50.0f32..50.0,
        ) {
            let a = Aabb::new(x, y, w, h);
            let b = Aabb::new(a.right(), y + dy, w2, h);
            prop_assert!(!a.overlaps(&b));
            prop_assert!(!b.overlaps(&a));
        }

        #[test]
        fn overlap_is_symmetric(
            ax in -100.0f32..100.0, ay in -100.0f32..100.0,
            bx in -100.0f32..100.0, by in -100.0f32..100.0,
            w in 0.0f32..80.0, h in 0.0f32..80.0,
        ) {
            let a = Aabb::new(ax, ay, w, h);
            let b = Aabb::new(bx, by, h, w);
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
