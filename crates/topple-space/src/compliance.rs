//! Boundary policy compliance test helpers.
//!
//! These functions verify that a [`BoundaryPolicy`] implementation
//! satisfies the contract the relaxation engine relies on. Reused by the
//! built-in policies and by ad-hoc policies defined in tests.

use crate::edge::{BoundaryPolicy, Landing};
use crate::square4::Square4;

/// Every coordinate exactly one step outside `shape`, in a fixed order.
pub fn off_grid_coords(shape: &Square4) -> Vec<(i32, i32)> {
    let mut out = Vec::new();
    for r in 0..shape.rows() {
        for c in 0..shape.cols() {
            for (dr, dc) in Square4::OFFSETS {
                let nr = r as i32 + dr;
                let nc = c as i32 + dc;
                if !shape.contains(nr, nc) {
                    out.push((nr, nc));
                }
            }
        }
    }
    out
}

/// Assert that resolving the same coordinate twice gives the same landing.
pub fn assert_resolve_deterministic(policy: &dyn BoundaryPolicy, shape: &Square4) {
    for (r, c) in off_grid_coords(shape) {
        let a = policy.resolve(r, c, shape);
        let b = policy.resolve(r, c, shape);
        assert_eq!(a, b, "resolve({r}, {c}) is non-deterministic: {a:?} vs {b:?}");
    }
}

/// Assert that every `InGrid` landing lies inside `shape`.
pub fn assert_landings_in_bounds(policy: &dyn BoundaryPolicy, shape: &Square4) {
    for (r, c) in off_grid_coords(shape) {
        if let Landing::InGrid { row, col } = policy.resolve(r, c, shape) {
            assert!(
                row < shape.rows() && col < shape.cols(),
                "resolve({r}, {c}) landed at ({row}, {col}) outside {}x{}",
                shape.rows(),
                shape.cols()
            );
        }
    }
}

/// Assert that each cell has exactly four neighbour landings.
pub fn assert_four_landings(policy: &dyn BoundaryPolicy, shape: &Square4) {
    for r in 0..shape.rows() {
        for c in 0..shape.cols() {
            let n = shape.neighbours(r, c, policy);
            assert_eq!(n.len(), 4, "cell ({r}, {c}) has {} landings", n.len());
        }
    }
}

/// Run all compliance checks on a policy and shape.
pub fn run_full_compliance(policy: &dyn BoundaryPolicy, shape: &Square4) {
    assert_resolve_deterministic(policy, shape);
    assert_landings_in_bounds(policy, shape);
    assert_four_landings(policy, shape);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_grid_count_is_perimeter() {
        // A 3x5 grid has 2*(3+5) = 16 edge exits.
        let s = Square4::new(3, 5).unwrap();
        assert_eq!(off_grid_coords(&s).len(), 16);
        let one = Square4::new(1, 1).unwrap();
        assert_eq!(off_grid_coords(&one).len(), 4);
    }
}
