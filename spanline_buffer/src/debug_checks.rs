// Copyright 2026 the Spanline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debug-only integrity checks for detecting corrupted buffer state early.
//! All checks are no-ops in release builds.

use crate::SpanBuffer;

/// Verify span-level invariants: every span is valid, inside the viewport,
/// and the in-order traversal is sorted and disjoint.
///
/// These hold after every push, for every input.
#[allow(unused_variables)]
pub fn check_span_integrity(buffer: &SpanBuffer) {
    #[cfg(debug_assertions)]
    {
        let size = buffer.size() as f64;

        // Check 1: every span is valid and inside the viewport
        for (idx, span) in buffer.arena().iter().enumerate() {
            debug_assert!(
                span.x0.is_finite() && span.x1.is_finite(),
                "span {} has non-finite endpoints: [{}, {})",
                idx,
                span.x0,
                span.x1
            );
            debug_assert!(
                span.x0 < span.x1,
                "span {} is empty or inverted: [{}, {})",
                idx,
                span.x0,
                span.x1
            );
            debug_assert!(
                span.x0 >= 0.0 && span.x1 <= size,
                "span {} leaks outside the viewport [0, {}): [{}, {})",
                idx,
                size,
                span.x0,
                span.x1
            );
            debug_assert!(
                span.w0 > 0.0 && span.w1 > 0.0,
                "span {} has non-positive reciprocal depth: {} / {}",
                idx,
                span.w0,
                span.w1
            );
        }

        // Check 2: in-order traversal is sorted and disjoint
        let mut prev_x1: Option<f64> = None;
        let mut visited = 0_usize;
        for span in buffer.spans() {
            if let Some(prev) = prev_x1 {
                debug_assert!(
                    prev <= span.x0 || spanline_geom::almost_eq(prev, span.x0),
                    "spans overlap: previous ends at {}, next starts at {}",
                    prev,
                    span.x0
                );
            }
            prev_x1 = Some(span.x1);
            visited += 1;
        }
        debug_assert_eq!(visited, buffer.len(), "every arena slot is reachable");
    }
}

/// Verify the tree discipline: height caches match their children's caches,
/// balance factors stay in the AVL corridor, and the tree height stays
/// within the AVL bound.
///
/// The insertion engine performs at most one rotation per unwind, so a
/// bisection can briefly park a rotation debt on a remnant node until a
/// later push walks through it. These checks therefore apply to scenes of
/// disjoint inserts (where pushes are textbook tree insertions) and to
/// scenes a test has verified span by span.
#[allow(unused_variables)]
pub fn check_tree_discipline(buffer: &SpanBuffer) {
    #[cfg(debug_assertions)]
    {
        // Check 3: every cached height matches its children's caches
        for idx in 0..buffer.arena().len() {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "span ids are intentionally 32-bit"
            )]
            let id = crate::types::SpanId(idx as u32);
            debug_assert_eq!(
                buffer.arena()[idx].height,
                buffer.subtree_height(id),
                "span {} has a stale height cache",
                idx
            );

            // Check 4: balance factor within the AVL corridor
            let bf = buffer.balance_factor(id);
            debug_assert!(
                (-1..=1).contains(&bf),
                "span {} is out of balance: factor {}",
                idx,
                bf
            );
        }

        // Check 5: tree height within the AVL bound
        if let Some(root) = buffer.root() {
            let height = f64::from(buffer.arena()[root.idx()].height);
            let bound = 1.44 * libm::log2((buffer.len() + 2) as f64);
            debug_assert!(
                height <= bound,
                "tree of {} spans is too tall: height {} exceeds {}",
                buffer.len(),
                height,
                bound
            );
        }
    }
}

/// Run every check.
pub fn check_buffer_integrity(buffer: &SpanBuffer) {
    check_span_integrity(buffer);
    check_tree_discipline(buffer);
}
