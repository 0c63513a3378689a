// Copyright 2026 the Spanline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core buffer implementation: the span arena, the insertion engine, and the
//! read operations.

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::arbiter::{self, Candidate, Directive};
use crate::types::{BufferParams, Error, PushOutcome, Span, SpanId};

/// One recorded step of the insertion descent: the visited node and the
/// admissible x-range of the slot it occupies.
#[derive(Copy, Clone, Debug)]
struct Frame {
    node: SpanId,
    left: f64,
    right: f64,
}

/// A scanline span buffer.
///
/// Holds the currently visible, opaque, non-overlapping spans of one
/// scanline in a height-balanced tree ordered by `x0`. Spans may be pushed
/// in any depth order; each push clips the newcomer against closer resident
/// geometry and clips residents the newcomer obscures, bisecting at the
/// crossover when two spans interpenetrate.
///
/// Nodes live in a slot arena indexed by small ids; links between spans are
/// ids, never references, so every walk over the tree is iterative and
/// teardown never recurses.
pub struct SpanBuffer {
    spans: Vec<Span>,
    root: Option<SpanId>,
    size: usize,
    z_near: f64,
    max_depth: usize,
}

impl fmt::Debug for SpanBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let height = self.root.map(|r| self.span(r).height);
        f.debug_struct("SpanBuffer")
            .field("size", &self.size)
            .field("z_near", &self.z_near)
            .field("max_depth", &self.max_depth)
            .field("spans", &self.spans.len())
            .field("height", &height)
            .finish_non_exhaustive()
    }
}

impl SpanBuffer {
    /// Create an empty buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParams`] when `size` or `max_depth` is zero,
    /// or `z_near` is not a positive finite number.
    pub fn new(params: BufferParams) -> Result<Self, Error> {
        if params.size < 1 {
            return Err(Error::InvalidParams("size must be at least one pixel"));
        }
        if !(params.z_near > 0.0) || !params.z_near.is_finite() {
            return Err(Error::InvalidParams("z_near must be positive and finite"));
        }
        if params.max_depth < 1 {
            return Err(Error::InvalidParams("max_depth must be at least one"));
        }
        Ok(Self {
            spans: Vec::new(),
            root: None,
            size: params.size,
            z_near: params.z_near,
            max_depth: params.max_depth,
        })
    }

    /// Width of the scanline in pixels.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Distance from the eye to the projection plane.
    pub fn z_near(&self) -> f64 {
        self.z_near
    }

    /// Hard cap on the insertion path length.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Number of visible spans in the buffer.
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether the buffer holds no spans.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Drop every span. The buffer configuration is kept.
    pub fn clear(&mut self) {
        self.spans.clear();
        self.root = None;
    }

    /// Push a span with endpoints `(x0, w0)` and `(x1, w1)` in
    /// perspective-correct screen space: `w0` and `w1` are the reciprocals
    /// of the endpoints' view-space depths (`1 / z_view`), so larger `w`
    /// means closer to the eye. `id` is an opaque tag for the caller.
    ///
    /// The newcomer is clipped to the viewport and against every closer
    /// resident span; residents it obscures are trimmed, overwritten, or
    /// bisected. [`PushOutcome::FullyOccluded`] reports that nothing became
    /// visible.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidSpan`] when `x0 >= x1`, a depth is not positive, or
    ///   any argument is non-finite. The buffer is untouched.
    /// - [`Error::MaxDepthExceeded`] when the descent would outgrow
    ///   `max_depth`. Mutations already applied by this push remain; treat
    ///   the cap as a sizing parameter, not a soft limit.
    pub fn push(
        &mut self,
        x0: f64,
        x1: f64,
        w0: f64,
        w1: f64,
        id: u8,
    ) -> Result<PushOutcome, Error> {
        if !(x0.is_finite() && x1.is_finite() && w0.is_finite() && w1.is_finite()) {
            return Err(Error::InvalidSpan("endpoints must be finite"));
        }
        if x0 >= x1 {
            return Err(Error::InvalidSpan("x0 must be less than x1"));
        }
        if w0 <= 0.0 || w1 <= 0.0 {
            return Err(Error::InvalidSpan("reciprocal depths must be positive"));
        }

        let cand = Candidate { x0, x1, w0, w1, id };
        let size_px = self.size as f64;

        let Some(root) = self.root else {
            // First span: clip to the viewport and seed the tree.
            let clip_left = (-x0).max(0.0);
            let clip_right = (x1 - size_px).max(0.0);
            let clipped = cand.width() - clip_right - clip_left;
            if clipped > 0.0 {
                let nx0 = x0 + clip_left;
                let nx1 = nx0 + clipped;
                let node = self.alloc(Span::new(nx0, nx1, cand.w_at(nx0), cand.w_at(nx1), id));
                self.root = Some(node);
                return Ok(PushOutcome::Inserted);
            }
            log::trace!("span [{x0}, {x1}) lies outside the viewport");
            return Ok(PushOutcome::FullyOccluded);
        };

        // Admissible x-range of the slot the descent is currently in.
        let (mut left, mut right) = (0.0_f64, size_px);
        // Left end and width of the still-unprocessed sub-segment.
        let (mut x, mut remaining) = (x0, cand.width());
        let mut pushed = false;
        let mut curr = Some(root);
        let mut parent = root;
        let mut stack: Vec<Frame> = Vec::with_capacity(self.max_depth);
        let mut depth = 0_usize;

        // Keep absorbing sub-segments until none is outstanding.
        while remaining > 0.0 {
            while let Some(node) = curr {
                if depth == self.max_depth {
                    log::warn!("push aborted: maximum buffer depth {} reached", self.max_depth);
                    return Err(Error::MaxDepthExceeded);
                }
                parent = node;
                Self::stack_put(&mut stack, depth, Frame { node, left, right });
                depth += 1;

                let go_left = x < self.span(node).x0;
                let directive = arbiter::classify(&cand, x, self.span(node), size_px, self.z_near);
                let retreat = match directive {
                    Directive::Stand => false,
                    Directive::TrimRight { x: tx } => {
                        self.trim_right(node, tx);
                        false
                    }
                    Directive::TrimLeft { x: tx, retreat } => {
                        self.trim_left(node, tx);
                        retreat
                    }
                    Directive::Overwrite => {
                        self.overwrite(node, &cand);
                        pushed = true;
                        false
                    }
                    Directive::Bisect { vis_x0, vis_x1 } => {
                        self.bisect(node, &cand, vis_x0, vis_x1);
                        pushed = true;
                        false
                    }
                };

                // Descend on the mutated node: a trim or bisection may have
                // moved its endpoints and replaced its children.
                let resident = self.span(node);
                if go_left || retreat {
                    right = resident.x0;
                    curr = resident.left;
                } else {
                    left = resident.x1;
                    curr = resident.right;
                }
            }

            // An empty slot: clip the sub-segment to it and insert whatever
            // survives.
            let clip_left = (left - x).max(0.0);
            let clip_right = (x + remaining - right).max(0.0);
            let clipped = remaining - clip_left - clip_right;
            if clipped > 0.0 {
                let nx0 = x + clip_left;
                let nx1 = nx0 + clipped;
                let node = self.alloc(Span::new(nx0, nx1, cand.w_at(nx0), cand.w_at(nx1), id));
                if x < self.span(parent).x0 {
                    self.span_mut(parent).left = Some(node);
                } else {
                    self.span_mut(parent).right = Some(node);
                }
                pushed = true;
            }

            // Walk the recorded path back up, looking for the topmost left
            // turn (the resume point for the clipped-off right tail) and the
            // deepest imbalanced node, bumping cached heights on the way.
            let mut insertion_bookmark = None;
            let mut imbalance_bookmark = None;
            let mut tmp_x = x;
            for frame_idx in (0..depth).rev() {
                if insertion_bookmark.is_some() && imbalance_bookmark.is_some() {
                    break;
                }
                let node = stack[frame_idx].node;
                let node_x0 = self.span(node).x0;
                if insertion_bookmark.is_none() && tmp_x < node_x0 {
                    insertion_bookmark = Some(frame_idx);
                }
                tmp_x = node_x0;
                if imbalance_bookmark.is_none() {
                    let bf = self.balance_factor(node);
                    if !(-1..=1).contains(&bf) {
                        imbalance_bookmark = Some(frame_idx);
                    } else {
                        // Height never decreases during insertion. Recomputing
                        // from the child caches (repaired bottom-up along this
                        // path) also absorbs growth from a bisection that
                        // inserted nothing.
                        let grown = self.subtree_height(node);
                        let span = self.span_mut(node);
                        span.height = span.height.max(grown);
                    }
                }
            }

            let mut resume = None;
            if let Some(bookmark) = insertion_bookmark {
                let frame = stack[bookmark];
                resume = Some(frame.node);
                curr = Some(frame.node);
                left = frame.left;
                right = frame.right;
                x = self.span(frame.node).x0;
                remaining = clip_right;
                depth = bookmark;
            } else {
                remaining = 0.0;
            }

            if let Some(imbalance) = imbalance_bookmark {
                let anchor = (imbalance > 0).then(|| stack[imbalance - 1].node);
                let old_parent = stack[imbalance].node;
                let new_parent = if self.balance_factor(old_parent) < 0 {
                    self.rotate_right(old_parent)
                } else {
                    self.rotate_left(old_parent)
                };

                match anchor {
                    Some(a) => {
                        if self.span(new_parent).x0 < self.span(a).x0 {
                            self.span_mut(a).left = Some(new_parent);
                        } else {
                            self.span_mut(a).right = Some(new_parent);
                        }
                    }
                    None => self.root = Some(new_parent),
                }

                // When the rotation happened at or above the resume point,
                // the recorded path below the new subtree root is stale;
                // rebuild it with the monotone descent rule.
                if insertion_bookmark.is_some_and(|bookmark| imbalance <= bookmark) {
                    let mut frame_idx = imbalance;
                    let (mut new_left, mut new_right) = (0.0_f64, size_px);
                    if frame_idx > 0 {
                        let above = stack[frame_idx - 1];
                        new_left = above.left;
                        new_right = above.right;
                        let above_span = self.span(above.node);
                        if self.span(new_parent).x0 < above_span.x0 {
                            new_right = above_span.x0;
                        } else {
                            new_left = above_span.x1;
                        }
                    }
                    let mut walk = Some(new_parent);
                    while let Some(node) = walk {
                        Self::stack_put(
                            &mut stack,
                            frame_idx,
                            Frame {
                                node,
                                left: new_left,
                                right: new_right,
                            },
                        );
                        if Some(node) == resume {
                            break;
                        }
                        let span = self.span(node);
                        if x < span.x0 {
                            new_right = span.x0;
                            walk = span.left;
                        } else {
                            new_left = span.x1;
                            walk = span.right;
                        }
                        frame_idx += 1;
                    }
                    left = new_left;
                    right = new_right;
                    depth = frame_idx;
                }
            }
        }

        if pushed {
            Ok(PushOutcome::Inserted)
        } else {
            log::trace!("span [{x0}, {x1}) fully occluded");
            Ok(PushOutcome::FullyOccluded)
        }
    }

    /// Visit the visible spans left to right.
    pub fn spans(&self) -> Spans<'_> {
        let mut stack = Vec::with_capacity(self.max_depth + 1);
        if let Some(root) = self.root {
            stack.push((root, false));
        }
        Spans {
            buffer: self,
            stack,
        }
    }

    /// Render the scanline into a string of exactly `size` characters:
    /// `'_'` for uncovered pixels, the covering span's id elsewhere.
    ///
    /// Ids are typically printable ASCII; other bytes are rendered lossily.
    pub fn rasterize(&self) -> String {
        let mut pixels = alloc::vec![b'_'; self.size];
        for span in self.spans() {
            let lo = libm::ceil(span.x0 - 0.5).max(0.0) as usize;
            let hi = (libm::ceil(span.x1 - 0.5) as usize).min(self.size);
            if lo < hi {
                pixels[lo..hi].fill(span.id);
            }
        }
        String::from_utf8_lossy(&pixels).into_owned()
    }

    /// Borrow a tree-shaped textual dump for debugging.
    ///
    /// One line per span, node before left subtree before right subtree,
    /// indented four spaces per level: `[id] [x0, x1)` with endpoints to
    /// three decimals. An empty buffer dumps a single diagnostic line.
    pub fn dump(&self) -> Dump<'_> {
        Dump { buffer: self }
    }

    // --- arena internals ---

    pub(crate) fn span(&self, id: SpanId) -> &Span {
        &self.spans[id.idx()]
    }

    pub(crate) fn span_mut(&mut self, id: SpanId) -> &mut Span {
        &mut self.spans[id.idx()]
    }

    pub(crate) fn root(&self) -> Option<SpanId> {
        self.root
    }

    pub(crate) fn arena(&self) -> &[Span] {
        &self.spans
    }

    fn alloc(&mut self, span: Span) -> SpanId {
        let idx = self.spans.len();
        self.spans.push(span);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "span ids are intentionally 32-bit"
        )]
        let id = SpanId(idx as u32);
        id
    }

    fn stack_put(stack: &mut Vec<Frame>, depth: usize, frame: Frame) {
        // Frames above `depth` stay readable until the push returns; the
        // rebalance step may still index them.
        if depth == stack.len() {
            stack.push(frame);
        } else {
            stack[depth] = frame;
        }
    }

    // --- height bookkeeping ---

    pub(crate) fn child_height(&self, child: Option<SpanId>) -> i32 {
        child.map_or(0, |c| self.span(c).height + 1)
    }

    pub(crate) fn subtree_height(&self, id: SpanId) -> i32 {
        let span = self.span(id);
        self.child_height(span.left).max(self.child_height(span.right))
    }

    pub(crate) fn balance_factor(&self, id: SpanId) -> i32 {
        let span = self.span(id);
        self.child_height(span.right) - self.child_height(span.left)
    }

    fn refresh_height(&mut self, id: SpanId) {
        let height = self.subtree_height(id);
        self.span_mut(id).height = height;
    }

    // --- mutator primitives ---

    /// Contract the span's left end to `x`, re-interpolating its depth.
    fn trim_left(&mut self, id: SpanId, x: f64) {
        let span = self.span_mut(id);
        let w = lerp_span(span, x);
        span.w0 = w;
        span.x0 = x;
    }

    /// Contract the span's right end to `x`, re-interpolating its depth.
    fn trim_right(&mut self, id: SpanId, x: f64) {
        let span = self.span_mut(id);
        let w = lerp_span(span, x);
        span.w1 = w;
        span.x1 = x;
    }

    /// Replace the span's depths and id over its unchanged x-range.
    fn overwrite(&mut self, id: SpanId, cand: &Candidate) {
        let span = self.span_mut(id);
        span.w0 = cand.w_at(span.x0);
        span.w1 = cand.w_at(span.x1);
        span.id = cand.id;
    }

    /// Split the span into three pieces: it keeps the newcomer's visible
    /// window `[vis_x0, vis_x1]`, and its outer remnants become new nodes
    /// pushed above the previous left and right subtrees.
    fn bisect(&mut self, id: SpanId, cand: &Candidate, vis_x0: f64, vis_x1: f64) {
        let (old_x0, old_x1, old_w0, old_w1, old_id) = {
            let span = self.span(id);
            (span.x0, span.x1, span.w0, span.w1, span.id)
        };
        let old_width = old_x1 - old_x0;

        {
            let span = self.span_mut(id);
            span.x0 = vis_x0;
            span.x1 = vis_x1;
        }
        let (w0, w1) = (cand.w_at(vis_x0), cand.w_at(vis_x1));
        {
            let span = self.span_mut(id);
            span.w0 = w0;
            span.w1 = w1;
            span.id = cand.id;
        }

        // Left remnant, stacked above the previous left subtree. That can
        // leave the slot more than one level out of balance, in which case
        // an immediate local rotation repairs it.
        let mut left_piece = Span::new(
            old_x0,
            vis_x0,
            old_w0,
            spanline_geom::lerp(old_w0, old_w1, vis_x0 - old_x0, old_width),
            old_id,
        );
        left_piece.left = self.span(id).left;
        let left_id = self.alloc(left_piece);
        self.span_mut(id).left = Some(left_id);
        if self.balance_factor(left_id) < -1 {
            let subtree = self.rotate_right(left_id);
            self.span_mut(id).left = Some(subtree);
        } else {
            self.refresh_height(left_id);
        }

        // Right remnant, stacked above the previous right subtree.
        let mut right_piece = Span::new(
            vis_x1,
            old_x1,
            spanline_geom::lerp(old_w0, old_w1, vis_x1 - old_x0, old_width),
            old_w1,
            old_id,
        );
        right_piece.right = self.span(id).right;
        let right_id = self.alloc(right_piece);
        self.span_mut(id).right = Some(right_id);
        self.refresh_height(right_id);

        self.refresh_height(id);
    }

    // --- balancer ---

    /// Rotate the left-heavy subtree at `node` to the right, going through
    /// a left-right double rotation when its left child leans right.
    /// Returns the subtree's new root; the caller reattaches it.
    fn rotate_right(&mut self, node: SpanId) -> SpanId {
        let mut new_parent = self.span(node).left.expect("left-heavy span without left child");
        let mut child = self.span(new_parent).left;
        if self.balance_factor(new_parent) > 0 {
            let pivot = new_parent;
            new_parent = self.span(pivot).right.expect("right-leaning span without right child");
            let hand_off = self.span(new_parent).left;
            self.span_mut(pivot).right = hand_off;
            self.span_mut(new_parent).left = Some(pivot);
            child = Some(pivot);
        }
        let hand_off = self.span(new_parent).right;
        self.span_mut(node).left = hand_off;
        self.span_mut(new_parent).right = Some(node);

        self.refresh_height(node);
        if let Some(child) = child {
            self.refresh_height(child);
        }
        self.refresh_height(new_parent);
        new_parent
    }

    /// Mirror of [`Self::rotate_right`] for right-heavy subtrees.
    fn rotate_left(&mut self, node: SpanId) -> SpanId {
        let mut new_parent = self.span(node).right.expect("right-heavy span without right child");
        let mut child = self.span(new_parent).right;
        if self.balance_factor(new_parent) < 0 {
            let pivot = new_parent;
            new_parent = self.span(pivot).left.expect("left-leaning span without left child");
            let hand_off = self.span(new_parent).right;
            self.span_mut(pivot).left = hand_off;
            self.span_mut(new_parent).right = Some(pivot);
            child = Some(pivot);
        }
        let hand_off = self.span(new_parent).left;
        self.span_mut(node).right = hand_off;
        self.span_mut(new_parent).left = Some(node);

        self.refresh_height(node);
        if let Some(child) = child {
            self.refresh_height(child);
        }
        self.refresh_height(new_parent);
        new_parent
    }
}

/// Reciprocal depth of `span` interpolated at `x`, reading the endpoints
/// before either is moved.
#[inline]
fn lerp_span(span: &Span, x: f64) -> f64 {
    spanline_geom::lerp(span.w0, span.w1, x - span.x0, span.x1 - span.x0)
}

/// In-order iterator over the visible spans of a [`SpanBuffer`].
///
/// Walks the tree with an explicit stack; the bool per frame records whether
/// the left subtree has been visited.
pub struct Spans<'a> {
    buffer: &'a SpanBuffer,
    stack: Vec<(SpanId, bool)>,
}

impl<'a> Iterator for Spans<'a> {
    type Item = &'a Span;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((id, visited_left)) = self.stack.pop() {
            let span = self.buffer.span(id);
            if visited_left {
                if let Some(right) = span.right {
                    self.stack.push((right, false));
                }
                return Some(span);
            }
            self.stack.push((id, true));
            if let Some(left) = span.left {
                self.stack.push((left, false));
            }
        }
        None
    }
}

/// Tree-shaped debug view returned by [`SpanBuffer::dump`].
pub struct Dump<'a> {
    buffer: &'a SpanBuffer,
}

impl fmt::Display for Dump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.buffer.root else {
            return writeln!(f, "empty span buffer");
        };
        let mut stack = Vec::with_capacity(self.buffer.max_depth + 1);
        stack.push((root, 0_usize));
        while let Some((id, depth)) = stack.pop() {
            let span = self.buffer.span(id);
            writeln!(
                f,
                "{:indent$}[{}] [{:.3}, {:.3})",
                "",
                span.id as char,
                span.x0,
                span.x1,
                indent = depth * 4
            )?;
            if let Some(right) = span.right {
                stack.push((right, depth + 1));
            }
            if let Some(left) = span.left {
                stack.push((left, depth + 1));
            }
        }
        Ok(())
    }
}
