// Copyright 2026 the Spanline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spanline Buffer: a self-balancing span buffer for scanline
//! hidden-surface removal.
//!
//! A span buffer (s-buffer) is a classic alternative to per-pixel depth
//! testing in software rasterizers: instead of comparing depths pixel by
//! pixel, a scanline keeps the set of currently visible, opaque,
//! non-overlapping spans, and every incoming span is clipped against the
//! geometry already in front of it. This implementation stores the spans in
//! a height-balanced tree ordered by screen x, so a push costs `O(log n)`
//! instead of the linked-list original's linear scan.
//!
//! Spans need not arrive front to back. The buffer handles arbitrary depth
//! order as well as interpenetrating geometry: when two spans cross in
//! depth along their overlap, the resident span is bisected at the
//! crossover so each side shows the locally closer span.
//!
//! ## API overview
//!
//! - [`SpanBuffer`]: the scanline buffer; owns all spans.
//! - [`BufferParams`]: construction parameters (pixel width, projection
//!   plane distance, insertion depth cap).
//! - [`SpanBuffer::push`]: insert one span, in perspective-correct screen
//!   space; returns a [`PushOutcome`].
//! - [`SpanBuffer::spans`]: in-order iteration over the visible spans.
//! - [`SpanBuffer::rasterize`] / [`SpanBuffer::dump`]: ASCII scanline and
//!   tree-shaped debug output.
//!
//! Depth arbitration lifts endpoints back into view space through
//! [`spanline_geom`]; ties quantize reciprocal depths to micro-unit
//! integers so identical scenes always produce identical trees.
//!
//! ## Ownership and determinism
//!
//! A buffer is exclusively owned by its caller; pushes complete fully
//! before the next begins, and the resulting tree shape is a deterministic
//! function of the insertion sequence and the construction parameters.
//! Nothing in the crate suspends, retries, or touches global state.
//!
//! # Example
//!
//! ```
//! use spanline_buffer::{BufferParams, PushOutcome, SpanBuffer};
//!
//! let mut buffer = SpanBuffer::new(BufferParams {
//!     size: 6,
//!     z_near: 1.0,
//!     max_depth: 1024,
//! })?;
//!
//! // A far wall, then a closer pillar punching through its middle.
//! buffer.push(0.0, 6.0, 0.5, 0.5, b'A')?;
//! buffer.push(2.0, 4.0, 1.0, 1.0, b'B')?;
//! assert_eq!(buffer.rasterize(), "AABBAA");
//!
//! // Geometry behind the wall never becomes visible.
//! let outcome = buffer.push(1.0, 5.0, 0.25, 0.25, b'C')?;
//! assert_eq!(outcome, PushOutcome::FullyOccluded);
//! # Ok::<(), spanline_buffer::Error>(())
//! ```
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

mod arbiter;
pub mod debug_checks;
mod tree;
mod types;

pub use tree::{Dump, SpanBuffer, Spans};
pub use types::{BufferParams, Error, PushOutcome, Span};
