// Copyright 2026 the Spanline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Span buffer basics.
//!
//! Push a handful of spans in mixed depth order and print the resulting
//! scanline after each step.
//!
//! Run:
//! - `cargo run -p spanline_demos --example span_buffer_basics`

use spanline_buffer::{BufferParams, PushOutcome, SpanBuffer};

fn main() {
    let mut buffer = SpanBuffer::new(BufferParams {
        size: 24,
        z_near: 1.0,
        max_depth: 1024,
    })
    .expect("valid demo params");

    // A far wall across the whole scanline.
    push(&mut buffer, 0.0, 24.0, 0.25, 0.25, b'w');

    // Two closer boxes punch through the wall.
    push(&mut buffer, 3.0, 9.0, 1.0, 1.0, b'a');
    push(&mut buffer, 14.0, 20.0, 1.0, 1.0, b'b');

    // Something even closer straddles the first box's right edge.
    push(&mut buffer, 7.0, 12.0, 2.0, 2.0, b'c');

    // And one span hides behind everything.
    push(&mut buffer, 5.0, 18.0, 0.1, 0.1, b'x');

    println!("\nfinal tree:");
    print!("{}", buffer.dump());
}

fn push(buffer: &mut SpanBuffer, x0: f64, x1: f64, w0: f64, w1: f64, id: u8) {
    let outcome = buffer
        .push(x0, x1, w0, w1, id)
        .expect("demo pushes stay within limits");
    let note = match outcome {
        PushOutcome::Inserted => "",
        PushOutcome::FullyOccluded => "   (fully occluded)",
    };
    println!("push {:>5.1} ..{:>5.1} '{}': {}{}", x0, x1, id as char, buffer.rasterize(), note);
}
