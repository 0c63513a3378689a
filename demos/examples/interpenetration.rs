// Copyright 2026 the Spanline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interpenetrating geometry.
//!
//! The classic crossing scene: wedges that tilt through their neighbors in
//! depth, so visibility flips mid-span and the buffer bisects at each
//! crossover. The span endpoints come from projecting a small 3-D scene onto
//! a 16-pixel scanline with the projection plane 4 units from the eye.
//!
//! Run:
//! - `cargo run -p spanline_demos --example interpenetration`

use spanline_buffer::{BufferParams, SpanBuffer};

fn main() {
    let mut buffer = SpanBuffer::new(BufferParams {
        size: 16,
        z_near: 4.0,
        max_depth: 1024,
    })
    .expect("valid demo params");

    let scene: [(f64, f64, f64, f64, u8); 5] = [
        (88.0 / 15.0, 20.0 / 3.0, 1.0 / 15.0, 1.0 / 6.0, b'A'),
        (28.0 / 3.0, 152.0 / 15.0, 1.0 / 6.0, 1.0 / 15.0, b'B'),
        (20.0 / 3.0, 28.0 / 3.0, 1.0 / 6.0, 1.0 / 6.0, b'C'),
        (17.0 / 3.0, 8.0, 1.0 / 12.0, 0.2, b'D'),
        (8.0, 31.0 / 3.0, 0.2, 1.0 / 12.0, b'E'),
    ];

    for (x0, x1, w0, w1, id) in scene {
        buffer
            .push(x0, x1, w0, w1, id)
            .expect("demo pushes stay within limits");
    }

    print!("{}", buffer.dump());
    println!("{}", buffer.rasterize());
}
