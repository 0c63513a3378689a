// Copyright 2026 the Spanline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lift two screen-space spans into view space and report their crossover.
//!
//! Run:
//! - `cargo run -p spanline_geom --example basic_crossing`

use spanline_geom::{ScreenPoint, lift_to_view, span_crossing};

fn main() {
    let (size, z_near) = (16.0, 4.0);

    // One span tilting away from the eye, one tilting toward it.
    let away = (ScreenPoint::new(2.0, 0.5), ScreenPoint::new(14.0, 0.125));
    let toward = (ScreenPoint::new(2.0, 0.125), ScreenPoint::new(14.0, 0.5));

    for (label, (p0, p1)) in [("away", away), ("toward", toward)] {
        println!(
            "{label:>6}: {:?} -> {:?}",
            lift_to_view(p0, size, z_near),
            lift_to_view(p1, size, z_near),
        );
    }

    let crossing = span_crossing(away.0, away.1, toward.0, toward.1, size, z_near);
    match crossing.x {
        Some(x) => println!("crossover at screen x = {x:.3} (leftness {:+.3})", crossing.leftness),
        None => println!("no crossover (leftness {:+.3})", crossing.leftness),
    }
}
