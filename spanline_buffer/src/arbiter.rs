// Copyright 2026 the Spanline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility arbitration between an incoming span and a resident span.
//!
//! Every overlap during insertion is classified into a [`Directive`] telling
//! the engine how to mutate the resident span and which way to keep
//! descending. The classification branches on which side the newcomer starts,
//! whether the two spans properly cross in view space, and on a quantized
//! depth comparison when they do not.

use spanline_geom::{ScreenPoint, lerp, span_crossing};

use crate::types::Span;

/// The original push arguments, kept unclipped so every depth interpolation
/// during one push reads from the same endpoints.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Candidate {
    pub x0: f64,
    pub x1: f64,
    pub w0: f64,
    pub w1: f64,
    pub id: u8,
}

impl Candidate {
    #[inline]
    pub(crate) fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    /// Reciprocal depth interpolated at screen-space `x`.
    #[inline]
    pub(crate) fn w_at(&self, x: f64) -> f64 {
        lerp(self.w0, self.w1, x - self.x0, self.width())
    }
}

/// What the insertion engine must do to the resident span it is visiting.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) enum Directive {
    /// No mutation; the resident stands and descent continues.
    Stand,
    /// Contract the resident's right end to `x`.
    TrimRight { x: f64 },
    /// Contract the resident's left end to `x`. With `retreat`, descent
    /// switches to the left subtree because the remaining newcomer piece now
    /// precedes the resident.
    TrimLeft { x: f64, retreat: bool },
    /// Replace the resident's depths and id over its whole x-range.
    Overwrite,
    /// Split the resident: it keeps the newcomer's visible window
    /// `[vis_x0, vis_x1]` and sprouts children for the outer remnants.
    Bisect { vis_x0: f64, vis_x1: f64 },
}

/// Scale a reciprocal depth to micro-unit integer resolution.
///
/// Depth ties must resolve identically on every run; comparing raw floats
/// here changes bisection shapes on near-coincident inputs and can keep the
/// insertion loop from converging.
#[inline]
fn quantize(w: f64) -> i64 {
    (w * 1e6) as i64
}

/// Whether the incoming depth wins over the resident depth at a shared x,
/// with the leftness sign breaking exact quantized ties.
#[inline]
fn in_front(w_incoming: f64, w_resident: f64, leftness: f64) -> bool {
    let incoming = quantize(w_incoming);
    let resident = quantize(w_resident);
    resident < incoming || (resident == incoming && leftness > 0.0)
}

/// Classify the interaction of the newcomer's unprocessed sub-segment
/// `[x, cand.x1]` with `resident`.
pub(crate) fn classify(
    cand: &Candidate,
    x: f64,
    resident: &Span,
    size: f64,
    z_near: f64,
) -> Directive {
    let w = cand.w_at(x);
    let crossing = span_crossing(
        ScreenPoint::new(x, w),
        ScreenPoint::new(cand.x1, cand.w1),
        ScreenPoint::new(resident.x0, resident.w0),
        ScreenPoint::new(resident.x1, resident.w1),
        size,
        z_near,
    );

    if x < resident.x0 {
        if cand.x1 <= resident.x0 {
            return Directive::Stand;
        }
        match crossing.x {
            Some(cx) if crossing.leftness > 0.0 => {
                // Newcomer is in front past the crossover.
                if cand.x1 < resident.x1 {
                    Directive::Bisect {
                        vis_x0: cx,
                        vis_x1: cand.x1,
                    }
                } else {
                    Directive::TrimRight { x: cx }
                }
            }
            Some(cx) => Directive::TrimLeft {
                x: cx,
                retreat: false,
            },
            None => {
                if in_front(cand.w_at(resident.x0), resident.w0, crossing.leftness) {
                    if cand.x1 < resident.x1 {
                        Directive::TrimLeft {
                            x: cand.x1,
                            retreat: false,
                        }
                    } else {
                        Directive::Overwrite
                    }
                } else {
                    Directive::Stand
                }
            }
        }
    } else {
        if x >= resident.x1 {
            return Directive::Stand;
        }
        match crossing.x {
            Some(cx) if crossing.leftness > 0.0 => {
                if cand.x1 < resident.x1 {
                    Directive::Bisect {
                        vis_x0: cx,
                        vis_x1: cand.x1,
                    }
                } else {
                    Directive::TrimRight { x: cx }
                }
            }
            Some(cx) => {
                // Resident is in front past the crossover; the newcomer owns
                // the near side only.
                if x > resident.x0 {
                    Directive::Bisect {
                        vis_x0: x,
                        vis_x1: cx,
                    }
                } else {
                    Directive::TrimLeft {
                        x: cx,
                        retreat: true,
                    }
                }
            }
            None => {
                if in_front(w, resident.w_at(x), crossing.leftness) {
                    if x > resident.x0 {
                        if cand.x1 < resident.x1 {
                            Directive::Bisect {
                                vis_x0: x,
                                vis_x1: cand.x1,
                            }
                        } else {
                            Directive::TrimRight { x }
                        }
                    } else if cand.x1 < resident.x1 {
                        Directive::TrimLeft {
                            x: cand.x1,
                            retreat: true,
                        }
                    } else {
                        Directive::Overwrite
                    }
                } else {
                    Directive::Stand
                }
            }
        }
    }
}
