// Copyright 2026 the Spanline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Push throughput of the balanced span tree against a naive sorted-list
//! buffer, the shape the original linked-list s-buffers used.

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use spanline_buffer::{BufferParams, SpanBuffer};

const SIZE: usize = 4096;

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f64(&mut self) -> f64 {
        let v = self.next_u64() >> 11;
        (v as f64) / ((1u64 << 53) as f64)
    }
}

/// Constant-depth strips scattered over the scanline.
fn gen_flat_spans(count: usize, seed: u64) -> Vec<(f64, f64, f64, u8)> {
    let mut rng = Rng::new(seed);
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let x0 = rng.next_f64() * (SIZE as f64 - 32.0);
        let width = 2.0 + rng.next_f64() * 30.0;
        let w = 0.01 + rng.next_f64() * 2.0;
        out.push((x0, x0 + width, w, b'a' + (i % 26) as u8));
    }
    out
}

/// Sloped-depth strips; a fraction of them interpenetrate their neighbors.
fn gen_sloped_spans(count: usize, seed: u64) -> Vec<(f64, f64, f64, f64, u8)> {
    let mut rng = Rng::new(seed);
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let x0 = rng.next_f64() * (SIZE as f64 - 32.0);
        let width = 2.0 + rng.next_f64() * 30.0;
        let w0 = 0.01 + rng.next_f64() * 2.0;
        let w1 = 0.01 + rng.next_f64() * 2.0;
        out.push((x0, x0 + width, w0, w1, b'a' + (i % 26) as u8));
    }
    out
}

fn tree_buffer() -> SpanBuffer {
    SpanBuffer::new(BufferParams {
        size: SIZE,
        z_near: 1.0,
        max_depth: 4096,
    })
    .expect("valid bench params")
}

/// The baseline: a sorted, disjoint list of constant-depth spans with
/// linear-scan insertion.
struct NaiveBuffer {
    size: f64,
    spans: Vec<NaiveSpan>,
}

#[derive(Copy, Clone)]
struct NaiveSpan {
    x0: f64,
    x1: f64,
    w: f64,
    id: u8,
}

impl NaiveBuffer {
    fn new(size: usize) -> Self {
        Self {
            size: size as f64,
            spans: Vec::new(),
        }
    }

    fn push(&mut self, x0: f64, x1: f64, w: f64, id: u8) {
        let (x0, x1) = (x0.max(0.0), x1.min(self.size));
        if x0 >= x1 {
            return;
        }
        let mut out = Vec::with_capacity(self.spans.len() + 2);
        let mut rest = Some((x0, x1));
        for r in self.spans.drain(..) {
            let Some((cx0, cx1)) = rest else {
                emit(&mut out, r);
                continue;
            };
            if cx1 <= r.x0 {
                emit(&mut out, NaiveSpan { x0: cx0, x1: cx1, w, id });
                rest = None;
                emit(&mut out, r);
            } else if r.x1 <= cx0 {
                emit(&mut out, r);
            } else {
                if cx0 < r.x0 {
                    emit(&mut out, NaiveSpan {
                        x0: cx0,
                        x1: r.x0,
                        w,
                        id,
                    });
                }
                let ov0 = cx0.max(r.x0);
                let ov1 = cx1.min(r.x1);
                if w > r.w {
                    if r.x0 < ov0 {
                        emit(&mut out, NaiveSpan { x1: ov0, ..r });
                    }
                    emit(&mut out, NaiveSpan {
                        x0: ov0,
                        x1: ov1,
                        w,
                        id,
                    });
                    if ov1 < r.x1 {
                        emit(&mut out, NaiveSpan { x0: ov1, ..r });
                    }
                } else {
                    emit(&mut out, r);
                }
                rest = (cx1 > r.x1).then_some((r.x1, cx1));
            }
        }
        if let Some((cx0, cx1)) = rest {
            emit(&mut out, NaiveSpan {
                x0: cx0,
                x1: cx1,
                w,
                id,
            });
        }
        self.spans = out;
    }
}

/// Append a span, coalescing with the previous one when they abut with the
/// same id and depth.
fn emit(out: &mut Vec<NaiveSpan>, span: NaiveSpan) {
    if let Some(last) = out.last_mut()
        && last.id == span.id
        && last.w == span.w
        && last.x1 == span.x0
    {
        last.x1 = span.x1;
        return;
    }
    out.push(span);
}

fn bench_flat_pushes(c: &mut Criterion) {
    for count in [256_usize, 1024] {
        let spans = gen_flat_spans(count, 0x5eed);

        let mut group = c.benchmark_group(format!("flat_push/{count}"));
        group.throughput(Throughput::Elements(count as u64));

        group.bench_function("tree", |b| {
            b.iter_batched(
                tree_buffer,
                |mut buf| {
                    for &(x0, x1, w, id) in &spans {
                        let _ = black_box(buf.push(x0, x1, w, w, id));
                    }
                    buf
                },
                BatchSize::SmallInput,
            );
        });

        group.bench_function("naive_list", |b| {
            b.iter_batched(
                || NaiveBuffer::new(SIZE),
                |mut buf| {
                    for &(x0, x1, w, id) in &spans {
                        buf.push(black_box(x0), x1, w, id);
                    }
                    buf
                },
                BatchSize::SmallInput,
            );
        });

        group.finish();
    }
}

fn bench_sloped_pushes(c: &mut Criterion) {
    for count in [256_usize, 1024] {
        let spans = gen_sloped_spans(count, 0xdada);

        let mut group = c.benchmark_group(format!("sloped_push/{count}"));
        group.throughput(Throughput::Elements(count as u64));

        group.bench_function("tree", |b| {
            b.iter_batched(
                tree_buffer,
                |mut buf| {
                    for &(x0, x1, w0, w1, id) in &spans {
                        let _ = black_box(buf.push(x0, x1, w0, w1, id));
                    }
                    buf
                },
                BatchSize::SmallInput,
            );
        });

        group.finish();
    }
}

criterion_group!(benches, bench_flat_pushes, bench_sloped_pushes);
criterion_main!(benches);
