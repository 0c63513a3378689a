// Copyright 2026 the Spanline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Benchmarks for the Spanline workspace. See the `benches/` directory.
