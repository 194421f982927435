// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated retained-mode canvas with a settle-aware frame protocol.
//!
//! `settle_core` keeps a set of paint tasks, each owning animatable
//! geometries, advances them against a monotonic clock, and reports after
//! every frame whether anything is still moving. A host UI loop uses that
//! signal to keep redrawing while animations run and to stop once the scene
//! has settled.
//!
//! # Architecture
//!
//! ```text
//!   model mutation ──► invalidate() ──► on_invalidated ──► host schedules
//!                                                              │
//!                 ┌────────────────────────────────────────────┘
//!                 ▼
//!   MotionCanvas::draw_frame(ctx)
//!       lock ─► Scene: tasks by z ─► geometries ─► trackers ─► removals
//!                                                              │
//!                 ┌────────────────────────────────────────────┘
//!                 ▼
//!   is_valid? ──yes──► on_validated ──► host stops redrawing
//!       │
//!       no ──► host draws again
//! ```
//!
//! **[`canvas`]**: [`MotionCanvas`](canvas::MotionCanvas), with the lock, the
//! frame protocol, host notifications, and perf hooks.
//!
//! **[`scene`]**: Generational task and tracker storage, geometry
//! ownership, and the render pass with deferred removal of finished
//! one-shot entries.
//!
//! **[`motion`]**: The settle contract ([`Animatable`](motion::Animatable),
//! [`MotionState`](motion::MotionState)) and animated values
//! ([`MotionProperty`](motion::MotionProperty)) with easing curves.
//!
//! **[`backend`]**: Traits a drawing backend and its paints and geometries
//! implement.
//!
//! **[`perf`]**: Fixed-capacity ring buffers of frame-phase costs.
//!
//! **[`clock`]** / **[`time`]**: Tick time, timebases, and the per-frame
//! millisecond stamp.
//!
//! **[`config`]**: Runtime switches such as disabling animations.
//!
//! **[`trace`]**: [`TraceSink`](trace::TraceSink) trait and event types for
//! frame-loop instrumentation, with a zero-overhead
//! [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one branch
//!   per call site).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod backend;
pub mod canvas;
pub mod clock;
pub mod config;
pub mod motion;
pub mod perf;
pub mod scene;
pub mod time;
pub mod trace;

#[cfg(test)]
mod test_support;
