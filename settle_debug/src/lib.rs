// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pretty-printing, recording, and Chrome trace export for settle canvas
//! diagnostics.
//!
//! This crate provides [`TraceSink`](settle_core::trace::TraceSink)
//! implementations for development and post-mortem analysis:
//!
//! - [`pretty::PrettyPrintSink`]: human-readable one-line-per-event output.
//! - [`recorder::RecorderSink`]: compact binary recording with
//!   [`recorder::decode`] for playback.
//! - [`chrome::export`]: writes Chrome Trace Event Format JSON from
//!   recorded bytes.
//!
//! Install a sink with
//! [`MotionCanvas::set_trace_sink`](settle_core::canvas::MotionCanvas::set_trace_sink)
//! and turn on
//! [`CanvasConfig::verbose_logging`](settle_core::config::CanvasConfig::verbose_logging).

pub mod chrome;
pub mod pretty;
pub mod recorder;
