// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canvas configuration.

/// Behaviour switches for a [`MotionCanvas`](crate::canvas::MotionCanvas).
///
/// Replaceable at runtime with
/// [`MotionCanvas::set_config`](crate::canvas::MotionCanvas::set_config); the
/// next frame uses the new values. `perf_buffer_degree` is only read when the
/// canvas is built.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CanvasConfig {
    /// Snap every transition to its end state before drawing.
    pub disable_animations: bool,
    /// Emit per-frame trace events and the periodic perf summary.
    pub verbose_logging: bool,
    /// Minimum frame-time gap between two perf summary events.
    pub perf_log_interval_ms: u64,
    /// Perf ring buffers hold `1 << perf_buffer_degree` samples.
    pub perf_buffer_degree: u32,
}

impl CanvasConfig {
    /// Animated rendering for an interactive view.
    #[must_use]
    pub const fn interactive() -> Self {
        Self {
            disable_animations: false,
            verbose_logging: false,
            perf_log_interval_ms: 500,
            perf_buffer_degree: 5,
        }
    }

    /// Every frame renders final state. For image export and tests.
    #[must_use]
    pub const fn snapshot() -> Self {
        Self {
            disable_animations: true,
            ..Self::interactive()
        }
    }

    /// Returns a copy with verbose logging switched on or off.
    #[must_use]
    pub const fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self::interactive()
    }
}
