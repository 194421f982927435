// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves.

use core::f64::consts::PI;

/// Maps linear progress `t ∈ [0, 1]` to eased progress.
///
/// Every curve maps `0 → 0` and `1 → 1`; some overshoot in between.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Easing {
    /// Constant speed.
    Linear,
    /// Accelerating quadratic.
    QuadraticIn,
    /// Decelerating quadratic.
    QuadraticOut,
    /// Quadratic in, then out.
    QuadraticInOut,
    /// Accelerating cubic.
    CubicIn,
    /// Decelerating cubic.
    #[default]
    CubicOut,
    /// Cubic in, then out.
    CubicInOut,
    /// Accelerating sine.
    SineIn,
    /// Decelerating sine.
    SineOut,
    /// Overshoots the target slightly, then settles.
    BackOut,
    /// Bounces against the target.
    BounceOut,
    /// Springs past the target with decaying oscillation.
    ElasticOut,
}

impl Easing {
    /// Evaluates the curve. Input is clamped to `[0, 1]`.
    #[must_use]
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::QuadraticIn => t * t,
            Self::QuadraticOut => 1.0 - (1.0 - t) * (1.0 - t),
            Self::QuadraticInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Self::CubicIn => t * t * t,
            Self::CubicOut => 1.0 - (1.0 - t).powi(3),
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Self::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Self::SineOut => (t * PI / 2.0).sin(),
            Self::BackOut => {
                const C1: f64 = 1.701_58;
                const C3: f64 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
            Self::BounceOut => bounce_out(t),
            Self::ElasticOut => {
                if t == 0.0 || t == 1.0 {
                    t
                } else {
                    const C4: f64 = 2.0 * PI / 3.0;
                    2.0_f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * C4).sin() + 1.0
                }
            }
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984_375
    }
}
