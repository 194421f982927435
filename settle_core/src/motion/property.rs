// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animated values.

use kurbo::{Point, Rect, Size, Vec2};

use super::MotionState;
use super::easing::Easing;
use crate::time::FrameTime;

/// Linear interpolation between two values of the same type.
pub trait Interpolate: Copy {
    /// Returns the value at progress `t` from `self` to `to`.
    ///
    /// `t` may leave `[0, 1]` for overshooting easings.
    #[must_use]
    fn interpolate(self, to: Self, t: f64) -> Self;
}

impl Interpolate for f64 {
    fn interpolate(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

impl Interpolate for f32 {
    #[expect(
        clippy::cast_possible_truncation,
        reason = "eased progress is computed in f64 and narrowed to the value's precision"
    )]
    fn interpolate(self, to: Self, t: f64) -> Self {
        self + (to - self) * t as f32
    }
}

impl Interpolate for Point {
    fn interpolate(self, to: Self, t: f64) -> Self {
        self.lerp(to, t)
    }
}

impl Interpolate for Vec2 {
    fn interpolate(self, to: Self, t: f64) -> Self {
        self.lerp(to, t)
    }
}

impl Interpolate for Size {
    fn interpolate(self, to: Self, t: f64) -> Self {
        Self::new(
            self.width.interpolate(to.width, t),
            self.height.interpolate(to.height, t),
        )
    }
}

impl Interpolate for Rect {
    fn interpolate(self, to: Self, t: f64) -> Self {
        Self::new(
            self.x0.interpolate(to.x0, t),
            self.y0.interpolate(to.y0, t),
            self.x1.interpolate(to.x1, t),
            self.y1.interpolate(to.y1, t),
        )
    }
}

/// Duration and curve of a transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Animation {
    /// Length of the transition in milliseconds of frame time.
    pub duration_ms: u64,
    /// Curve applied to linear progress.
    pub easing: Easing,
}

impl Animation {
    /// Creates an animation.
    #[must_use]
    pub const fn new(duration_ms: u64, easing: Easing) -> Self {
        Self {
            duration_ms,
            easing,
        }
    }
}

impl Default for Animation {
    fn default() -> Self {
        Self::new(500, Easing::CubicOut)
    }
}

/// A value that transitions towards a target over frame time.
///
/// [`set`](Self::set) begins a transition from wherever the value currently
/// is. The start is latched on the next [`get`](Self::get), so the elapsed
/// time is measured from the first frame that observes the change rather
/// than from when the model changed it. While running, `get` clears the
/// owner's settle flag so the canvas schedules another frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionProperty<T> {
    from: T,
    to: T,
    animation: Option<Animation>,
    start: FrameTime,
    requires_start: bool,
    completed: bool,
}

impl<T: Interpolate> MotionProperty<T> {
    /// A settled property holding `value`, with no animation.
    #[must_use]
    pub const fn new(value: T) -> Self {
        Self {
            from: value,
            to: value,
            animation: None,
            start: FrameTime::ZERO,
            requires_start: false,
            completed: true,
        }
    }

    /// Sets the animation used by later calls to [`set`](Self::set).
    #[must_use]
    pub const fn with_animation(mut self, animation: Animation) -> Self {
        self.animation = Some(animation);
        self
    }

    /// Replaces the animation. `None` makes changes immediate.
    pub fn set_animation(&mut self, animation: Option<Animation>) {
        self.animation = animation;
    }

    /// The value the property is heading to.
    #[must_use]
    pub const fn target(&self) -> T {
        self.to
    }

    /// Whether the last transition has finished.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// Begins a transition to `value` and re-arms `state`.
    pub fn set(&mut self, value: T, state: &mut MotionState) {
        self.from = self.value_at(state.current_time());
        self.to = value;
        match self.animation {
            Some(animation) if animation.duration_ms > 0 => {
                self.requires_start = true;
                self.completed = false;
            }
            _ => self.complete(),
        }
        state.invalidate();
    }

    /// Reads the value at the state's current frame time.
    ///
    /// Clears the state's settle flag while the transition is still running.
    pub fn get(&mut self, state: &mut MotionState) -> T {
        if self.completed {
            return self.to;
        }
        let now = state.current_time();
        if self.requires_start {
            self.start = now;
            self.requires_start = false;
        }
        let Some(animation) = self.animation else {
            self.complete();
            return self.to;
        };
        let elapsed = now.saturating_millis_since(self.start);
        if elapsed >= animation.duration_ms {
            self.complete();
            return self.to;
        }
        state.invalidate();
        self.eased(animation, elapsed)
    }

    /// Snaps to the target.
    pub fn complete(&mut self) {
        self.from = self.to;
        self.requires_start = false;
        self.completed = true;
    }

    fn value_at(&self, now: FrameTime) -> T {
        if self.completed || self.requires_start {
            return if self.completed { self.to } else { self.from };
        }
        match self.animation {
            Some(animation) => {
                let elapsed = now.saturating_millis_since(self.start);
                if elapsed >= animation.duration_ms {
                    self.to
                } else {
                    self.eased(animation, elapsed)
                }
            }
            None => self.to,
        }
    }

    fn eased(&self, animation: Animation, elapsed: u64) -> T {
        let t = elapsed as f64 / animation.duration_ms as f64;
        self.from.interpolate(self.to, animation.easing.apply(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear(ms: u64) -> Animation {
        Animation::new(ms, Easing::Linear)
    }

    fn state_at(ms: u64) -> MotionState {
        let mut state = MotionState::new();
        state.set_current_time(FrameTime(ms));
        state.set_valid(true);
        state
    }

    #[test]
    fn without_animation_set_is_immediate() {
        let mut prop = MotionProperty::new(1.0_f64);
        let mut state = state_at(0);
        prop.set(5.0, &mut state);
        assert!(!state.is_valid(), "set re-arms the owner");
        state.set_valid(true);
        assert_eq!(prop.get(&mut state), 5.0);
        assert!(state.is_valid(), "no transition is running");
    }

    #[test]
    fn transition_interpolates_and_flags_invalid() {
        let mut prop = MotionProperty::new(0.0_f64).with_animation(linear(100));
        let mut state = state_at(1000);
        prop.set(10.0, &mut state);

        // First observation latches the start.
        state.set_valid(true);
        assert_eq!(prop.get(&mut state), 0.0);
        assert!(!state.is_valid());

        let mut state = state_at(1050);
        let mid = prop.get(&mut state);
        assert!((mid - 5.0).abs() < 1e-9, "halfway, got {mid}");
        assert!(!state.is_valid());

        let mut state = state_at(1100);
        assert_eq!(prop.get(&mut state), 10.0);
        assert!(state.is_valid(), "finished transitions leave the owner settled");
        assert!(prop.is_completed());
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let mut prop = MotionProperty::new(0.0_f64).with_animation(linear(100));
        let mut state = state_at(0);
        prop.set(10.0, &mut state);
        let _ = prop.get(&mut state);

        let mut state = state_at(50);
        prop.set(0.0, &mut state);
        let mut state = state_at(50);
        assert!((prop.get(&mut state) - 5.0).abs() < 1e-9, "starts from 5");
        assert_eq!(prop.target(), 0.0);
    }

    #[test]
    fn complete_snaps_to_target() {
        let mut prop = MotionProperty::new(Point::ZERO).with_animation(linear(1000));
        let mut state = state_at(0);
        prop.set(Point::new(4.0, 8.0), &mut state);
        prop.complete();
        state.set_valid(true);
        assert_eq!(prop.get(&mut state), Point::new(4.0, 8.0));
        assert!(state.is_valid());
    }

    #[test]
    fn rect_interpolates_each_edge() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(a.interpolate(b, 0.5), Rect::new(5.0, 10.0, 20.0, 25.0));
    }
}
