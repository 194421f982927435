// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Task, geometry, and tracker identity types.

use core::fmt;

/// A handle to a paint task in a [`Scene`](super::Scene).
///
/// Contains both a slot index and a generation counter so that stale handles
/// are detected after a task is removed and its slot is reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl TaskId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskId({}@gen{})", self.idx, self.generation)
    }
}

/// A handle to an animation tracker in a [`Scene`](super::Scene).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrackerId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl fmt::Debug for TrackerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TrackerId({}@gen{})", self.idx, self.generation)
    }
}

/// Identity of a geometry within its scene.
///
/// Geometry ids are never reused, so a removed geometry's id stays dead.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeometryId(pub(crate) u64);

impl fmt::Debug for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GeometryId({})", self.0)
    }
}
