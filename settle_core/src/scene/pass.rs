// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One frame's walk over a scene.

use core::mem;

use super::{Scene, TaskId};
use crate::time::FrameTime;

/// What a render pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassStats {
    /// Every task, geometry, and tracker settled and nothing was removed.
    pub is_valid: bool,
    /// Tasks visited.
    pub tasks_visited: u32,
    /// Geometries visited, including those of paused tasks.
    pub geometries_visited: u32,
    /// Trackers advanced.
    pub trackers_visited: u32,
    /// One-shot geometries detached after the walk.
    pub geometries_removed: u32,
    /// One-shot tasks detached after the walk.
    pub tasks_removed: u32,
}

impl PassStats {
    /// Stats for a pass that has not visited anything yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            is_valid: true,
            tasks_visited: 0,
            geometries_visited: 0,
            trackers_visited: 0,
            geometries_removed: 0,
            tasks_removed: 0,
        }
    }
}

impl Default for PassStats {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> Scene<C> {
    /// Advances every task, geometry, and tracker by one frame.
    ///
    /// Tasks draw in ascending z-index, ties in insertion order. Every entity
    /// visited is marked valid and stamped with `frame` before it runs, so
    /// the result reports whether anything is still moving. With `snap` set,
    /// transitions are completed before drawing.
    ///
    /// Settled one-shot geometries and tasks are detached once the walk is
    /// over. A pass that removes anything reports invalid so the host draws
    /// once more without it.
    pub fn render_pass(&mut self, ctx: &mut C, frame: FrameTime, snap: bool) -> PassStats {
        let mut stats = PassStats::new();
        self.draw_tasks(ctx, frame, snap, &mut stats);
        self.advance_trackers(frame, snap, &mut stats);
        self.apply_removals(&mut stats);
        stats
    }

    pub(crate) fn draw_tasks(
        &mut self,
        ctx: &mut C,
        frame: FrameTime,
        snap: bool,
        stats: &mut PassStats,
    ) {
        let mut order = mem::take(&mut self.draw_order);
        order.clear();
        order.extend(
            self.tasks
                .iter()
                .map(|(idx, generation, entry)| (entry.paint.z_index(), entry.seq, idx, generation)),
        );
        // Sequence numbers are unique, so this is a total order.
        order.sort_unstable();

        for &(_, _, idx, generation) in &order {
            let Some(entry) = self.tasks.get_at_mut(idx) else {
                continue;
            };
            let paint = &mut entry.paint;
            if snap {
                paint.complete_transition();
            }
            let state = paint.motion_mut();
            state.set_valid(true);
            state.set_current_time(frame);
            paint.initialize(ctx);

            let paused = paint.is_paused();
            let mut geometries_valid = true;
            for (id, geometry) in &mut entry.geometries {
                if snap {
                    geometry.complete_transition();
                }
                let state = geometry.motion_mut();
                state.set_valid(true);
                state.set_current_time(frame);
                if !paused {
                    geometry.draw(ctx);
                }
                stats.geometries_visited += 1;

                let state = geometry.motion();
                geometries_valid &= state.is_valid();
                if state.is_valid() && state.remove_on_completed() {
                    self.removed_geometries.push((idx, *id));
                }
            }

            // A task is settled only when all of its geometries are.
            let state = paint.motion_mut();
            let task_valid = state.is_valid() && geometries_valid;
            state.set_valid(task_valid);
            stats.is_valid &= task_valid;
            if task_valid && state.remove_on_completed() {
                self.removed_tasks.push(TaskId { idx, generation });
            }
            paint.dispose(ctx);
            stats.tasks_visited += 1;
        }
        self.draw_order = order;
    }

    pub(crate) fn advance_trackers(&mut self, frame: FrameTime, snap: bool, stats: &mut PassStats) {
        for tracker in self.trackers.values_mut() {
            if snap {
                tracker.complete_transition();
            }
            let state = tracker.motion_mut();
            state.set_valid(true);
            state.set_current_time(frame);
            tracker.update();
            stats.is_valid &= tracker.motion().is_valid();
            stats.trackers_visited += 1;
        }
    }

    pub(crate) fn apply_removals(&mut self, stats: &mut PassStats) {
        let mut geometries = mem::take(&mut self.removed_geometries);
        for (idx, geometry) in geometries.drain(..) {
            let Some(entry) = self.tasks.get_at_mut(idx) else {
                continue;
            };
            if let Some(pos) = entry.geometries.iter().position(|(id, _)| *id == geometry) {
                drop(entry.geometries.remove(pos));
                self.geometry_count -= 1;
                stats.geometries_removed += 1;
            }
        }
        self.removed_geometries = geometries;

        let mut tasks = mem::take(&mut self.removed_tasks);
        for id in tasks.drain(..) {
            if self.remove_task(id).is_some() {
                stats.tasks_removed += 1;
            }
        }
        self.removed_tasks = tasks;

        if stats.geometries_removed > 0 || stats.tasks_removed > 0 {
            stats.is_valid = false;
        }
    }
}
