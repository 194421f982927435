// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paint tasks, their geometries, and standalone trackers.
//!
//! A [`Scene`] is what a canvas lock protects. Tasks and trackers live in
//! generational slot arenas addressed by [`TaskId`] and [`TrackerId`];
//! geometries live inside their owning task, addressed by [`GeometryId`].
//!
//! The scene is an identity set: every paint or geometry is moved in, so
//! the same value cannot be present twice, and two equal-looking paints are
//! still distinct members. Handles to removed entries go stale and every
//! lookup through them returns `None`.
//!
//! [`Scene::render_pass`] advances everything by one frame. Entries that
//! finish during the pass are collected on side lists and detached only
//! after every task and tracker has been visited.

mod id;
mod pass;
mod slots;

pub use id::{GeometryId, TaskId, TrackerId};
pub use pass::PassStats;

use core::any::Any;
use core::fmt;

use crate::backend::{Drawable, Paint};
use crate::motion::Animatable;
use slots::Slots;

struct TaskEntry<C> {
    paint: Box<dyn Paint<C>>,
    /// Insertion sequence, the z-order tiebreak.
    seq: u64,
    geometries: Vec<(GeometryId, Box<dyn Drawable<C>>)>,
}

/// Tasks and trackers of one canvas.
pub struct Scene<C> {
    tasks: Slots<TaskEntry<C>>,
    trackers: Slots<Box<dyn Animatable>>,
    next_seq: u64,
    next_geometry: u64,
    geometry_count: usize,
    // Per-frame scratch, kept to avoid reallocating.
    draw_order: Vec<(i32, u64, u32, u32)>,
    removed_geometries: Vec<(u32, GeometryId)>,
    removed_tasks: Vec<TaskId>,
}

impl<C> fmt::Debug for Scene<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("tasks", &self.tasks.len())
            .field("geometries", &self.geometry_count)
            .field("trackers", &self.trackers.len())
            .finish_non_exhaustive()
    }
}

impl<C: 'static> Default for Scene<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: 'static> Scene<C> {
    /// Creates an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tasks: Slots::default(),
            trackers: Slots::default(),
            next_seq: 0,
            next_geometry: 0,
            geometry_count: 0,
            draw_order: Vec::new(),
            removed_geometries: Vec::new(),
            removed_tasks: Vec::new(),
        }
    }

    // -- Tasks --------------------------------------------------------------

    /// Adds a paint task with no geometries.
    pub fn insert_task(&mut self, paint: Box<dyn Paint<C>>) -> TaskId {
        let seq = self.next_seq;
        self.next_seq += 1;
        let (idx, generation) = self.tasks.insert(TaskEntry {
            paint,
            seq,
            geometries: Vec::new(),
        });
        TaskId { idx, generation }
    }

    /// Detaches and removes a task, dropping its geometries.
    ///
    /// Returns the paint so a chart model can re-add it later, or `None` if
    /// the handle is stale.
    pub fn remove_task(&mut self, id: TaskId) -> Option<Box<dyn Paint<C>>> {
        let entry = self.tasks.remove(id.idx, id.generation)?;
        Some(self.detach(entry))
    }

    /// Swaps the whole task set. Old tasks are detached first.
    pub fn replace_tasks<I>(&mut self, paints: I) -> Vec<TaskId>
    where
        I: IntoIterator<Item = Box<dyn Paint<C>>>,
    {
        self.clear_tasks();
        paints.into_iter().map(|p| self.insert_task(p)).collect()
    }

    /// Detaches and removes every task.
    pub fn clear_tasks(&mut self) {
        for entry in self.tasks.drain() {
            let _ = self.detach(entry);
        }
        debug_assert_eq!(self.geometry_count, 0, "geometry count drifted");
    }

    /// Whether `id` still names a task in this scene.
    #[must_use]
    pub fn contains_task(&self, id: TaskId) -> bool {
        self.tasks.is_alive(id.idx, id.generation)
    }

    /// Number of paint tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// Handles of every task, in slot order.
    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks
            .iter()
            .map(|(idx, generation, _)| TaskId { idx, generation })
    }

    /// The paint of a task.
    #[must_use]
    pub fn task(&self, id: TaskId) -> Option<&dyn Paint<C>> {
        self.tasks
            .get(id.idx, id.generation)
            .map(|entry| &*entry.paint)
    }

    /// Mutable access to the paint of a task.
    pub fn task_mut(&mut self, id: TaskId) -> Option<&mut dyn Paint<C>> {
        let entry = self.tasks.get_mut(id.idx, id.generation)?;
        Some(&mut *entry.paint)
    }

    /// The paint of a task, as its concrete type.
    #[must_use]
    pub fn paint<P: Paint<C>>(&self, id: TaskId) -> Option<&P> {
        let entry = self.tasks.get(id.idx, id.generation)?;
        let paint: &dyn Any = &*entry.paint;
        paint.downcast_ref()
    }

    /// Mutable access to the paint of a task, as its concrete type.
    pub fn paint_mut<P: Paint<C>>(&mut self, id: TaskId) -> Option<&mut P> {
        let entry = self.tasks.get_mut(id.idx, id.generation)?;
        let paint: &mut dyn Any = &mut *entry.paint;
        paint.downcast_mut()
    }

    // -- Geometries ---------------------------------------------------------

    /// Attaches a geometry to a task. Geometries draw in attachment order.
    ///
    /// # Panics
    ///
    /// Panics if `task` is stale.
    pub fn add_geometry(&mut self, task: TaskId, geometry: Box<dyn Drawable<C>>) -> GeometryId {
        let id = GeometryId(self.next_geometry);
        self.next_geometry += 1;
        self.entry_mut(task).geometries.push((id, geometry));
        self.geometry_count += 1;
        id
    }

    /// Detaches a geometry from its task.
    ///
    /// Returns `None` if the task is stale or does not own `geometry`.
    pub fn remove_geometry(
        &mut self,
        task: TaskId,
        geometry: GeometryId,
    ) -> Option<Box<dyn Drawable<C>>> {
        let entry = self.tasks.get_mut(task.idx, task.generation)?;
        let pos = entry.geometries.iter().position(|(id, _)| *id == geometry)?;
        self.geometry_count -= 1;
        Some(entry.geometries.remove(pos).1)
    }

    /// Geometries owned by a task, in draw order. Empty for a stale handle.
    pub fn geometries(&self, task: TaskId) -> impl Iterator<Item = GeometryId> + '_ {
        self.tasks
            .get(task.idx, task.generation)
            .into_iter()
            .flat_map(|entry| entry.geometries.iter().map(|(id, _)| *id))
    }

    /// A geometry, as its concrete type.
    #[must_use]
    pub fn geometry<G: Drawable<C>>(&self, task: TaskId, geometry: GeometryId) -> Option<&G> {
        let entry = self.tasks.get(task.idx, task.generation)?;
        let (_, drawable) = entry.geometries.iter().find(|(id, _)| *id == geometry)?;
        let drawable: &dyn Any = &**drawable;
        drawable.downcast_ref()
    }

    /// Mutable access to a geometry, as its concrete type.
    pub fn geometry_mut<G: Drawable<C>>(
        &mut self,
        task: TaskId,
        geometry: GeometryId,
    ) -> Option<&mut G> {
        let entry = self.tasks.get_mut(task.idx, task.generation)?;
        let (_, drawable) = entry
            .geometries
            .iter_mut()
            .find(|(id, _)| *id == geometry)?;
        let drawable: &mut dyn Any = &mut **drawable;
        drawable.downcast_mut()
    }

    /// Total geometries across every task.
    #[must_use]
    pub fn geometry_count(&self) -> usize {
        self.geometry_count
    }

    // -- Trackers -----------------------------------------------------------

    /// Registers a tracker, advanced once per frame.
    pub fn insert_tracker(&mut self, tracker: Box<dyn Animatable>) -> TrackerId {
        let (idx, generation) = self.trackers.insert(tracker);
        TrackerId { idx, generation }
    }

    /// Unregisters a tracker. `None` if the handle is stale.
    pub fn remove_tracker(&mut self, id: TrackerId) -> Option<Box<dyn Animatable>> {
        self.trackers.remove(id.idx, id.generation)
    }

    /// Number of trackers.
    #[must_use]
    pub fn tracker_count(&self) -> usize {
        self.trackers.len()
    }

    /// Unregisters every tracker.
    pub fn clear_trackers(&mut self) {
        drop(self.trackers.drain());
    }

    // -- Internals ----------------------------------------------------------

    fn entry_mut(&mut self, id: TaskId) -> &mut TaskEntry<C> {
        match self.tasks.get_mut(id.idx, id.generation) {
            Some(entry) => entry,
            None => panic!("stale TaskId: {id:?}"),
        }
    }

    fn detach(&mut self, entry: TaskEntry<C>) -> Box<dyn Paint<C>> {
        self.geometry_count -= entry.geometries.len();
        let mut paint = entry.paint;
        paint.on_detached();
        paint
    }
}
