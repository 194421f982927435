// Copyright 2026 the Settle Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invalidated/validated callback registry.

use core::fmt;
use std::sync::Arc;

use super::MotionCanvas;
use crate::trace::NotifyKind;

/// A registered notification handler.
pub(crate) type Handler<C> = Arc<dyn Fn(&MotionCanvas<C>) + Send + Sync>;

type HandlerList<C> = Arc<Vec<(ListenerId, Handler<C>)>>;

/// Identifies a registered listener, for
/// [`MotionCanvas::remove_listener`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Debug for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListenerId({})", self.0)
    }
}

/// Handlers per notification, in registration order.
///
/// Lists are copy-on-write: raising a notification clones an `Arc`, so the
/// registry lock is never held while a handler runs.
pub(crate) struct Listeners<C> {
    next: u64,
    invalidated: HandlerList<C>,
    validated: HandlerList<C>,
}

impl<C> Listeners<C> {
    pub(crate) fn new() -> Self {
        Self {
            next: 0,
            invalidated: Arc::default(),
            validated: Arc::default(),
        }
    }

    pub(crate) fn add(&mut self, kind: NotifyKind, handler: Handler<C>) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        Arc::make_mut(self.list_mut(kind)).push((id, handler));
        id
    }

    pub(crate) fn remove(&mut self, id: ListenerId) -> bool {
        [NotifyKind::Invalidated, NotifyKind::Validated]
            .into_iter()
            .any(|kind| {
                let list = self.list_mut(kind);
                match list.iter().position(|(existing, _)| *existing == id) {
                    Some(pos) => {
                        drop(Arc::make_mut(list).remove(pos));
                        true
                    }
                    None => false,
                }
            })
    }

    pub(crate) fn snapshot(&self, kind: NotifyKind) -> HandlerList<C> {
        match kind {
            NotifyKind::Invalidated => Arc::clone(&self.invalidated),
            NotifyKind::Validated => Arc::clone(&self.validated),
        }
    }

    fn list_mut(&mut self, kind: NotifyKind) -> &mut HandlerList<C> {
        match kind {
            NotifyKind::Invalidated => &mut self.invalidated,
            NotifyKind::Validated => &mut self.validated,
        }
    }
}
