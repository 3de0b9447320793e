//! Change-notification listeners.
//!
//! # Invariants
//! - Listeners run synchronously, in subscription order, after the write that
//!   triggered them has been committed.
//! - A listener id is never reused.

use std::fmt::{Debug, Formatter};
use uuid::Uuid;

/// Payload delivered to listeners when an observable value changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyChanged {
    pub property_name: String,
}

/// Subscription token returned by `subscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(Uuid);

type Listener = Box<dyn FnMut(&PropertyChanged)>;

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    entries: Vec<(ListenerId, Listener)>,
}

impl ListenerRegistry {
    pub(crate) fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(Uuid::new_v4());
        self.entries.push((id, listener));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn notify(&mut self, property_name: &str) {
        let event = PropertyChanged {
            property_name: property_name.to_string(),
        };
        for (_, listener) in &mut self.entries {
            listener(&event);
        }
    }
}

impl Debug for ListenerRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("listeners", &self.entries.len())
            .finish()
    }
}
