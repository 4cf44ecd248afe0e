//! Event log for external observers.
//!
//! The [`EventLog`] records what the simulator did: every terminal task and
//! every completed destroy cascade. It never influences inventory state; it
//! only keeps a bounded history that can be drained with
//! [`EventLog::take_events`].
//!
//! # Example
//!
//! ```
//! use vsim_core::event::{EventKind, EventLog};
//! use vsim_types::{EntityKind, EntityReference};
//!
//! let log = EventLog::new(100);
//! log.record(EventKind::DatastoreDestroyed {
//!     datastore: EntityReference::of(EntityKind::Datastore, "datastore-4"),
//!     name: "LocalDS_0".to_string(),
//! });
//! assert_eq!(log.event_count(), 1);
//!
//! let events = log.take_events();
//! assert_eq!(events[0].key, 1);
//! assert!(log.is_empty());
//! ```

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use vsim_types::EntityReference;

use crate::task::TaskState;

/// What happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A task reached a terminal state.
    TaskCompleted {
        /// The task.
        task: EntityReference,
        /// The entity the task ran against.
        owner: EntityReference,
        /// Operation name, e.g. `SearchDatastore_Task`.
        operation: String,
        /// Terminal state.
        state: TaskState,
    },

    /// A datastore was removed from the inventory.
    DatastoreDestroyed {
        /// Reference of the removed datastore.
        datastore: EntityReference,
        /// Its display name.
        name: String,
    },
}

/// One recorded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Monotonically increasing key, starting at 1.
    pub key: u64,
    /// When the event was recorded.
    pub created: DateTime<Utc>,
    /// Payload.
    pub kind: EventKind,
}

#[derive(Debug, Default)]
struct LogState {
    next_key: u64,
    events: VecDeque<Event>,
}

/// Bounded, thread-safe event history.
///
/// When the history is full the oldest event is dropped. Keys keep
/// increasing across drains.
#[derive(Debug)]
pub struct EventLog {
    limit: usize,
    state: Mutex<LogState>,
}

impl EventLog {
    /// Creates an empty log retaining at most `limit` events.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            state: Mutex::new(LogState {
                next_key: 1,
                events: VecDeque::new(),
            }),
        }
    }

    /// Appends an event and returns its key.
    pub fn record(&self, kind: EventKind) -> u64 {
        let mut state = self.state.lock();
        let key = state.next_key;
        state.next_key += 1;
        state.events.push_back(Event {
            key,
            created: Utc::now(),
            kind,
        });
        while state.events.len() > self.limit {
            state.events.pop_front();
        }
        key
    }

    /// Drains and returns all retained events, oldest first.
    pub fn take_events(&self) -> Vec<Event> {
        self.state.lock().events.drain(..).collect()
    }

    /// Returns a copy of the retained events without draining them.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Event> {
        self.state.lock().events.iter().cloned().collect()
    }

    /// Returns the number of retained events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.state.lock().events.len()
    }

    /// Returns true if no events are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().events.is_empty()
    }

    /// Drops all retained events.
    pub fn clear(&self) {
        self.state.lock().events.clear();
    }
}
