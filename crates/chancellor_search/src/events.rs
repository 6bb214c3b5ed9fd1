//! Notifications emitted while a query runs.

use crossbeam_channel::{unbounded, Receiver, Sender};
use serde::Serialize;

use crate::shapes::Shape;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SearchEvent {
    /// A scenario of the query is about to be searched
    #[serde(rename_all = "camelCase")]
    Scenario {
        index: usize,
        total: usize,
        opening: String,
        estimated_leaves: u64,
    },
    /// One more node was visited
    Progress { visited: u64 },
    /// Arrows for the engine line at the node just scored
    BestLine { shapes: Vec<Shape> },
}

/// Fire-and-forget sender of [`SearchEvent`]s.
///
/// A sink without a receiver, or whose receiver was dropped, silently discards
/// events.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    sender: Option<Sender<SearchEvent>>,
}

impl EventSink {
    pub fn new(sender: Sender<SearchEvent>) -> Self {
        Self {
            sender: Some(sender),
        }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn channel() -> (Self, Receiver<SearchEvent>) {
        let (sender, receiver) = unbounded();
        (Self::new(sender), receiver)
    }

    pub fn emit(&self, event: SearchEvent) {
        if let Some(sender) = &self.sender {
            let _ = sender.send(event);
        }
    }
}
