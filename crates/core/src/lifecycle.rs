//! Listener registry and notification dispatch for displays
//!
//! Displays can emit events from worker threads while the tree is being
//! edited on the owning thread. Events go through a channel and are only
//! delivered at an idle point, to listeners that are still attached, for
//! displays that are still live. Removal therefore has to:
//!
//! 1. detach every listener of the display (and its descendants), then
//! 2. tombstone it in the tree,
//!
//! and storage is reclaimed only after the next dispatch has returned. An
//! event that was already queued when the display was removed is dropped
//! instead of reaching a listener.

use crate::{DisplayId, DisplayNotifier, Notification};
use crossbeam::channel::{unbounded, Receiver, Sender};
use display_panel_types::DisplayEvent;
use log::trace;
use std::collections::HashMap;

/// Callback invoked with the source display and the event
pub type Listener = Box<dyn FnMut(DisplayId, &DisplayEvent)>;

/// Handle returned by [`LifecycleGuard::connect`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

pub struct LifecycleGuard {
    sender: Sender<Notification>,
    receiver: Receiver<Notification>,
    listeners: HashMap<DisplayId, Vec<(ListenerId, Listener)>>,
    next_listener: u64,
}

impl LifecycleGuard {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender,
            receiver,
            listeners: HashMap::new(),
            next_listener: 0,
        }
    }

    /// Notifier handed to a display when it joins the tree
    pub fn notifier(&self, source: DisplayId) -> DisplayNotifier {
        DisplayNotifier::new(source, self.sender.clone())
    }

    /// Queue an event from the owning thread
    pub fn post(&self, source: DisplayId, event: DisplayEvent) {
        // The receiver lives in self, so the channel cannot be disconnected here
        let _ = self.sender.send(Notification { source, event });
    }

    pub fn connect(&mut self, source: DisplayId, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.entry(source).or_default().push((id, listener));
        id
    }

    /// Detach a single listener. Returns false if it was already gone.
    pub fn disconnect(&mut self, listener: ListenerId) -> bool {
        for list in self.listeners.values_mut() {
            if let Some(pos) = list.iter().position(|(id, _)| *id == listener) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    /// Detach every listener of `source`. Returns how many were detached.
    pub fn disconnect_all(&mut self, source: DisplayId) -> usize {
        let detached = self.listeners.remove(&source).map_or(0, |l| l.len());
        if detached > 0 {
            trace!("Detached {} listener(s) from {}", detached, source);
        }
        detached
    }

    pub fn listener_count(&self, source: DisplayId) -> usize {
        self.listeners.get(&source).map_or(0, Vec::len)
    }

    /// Number of queued, undelivered events
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Deliver the events queued so far. Events emitted by listeners wait
    /// for the next call. Returns the number of listener invocations.
    ///
    /// Returns only after every listener has run, so storage freed after
    /// this call can no longer be reached from a delivery.
    pub fn dispatch_pending(&mut self, is_live: impl Fn(DisplayId) -> bool) -> usize {
        let batch: Vec<Notification> = self.receiver.try_iter().collect();
        if batch.is_empty() {
            return 0;
        }

        let mut delivered = 0;
        for note in batch {
            if !is_live(note.source) {
                trace!("Dropping {} from removed display {}", note.event.kind(), note.source);
                continue;
            }
            if let Some(list) = self.listeners.get_mut(&note.source) {
                for (_, listener) in list.iter_mut() {
                    listener(note.source, &note.event);
                    delivered += 1;
                }
            }
        }
        delivered
    }
}

impl Default for LifecycleGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingDisplay;
    use crate::DisplayTree;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn setup() -> (DisplayTree, DisplayId, LifecycleGuard, Rc<RefCell<Vec<String>>>) {
        let mut tree = DisplayTree::new(&[]);
        let id = tree
            .insert("Recording", "a", true, RecordingDisplay::boxed(), None)
            .unwrap();
        let mut guard = LifecycleGuard::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        guard.connect(
            id,
            Box::new(move |_, event| sink.borrow_mut().push(event.kind().to_string())),
        );
        (tree, id, guard, seen)
    }

    #[test]
    fn test_events_wait_for_dispatch() {
        let (tree, id, mut guard, seen) = setup();
        guard.post(id, DisplayEvent::EnabledChanged(false));
        assert!(seen.borrow().is_empty());

        assert_eq!(guard.dispatch_pending(|i| tree.is_live(i)), 1);
        assert_eq!(*seen.borrow(), vec!["enabled_changed"]);
    }

    #[test]
    fn test_cross_thread_event_delivered_on_owner() {
        let (tree, id, mut guard, seen) = setup();
        let notifier = guard.notifier(id);
        std::thread::spawn(move || {
            notifier.emit(DisplayEvent::TopicChanged {
                topic: "/scan".to_string(),
                datatype: "LaserScan".to_string(),
            });
        })
        .join()
        .unwrap();

        guard.dispatch_pending(|i| tree.is_live(i));
        assert_eq!(*seen.borrow(), vec!["topic_changed"]);
    }

    #[test]
    fn test_in_flight_event_dropped_after_removal() {
        let (mut tree, id, mut guard, seen) = setup();
        let notifier = guard.notifier(id);
        std::thread::spawn(move || notifier.emit(DisplayEvent::EnabledChanged(true)))
            .join()
            .unwrap();
        assert_eq!(guard.pending(), 1);

        guard.disconnect_all(id);
        tree.schedule_destroy(id);

        assert_eq!(guard.dispatch_pending(|i| tree.is_live(i)), 0);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_disconnect_single_listener() {
        let (tree, id, mut guard, seen) = setup();
        let other = guard.connect(id, Box::new(|_, _| {}));
        assert_eq!(guard.listener_count(id), 2);
        assert!(guard.disconnect(other));
        assert!(!guard.disconnect(other));

        guard.post(id, DisplayEvent::EnabledChanged(true));
        assert_eq!(guard.dispatch_pending(|i| tree.is_live(i)), 1);
        assert_eq!(seen.borrow().len(), 1);
    }
}
