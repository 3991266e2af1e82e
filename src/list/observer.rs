//! Change notifications for presentation layers

use super::item::{Item, ItemId};

/// What happened to the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// State was (re)loaded from the store
    Rehydrated,
    Added(ItemId),
    Removed(ItemId),
    /// Item text replaced by a committed edit
    Updated(ItemId),
    Toggled(ItemId),
    Cleared,
    EditStarted(ItemId),
    /// Edit mode left, whether or not the text changed
    EditEnded,
    DraftChanged,
}

/// Read-only view handed to subscribers
#[derive(Debug, Clone, Copy)]
pub struct Snapshot<'a> {
    pub items: &'a [Item],
    pub draft: &'a str,
    pub editing: Option<ItemId>,
}

/// Handle returned by `TodoList::subscribe`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Callback = Box<dyn FnMut(&Change, &Snapshot<'_>)>;

/// Subscriber registry, notified in subscription order
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(SubscriptionId, Callback)>,
}

impl Observers {
    pub(crate) fn subscribe(&mut self, callback: Callback) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sid, _)| *sid != id);
        self.entries.len() != before
    }

    pub(crate) fn notify(&mut self, change: &Change, snapshot: &Snapshot<'_>) {
        for (_, callback) in self.entries.iter_mut() {
            callback(change, snapshot);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn empty_snapshot() -> Snapshot<'static> {
        Snapshot {
            items: &[],
            draft: "",
            editing: None,
        }
    }

    #[test]
    fn test_notify_in_subscription_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut observers = Observers::default();

        for tag in ["first", "second"] {
            let log = Rc::clone(&log);
            observers.subscribe(Box::new(move |change: &Change, _: &Snapshot<'_>| {
                log.borrow_mut().push((tag, *change));
            }));
        }

        observers.notify(&Change::Cleared, &empty_snapshot());
        assert_eq!(
            *log.borrow(),
            vec![("first", Change::Cleared), ("second", Change::Cleared)]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let hits = Rc::new(RefCell::new(0));
        let mut observers = Observers::default();

        let counter = Rc::clone(&hits);
        let id = observers.subscribe(Box::new(move |_: &Change, _: &Snapshot<'_>| {
            *counter.borrow_mut() += 1
        }));

        observers.notify(&Change::DraftChanged, &empty_snapshot());
        assert!(observers.unsubscribe(id));
        assert!(!observers.unsubscribe(id));
        observers.notify(&Change::DraftChanged, &empty_snapshot());

        assert_eq!(*hits.borrow(), 1);
        assert!(observers.entries.is_empty());
    }
}
