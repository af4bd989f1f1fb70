// Minimal synchronous observer registry.
// Notifications are delivered on the calling thread, in subscription order.
// This is a same-process publish mechanism, not a durable event log.

/// Token returned by [`Observers::subscribe`], used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

pub struct Observers<T: ?Sized> {
    next_id: u64,
    subs: Vec<(SubscriptionId, Box<dyn Fn(&T) + Send>)>,
}

impl<T: ?Sized> Observers<T> {
    pub fn new() -> Self {
        Observers {
            next_id: 0,
            subs: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, f: impl Fn(&T) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subs.push((id, Box::new(f)));
        id
    }

    /// Returns false if the id was already removed (or never existed).
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subs.len();
        self.subs.retain(|(sub_id, _)| *sub_id != id);
        self.subs.len() != before
    }

    pub fn notify(&self, value: &T) {
        for (_, f) in &self.subs {
            f(value);
        }
    }

    pub fn len(&self) -> usize {
        self.subs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subs.is_empty()
    }
}

impl<T: ?Sized> Default for Observers<T> {
    fn default() -> Self {
        Self::new()
    }
}
