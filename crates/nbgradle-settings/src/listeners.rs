use std::fmt;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::executor::{TaskExecutor, UpdateTaskExecutor};

/// Callback notified when a property value (possibly) changed. It carries no payload: listeners
/// read the new value from the property.
pub type ChangeListener = Arc<dyn Fn() + Send + Sync>;

type Listener<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct ListenerList<A> {
    next_id: u64,
    listeners: Vec<(u64, Listener<A>)>,
}

/// Registry of listeners receiving an argument of type `A`.
///
/// Firing works on a snapshot of the registered listeners, so listeners may register or
/// unregister (themselves or others) from within a callback.
pub(crate) struct ListenerManager<A> {
    list: Arc<Mutex<ListenerList<A>>>,
}

impl<A> Clone for ListenerManager<A> {
    fn clone(&self) -> Self {
        Self {
            list: Arc::clone(&self.list),
        }
    }
}

impl<A: 'static> ListenerManager<A> {
    pub(crate) fn new() -> Self {
        Self {
            list: Arc::new(Mutex::new(ListenerList {
                next_id: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub(crate) fn register(&self, listener: impl Fn(&A) + Send + Sync + 'static) -> ListenerRef {
        let id = {
            let mut list = self.list.lock();
            let id = list.next_id;
            list.next_id += 1;
            list.listeners.push((id, Arc::new(listener)));
            id
        };

        let list: Weak<Mutex<ListenerList<A>>> = Arc::downgrade(&self.list);
        ListenerRef::new(move || {
            if let Some(list) = list.upgrade() {
                list.lock().listeners.retain(|(other, _)| *other != id);
            }
        })
    }

    pub(crate) fn fire(&self, arg: &A) {
        let snapshot: Vec<Listener<A>> = self
            .list
            .lock()
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(arg);
        }
    }

    pub(crate) fn listener_count(&self) -> usize {
        self.list.lock().listeners.len()
    }
}

type Unregister = Box<dyn FnOnce() + Send + Sync>;

/// Handle of a listener registration. Dropping the handle (or calling [`ListenerRef::unregister`])
/// removes the listener.
#[must_use = "dropping a ListenerRef unregisters the listener"]
pub struct ListenerRef {
    unregister: Vec<Unregister>,
}

impl ListenerRef {
    pub(crate) fn new(unregister: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            unregister: vec![Box::new(unregister)],
        }
    }

    /// A handle that owns no registration.
    pub fn empty() -> Self {
        Self {
            unregister: Vec::new(),
        }
    }

    /// Merges several registrations into a single handle.
    pub fn combine(refs: impl IntoIterator<Item = ListenerRef>) -> Self {
        let mut unregister = Vec::new();
        for mut listener_ref in refs {
            unregister.append(&mut listener_ref.unregister);
        }
        Self { unregister }
    }

    pub fn unregister(self) {}
}

impl Drop for ListenerRef {
    fn drop(&mut self) {
        for unregister in self.unregister.drain(..) {
            unregister();
        }
    }
}

impl fmt::Debug for ListenerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRef")
            .field("registrations", &self.unregister.len())
            .finish()
    }
}

/// Change listeners of one property. Notifications are coalesced: several `fire_eventually`
/// calls issued before the executor gets to them result in a single round of callbacks.
#[derive(Clone)]
pub(crate) struct ChangeListenerManager {
    listeners: ListenerManager<()>,
    dispatcher: UpdateTaskExecutor,
}

impl ChangeListenerManager {
    pub(crate) fn new(executor: &'static TaskExecutor) -> Self {
        Self {
            listeners: ListenerManager::new(),
            dispatcher: UpdateTaskExecutor::new(executor),
        }
    }

    pub(crate) fn register(&self, listener: ChangeListener) -> ListenerRef {
        self.listeners.register(move |_: &()| listener())
    }

    pub(crate) fn fire_eventually(&self) {
        if self.listeners.listener_count() == 0 {
            return;
        }
        let listeners = self.listeners.clone();
        self.dispatcher.execute(move || listeners.fire(&()));
    }
}
