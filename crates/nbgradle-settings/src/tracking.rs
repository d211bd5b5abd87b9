use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::executor::{document_event_executor, event_executor, UpdateTaskExecutor};
use crate::listeners::{ChangeListener, ChangeListenerManager, ListenerRef};
use crate::path::relative_paths;
use crate::property::{MutableProperty, PropertyDef, PropertySource, PropertySourceProxy};
use crate::settings::{sub_config, ConfigUpdate, ProfileSettings};
use crate::{ConfigPath, ConfigTree};

struct TrackingState<K> {
    value_key: Arc<K>,
    /// Subtree the current value key was decoded from (or written to).
    config: ConfigTree,
    /// Settings revision `config` was read at.
    revision: u64,
    /// Sequence number of the latest `set_value`, and of the latest one written to the document.
    local_seq: u64,
    committed_seq: u64,
}

impl<K> TrackingState<K> {
    fn has_pending_write(&self) -> bool {
        self.local_seq != self.committed_seq
    }
}

struct PropertyInner<K, V> {
    settings: ProfileSettings,
    paths: Arc<[ConfigPath]>,
    parent: ConfigPath,
    relative_paths: Vec<ConfigPath>,
    def: PropertyDef<K, V>,
    state: Mutex<TrackingState<K>>,
    source: PropertySourceProxy<V>,
    value_updater: UpdateTaskExecutor,
    change_listeners: ChangeListenerManager,
    _source_subscription: ListenerRef,
}

/// A live view of one setting of a [`ProfileSettings`] document.
///
/// Reading decodes the stored subtree through the property's [`PropertyDef`]; writing updates the
/// value immediately and writes the encoded value back to the document asynchronously, keeping
/// only the latest of several quick successive writes.
pub struct DomTrackingProperty<K, V> {
    inner: Arc<PropertyInner<K, V>>,
}

impl<K, V> Clone for DomTrackingProperty<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> DomTrackingProperty<K, V>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    pub(crate) fn new(settings: ProfileSettings, paths: Arc<[ConfigPath]>, def: PropertyDef<K, V>) -> Self {
        let (parent, relative_paths) = relative_paths(&paths);

        let (config, revision) = {
            let guard = settings.lock_config();
            let config = sub_config(&guard.borrow(), &parent, &relative_paths);
            (config, settings.revision())
        };
        let value_key = Arc::new(def.encoding().decode(&config));
        let source = PropertySourceProxy::new(def.value_def().property(&value_key));

        let change_listeners = ChangeListenerManager::new(event_executor());
        let forward = change_listeners.clone();
        let source_subscription =
            source.add_change_listener(Arc::new(move || forward.fire_eventually()));

        Self {
            inner: Arc::new(PropertyInner {
                settings,
                paths,
                parent,
                relative_paths,
                def,
                state: Mutex::new(TrackingState {
                    value_key,
                    config,
                    revision,
                    local_seq: 0,
                    committed_seq: 0,
                }),
                source,
                value_updater: UpdateTaskExecutor::new(document_event_executor()),
                change_listeners,
                _source_subscription: source_subscription,
            }),
        }
    }

    pub fn paths(&self) -> &[ConfigPath] {
        &self.inner.paths
    }

    /// The value key the current value was derived from.
    pub fn value_key(&self) -> Arc<K> {
        self.inner.refresh_if_stale();
        Arc::clone(&self.inner.state.lock().value_key)
    }

    /// The current value.
    ///
    /// Normally served from the cached value source without locking the document. After the
    /// document changed since the last read (a load, or a commit of an overlapping property whose
    /// notification has not been delivered yet), the subtree is re-decoded first, which takes the
    /// settings lock.
    pub fn value(&self) -> V {
        self.inner.refresh_if_stale();
        self.inner.source.value()
    }

    pub fn set_value(&self, value: V) {
        let inner = &self.inner;
        let key = Arc::new(inner.def.value_def().key_from_value(&value));

        {
            let mut state = inner.state.lock();
            if !inner.update_source(&mut state, key) {
                return;
            }
            state.local_seq += 1;
        }

        let committing = Arc::clone(inner);
        inner.value_updater.execute(move || committing.commit());
    }

    /// Registers `listener` to be called (on the event-delivery worker) whenever the value of this
    /// property may have changed, whether through [`Self::set_value`] or through a change of the
    /// document made by a load or by another property.
    pub fn add_change_listener(&self, listener: ChangeListener) -> ListenerRef {
        let weak = Arc::downgrade(&self.inner);
        let update_ref = self
            .inner
            .settings
            .add_document_change_listener(move |update: &ConfigUpdate| {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                if Arc::ptr_eq(&update.paths, &inner.paths) {
                    return;
                }
                if update.affects(&inner.paths) {
                    inner.refresh();
                }
            });
        let change_ref = self.inner.change_listeners.register(listener);
        ListenerRef::combine([update_ref, change_ref])
    }
}

impl<K, V> PropertyInner<K, V>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn refresh_if_stale(&self) {
        let stale = self.state.lock().revision != self.settings.revision();
        if stale {
            self.refresh();
        }
    }

    /// Re-decodes the value from the document unless a local write has not been committed yet.
    fn refresh(&self) {
        let guard = self.settings.lock_config();
        let revision = self.settings.revision();
        let config = sub_config(&guard.borrow(), &self.parent, &self.relative_paths);

        let mut state = self.state.lock();
        drop(guard);
        if state.has_pending_write() {
            return;
        }
        state.revision = revision;
        if state.config == config {
            return;
        }
        let value_key = Arc::new(self.def.encoding().decode(&config));
        state.config = config;
        self.update_source(&mut state, value_key);
    }

    /// Swaps in the source for `value_key`. Returns `false` when the key equals the current one.
    fn update_source(&self, state: &mut TrackingState<K>, value_key: Arc<K>) -> bool {
        if self
            .def
            .value_key_equality()
            .equals(&state.value_key, &value_key)
        {
            return false;
        }
        let source = self.def.value_def().property(&value_key);
        state.value_key = value_key;
        self.source.replace_source(source);
        true
    }

    /// Writes the latest local value to the document. A commit always writes whatever
    /// `set_value` stored last, so commits scheduled out of order still leave the newest value in
    /// the document.
    fn commit(&self) {
        {
            let guard = self.settings.lock_config();
            let (seq, value_key) = {
                let state = self.state.lock();
                if !state.has_pending_write() {
                    return;
                }
                (state.local_seq, Arc::clone(&state.value_key))
            };

            let encoded = self.def.encoding().encode(&value_key);
            {
                let mut config = guard.borrow_mut();
                for relative in &self.relative_paths {
                    config.set_deep_child_tree(
                        &self.parent.join(relative),
                        encoded.deep_sub_tree(relative),
                    );
                }
            }
            let revision = self.settings.bump_revision();
            let written = sub_config(&guard.borrow(), &self.parent, &self.relative_paths);

            let mut state = self.state.lock();
            state.committed_seq = seq;
            if state.local_seq == seq {
                state.revision = revision;
                state.config = written;
            }
        }

        tracing::trace!(
            target: "nbgradle.settings",
            paths = ?self.paths,
            "committed property value"
        );
        self.settings.fire_update(ConfigUpdate {
            paths: Arc::clone(&self.paths),
        });
    }
}

impl<K, V> PropertySource<V> for DomTrackingProperty<K, V>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn value(&self) -> V {
        DomTrackingProperty::value(self)
    }

    fn add_change_listener(&self, listener: ChangeListener) -> ListenerRef {
        DomTrackingProperty::add_change_listener(self, listener)
    }
}

impl<K, V> MutableProperty<V> for DomTrackingProperty<K, V>
where
    K: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn set_value(&self, value: V) {
        DomTrackingProperty::set_value(self, value)
    }
}

impl<K, V> fmt::Debug for DomTrackingProperty<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomTrackingProperty")
            .field("paths", &self.inner.paths)
            .finish_non_exhaustive()
    }
}
