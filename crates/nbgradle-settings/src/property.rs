//! Codecs binding typed property values to configuration subtrees.
//!
//! A property is described by a [`PropertyDef`]: the *key encoding* converts between the stored
//! subtree and a "value key" (the raw decoded shape of the setting), the *value def* turns a value
//! key into a live [`PropertySource`] and back, and the [`ValueKeyEquality`] decides whether a
//! newly decoded or assigned key is a change at all.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::listeners::{ChangeListener, ListenerManager, ListenerRef};
use crate::ConfigTree;

/// Observable value.
pub trait PropertySource<V>: Send + Sync {
    fn value(&self) -> V;

    fn add_change_listener(&self, listener: ChangeListener) -> ListenerRef;
}

/// A read/write property exposed to settings consumers.
pub trait MutableProperty<V>: PropertySource<V> {
    fn set_value(&self, value: V);
}

struct ConstSource<V> {
    value: V,
}

impl<V: Clone + Send + Sync> PropertySource<V> for ConstSource<V> {
    fn value(&self) -> V {
        self.value.clone()
    }

    fn add_change_listener(&self, _listener: ChangeListener) -> ListenerRef {
        ListenerRef::empty()
    }
}

/// A source whose value never changes.
pub fn const_source<V>(value: V) -> Arc<dyn PropertySource<V>>
where
    V: Clone + Send + Sync + 'static,
{
    Arc::new(ConstSource { value })
}

/// Converts between the subtree stored at a property's location and its value key.
pub trait PropertyKeyEncodingDef<K>: Send + Sync {
    /// Decodes the subtree rooted at the property's common parent path. Missing data shows up as
    /// an empty tree and must decode to the "unset" key.
    fn decode(&self, tree: &ConfigTree) -> K;

    fn encode(&self, key: &K) -> ConfigTree;
}

/// Converts between value keys and the values exposed to consumers.
pub trait PropertyValueDef<K, V>: Send + Sync {
    fn property(&self, key: &K) -> Arc<dyn PropertySource<V>>;

    fn key_from_value(&self, value: &V) -> K;
}

/// Policy deciding whether two value keys denote the same setting.
pub enum ValueKeyEquality<K> {
    /// Keys are equal only if they are the very same allocation.
    Reference,
    Custom(Arc<dyn Fn(&K, &K) -> bool + Send + Sync>),
}

impl<K: PartialEq + 'static> ValueKeyEquality<K> {
    pub fn natural() -> Self {
        ValueKeyEquality::Custom(Arc::new(|a: &K, b: &K| a == b))
    }
}

impl<K> ValueKeyEquality<K> {
    pub fn custom(eq: impl Fn(&K, &K) -> bool + Send + Sync + 'static) -> Self {
        ValueKeyEquality::Custom(Arc::new(eq))
    }

    pub fn equals(&self, a: &Arc<K>, b: &Arc<K>) -> bool {
        match self {
            ValueKeyEquality::Reference => Arc::ptr_eq(a, b),
            ValueKeyEquality::Custom(eq) => Arc::ptr_eq(a, b) || eq(a, b),
        }
    }
}

impl<K> Clone for ValueKeyEquality<K> {
    fn clone(&self) -> Self {
        match self {
            ValueKeyEquality::Reference => ValueKeyEquality::Reference,
            ValueKeyEquality::Custom(eq) => ValueKeyEquality::Custom(Arc::clone(eq)),
        }
    }
}

impl<K> fmt::Debug for ValueKeyEquality<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueKeyEquality::Reference => f.write_str("Reference"),
            ValueKeyEquality::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Immutable description of one logical setting; created once and shared by every profile.
pub struct PropertyDef<K, V> {
    encoding: Arc<dyn PropertyKeyEncodingDef<K>>,
    value_def: Arc<dyn PropertyValueDef<K, V>>,
    equality: ValueKeyEquality<K>,
}

impl<K: PartialEq + 'static, V> PropertyDef<K, V> {
    pub fn new(
        encoding: Arc<dyn PropertyKeyEncodingDef<K>>,
        value_def: Arc<dyn PropertyValueDef<K, V>>,
    ) -> Self {
        Self {
            encoding,
            value_def,
            equality: ValueKeyEquality::natural(),
        }
    }
}

impl<K, V> PropertyDef<K, V> {
    pub fn with_equality(
        encoding: Arc<dyn PropertyKeyEncodingDef<K>>,
        value_def: Arc<dyn PropertyValueDef<K, V>>,
        equality: ValueKeyEquality<K>,
    ) -> Self {
        Self {
            encoding,
            value_def,
            equality,
        }
    }

    pub fn with_value_key_equality(mut self, equality: ValueKeyEquality<K>) -> Self {
        self.equality = equality;
        self
    }

    pub fn encoding(&self) -> &dyn PropertyKeyEncodingDef<K> {
        &*self.encoding
    }

    pub fn value_def(&self) -> &dyn PropertyValueDef<K, V> {
        &*self.value_def
    }

    pub fn value_key_equality(&self) -> &ValueKeyEquality<K> {
        &self.equality
    }
}

impl<K, V> Clone for PropertyDef<K, V> {
    fn clone(&self) -> Self {
        Self {
            encoding: Arc::clone(&self.encoding),
            value_def: Arc::clone(&self.value_def),
            equality: self.equality.clone(),
        }
    }
}

impl<K, V> fmt::Debug for PropertyDef<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropertyDef")
            .field("equality", &self.equality)
            .finish_non_exhaustive()
    }
}

struct ProxyTarget<V> {
    source: Arc<dyn PropertySource<V>>,
    _subscription: ListenerRef,
}

/// A source that forwards to a replaceable delegate. Replacing the delegate notifies listeners,
/// and so does every change reported by the current delegate.
pub(crate) struct PropertySourceProxy<V> {
    target: RwLock<ProxyTarget<V>>,
    listeners: ListenerManager<()>,
}

impl<V: 'static> PropertySourceProxy<V> {
    pub(crate) fn new(source: Arc<dyn PropertySource<V>>) -> Self {
        let listeners = ListenerManager::new();
        let target = Self::subscribe(&listeners, source);
        Self {
            target: RwLock::new(target),
            listeners,
        }
    }

    fn subscribe(listeners: &ListenerManager<()>, source: Arc<dyn PropertySource<V>>) -> ProxyTarget<V> {
        let forward = listeners.clone();
        let subscription = source.add_change_listener(Arc::new(move || forward.fire(&())));
        ProxyTarget {
            source,
            _subscription: subscription,
        }
    }

    pub(crate) fn value(&self) -> V {
        let source = Arc::clone(&self.target.read().source);
        source.value()
    }

    pub(crate) fn replace_source(&self, source: Arc<dyn PropertySource<V>>) {
        let target = Self::subscribe(&self.listeners, source);
        let previous = std::mem::replace(&mut *self.target.write(), target);
        drop(previous);
        self.listeners.fire(&());
    }

    pub(crate) fn add_change_listener(&self, listener: ChangeListener) -> ListenerRef {
        self.listeners.register(move |_: &()| listener())
    }
}
