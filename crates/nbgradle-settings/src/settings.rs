use std::cell::RefCell;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{ReentrantMutex, ReentrantMutexGuard};

use crate::executor::document_event_executor;
use crate::listeners::{ListenerManager, ListenerRef};
use crate::tracking::DomTrackingProperty;
use crate::xml::{parse_xml, write_xml, PROFILE_ROOT_ELEMENT};
use crate::{ConfigPath, ConfigTree, ConfigTreeBuilder, PropertyDef, Result, SettingsError};

/// Paths touched by one change of a [`ProfileSettings`] document.
///
/// Loading a document reports the root path. A property commit reports exactly the paths of the
/// committing property, sharing the property's own path list.
#[derive(Clone, Debug)]
pub struct ConfigUpdate {
    pub(crate) paths: Arc<[ConfigPath]>,
}

impl ConfigUpdate {
    pub(crate) fn root() -> Self {
        Self {
            paths: Arc::from(vec![ConfigPath::root()]),
        }
    }

    pub fn paths(&self) -> &[ConfigPath] {
        &self.paths
    }

    pub fn is_root_change(&self) -> bool {
        self.paths.iter().any(ConfigPath::is_root)
    }

    /// Whether any changed path is an ancestor, descendant or equal of any of `paths`.
    pub fn affects(&self, paths: &[ConfigPath]) -> bool {
        self.paths
            .iter()
            .any(|changed| paths.iter().any(|path| changed.overlaps(path)))
    }
}

pub(crate) type ConfigLock = ReentrantMutex<RefCell<ConfigTreeBuilder>>;

struct SettingsInner {
    config: ConfigLock,
    revision: AtomicU64,
    update_listeners: ListenerManager<ConfigUpdate>,
}

/// The in-memory state of one profile document (`.nb-gradle-properties` style XML).
///
/// All reads and writes of the document go through a single lock; change notifications are
/// always posted to the document-event worker after the lock is released.
#[derive(Clone)]
pub struct ProfileSettings {
    inner: Arc<SettingsInner>,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl ProfileSettings {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SettingsInner {
                config: ReentrantMutex::new(RefCell::new(ConfigTreeBuilder::new())),
                revision: AtomicU64::new(0),
                update_listeners: ListenerManager::new(),
            }),
        }
    }

    /// Whether the caller runs on the worker delivering document change events.
    pub fn is_event_thread() -> bool {
        document_event_executor().is_worker_thread()
    }

    /// Replaces the whole document with the content of `path`. A file that does not exist loads
    /// as an empty document. Failures are logged and leave the current document untouched.
    pub fn load_from_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        match read_document(path) {
            Ok(config) => self.replace_config(config),
            Err(err) => {
                tracing::info!(
                    target: "nbgradle.settings",
                    path = %path.display(),
                    error = %err,
                    "unable to parse XML config file"
                );
            }
        }
    }

    /// Like [`Self::load_from_file`], reading the document from `reader`.
    pub fn load_from_stream(&self, mut reader: impl Read) {
        let mut text = String::new();
        let parsed = reader
            .read_to_string(&mut text)
            .map_err(|source| SettingsError::Io {
                path: "<stream>".to_string(),
                source,
            })
            .and_then(|_| parse_xml(&text));

        match parsed {
            Ok(config) => self.replace_config(config),
            Err(err) => {
                tracing::info!(
                    target: "nbgradle.settings",
                    error = %err,
                    "unable to parse XML config from stream"
                );
            }
        }
    }

    /// Writes the current document to `path`, creating missing parent directories.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = write_xml(&self.current_config(), PROFILE_ROOT_ELEMENT)?;

        let io_error = |source: io::Error| SettingsError::Io {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, text).map_err(io_error)?;

        tracing::debug!(target: "nbgradle.settings", path = %path.display(), "saved profile");
        Ok(())
    }

    /// Snapshot of the whole document.
    pub fn current_config(&self) -> ConfigTree {
        let config = self.lock_config();
        let snapshot = config.borrow().create();
        snapshot
    }

    /// Live property stored at `path`.
    pub fn get_property<K, V>(&self, path: ConfigPath, def: &PropertyDef<K, V>) -> DomTrackingProperty<K, V>
    where
        K: Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        DomTrackingProperty::new(self.clone(), Arc::from(vec![path]), def.clone())
    }

    /// Live property spanning several paths. The property decodes (and encodes) the subtree of the
    /// paths' common parent restricted to the given paths.
    pub fn get_property_for_paths<K, V>(
        &self,
        paths: Vec<ConfigPath>,
        def: &PropertyDef<K, V>,
    ) -> Result<DomTrackingProperty<K, V>>
    where
        K: Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        if paths.is_empty() {
            return Err(SettingsError::EmptyPathList);
        }
        Ok(DomTrackingProperty::new(self.clone(), Arc::from(paths), def.clone()))
    }

    /// Registers a listener invoked on the document-event worker after every load and every
    /// property commit.
    pub fn add_document_change_listener(
        &self,
        listener: impl Fn(&ConfigUpdate) + Send + Sync + 'static,
    ) -> ListenerRef {
        self.inner.update_listeners.register(listener)
    }

    pub(crate) fn lock_config(&self) -> ReentrantMutexGuard<'_, RefCell<ConfigTreeBuilder>> {
        self.inner.config.lock()
    }

    /// Number of document changes so far. Only changes under the config lock.
    pub(crate) fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::Acquire)
    }

    /// Must be called while holding the config lock.
    pub(crate) fn bump_revision(&self) -> u64 {
        self.inner.revision.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub(crate) fn fire_update(&self, update: ConfigUpdate) {
        let listeners = self.inner.update_listeners.clone();
        document_event_executor().execute(move || listeners.fire(&update));
    }

    fn replace_config(&self, mut config: ConfigTreeBuilder) {
        config.detach_sub_tree_builders();
        {
            let guard = self.lock_config();
            *guard.borrow_mut() = config;
            self.bump_revision();
        }
        self.fire_update(ConfigUpdate::root());
    }
}

impl std::fmt::Debug for ProfileSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileSettings")
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}

fn read_document(path: &Path) -> Result<ConfigTreeBuilder> {
    match fs::read_to_string(path) {
        Ok(text) => parse_xml(&text),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(ConfigTreeBuilder::new()),
        Err(source) => Err(SettingsError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Extracts the part of `config` a property stored at `base`/`relative_paths` depends on, rooted
/// at `base`.
pub(crate) fn sub_config(
    config: &ConfigTreeBuilder,
    base: &ConfigPath,
    relative_paths: &[ConfigPath],
) -> ConfigTree {
    if let [relative] = relative_paths {
        if relative.is_root() {
            return config.deep_sub_tree(base);
        }
    }

    let mut result = ConfigTreeBuilder::new();
    for relative in relative_paths {
        result.set_deep_child_tree(relative, config.deep_sub_tree(&base.join(relative)));
    }
    result.create()
}
