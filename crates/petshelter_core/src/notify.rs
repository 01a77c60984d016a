//! Change notification for pet resources.
//!
//! # Responsibility
//! - Keep a registry of observers interested in resource paths.
//! - Fan out change signals after successful mutations.
//!
//! # Invariants
//! - Observers are called without holding the registry lock, so they may
//!   re-query or (un)register from inside `on_change`.
//! - Only the changed path is delivered; observers re-fetch data themselves.

use crate::uri::ResourcePath;
use log::debug;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

/// Receives change signals for a resource path.
pub trait ChangeObserver: Send + Sync {
    fn on_change(&self, path: &ResourcePath);
}

impl<F> ChangeObserver for F
where
    F: Fn(&ResourcePath) + Send + Sync,
{
    fn on_change(&self, path: &ResourcePath) {
        self(path)
    }
}

/// Registration handle returned by [`ChangeNotifier::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObserverId(u64);

struct Registration {
    path: ResourcePath,
    notify_for_descendants: bool,
    observer: Arc<dyn ChangeObserver>,
}

impl Registration {
    fn wants(&self, changed: &ResourcePath) -> bool {
        self.path == *changed
            || changed.is_ancestor_of(&self.path)
            || (self.notify_for_descendants && self.path.is_ancestor_of(changed))
    }
}

/// Observer registry shared by repository instances.
#[derive(Default)]
pub struct ChangeNotifier {
    next_id: AtomicU64,
    observers: Mutex<BTreeMap<ObserverId, Registration>>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer for `path`.
    ///
    /// An observer always hears about changes to its own path and to any
    /// ancestor of it. With `notify_for_descendants`, changes below its path
    /// are delivered too.
    pub fn register(
        &self,
        path: ResourcePath,
        notify_for_descendants: bool,
        observer: Arc<dyn ChangeObserver>,
    ) -> ObserverId {
        let id = ObserverId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.registry().insert(
            id,
            Registration {
                path,
                notify_for_descendants,
                observer,
            },
        );
        id
    }

    /// Removes an observer; returns `false` when it was not registered.
    pub fn unregister(&self, id: ObserverId) -> bool {
        self.registry().remove(&id).is_some()
    }

    pub fn observer_count(&self) -> usize {
        self.registry().len()
    }

    /// Signals every interested observer that `path` changed.
    ///
    /// Returns the number of observers notified.
    pub fn notify_change(&self, path: &ResourcePath) -> usize {
        let targets: Vec<Arc<dyn ChangeObserver>> = self
            .registry()
            .values()
            .filter(|registration| registration.wants(path))
            .map(|registration| Arc::clone(&registration.observer))
            .collect();

        for observer in &targets {
            observer.on_change(path);
        }
        debug!(
            "event=change_notify module=notify status=ok path={} observers={}",
            path,
            targets.len()
        );
        targets.len()
    }

    fn registry(&self) -> std::sync::MutexGuard<'_, BTreeMap<ObserverId, Registration>> {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
