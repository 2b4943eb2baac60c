use super::ViewSet;
use std::sync::{Arc, PoisonError, RwLock};

/// Process-wide holder of the active [`ViewSet`].
///
/// Requests render from the snapshot taken when they were dispatched; a
/// reload swaps in a whole new set, never mutating one in place.
#[derive(Debug, Default)]
pub struct ViewStore {
    current: RwLock<Arc<ViewSet>>,
}

impl ViewStore {
    pub fn new(views: ViewSet) -> Self {
        Self {
            current: RwLock::new(Arc::new(views)),
        }
    }

    pub fn snapshot(&self) -> Arc<ViewSet> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&current)
    }

    /// Installs `views` and returns the set it replaced.
    pub fn replace(&self, views: ViewSet) -> Arc<ViewSet> {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *current, Arc::new(views))
    }
}
