use std::sync::Arc;

use parking_lot::Mutex;

use super::Catalog;
use crate::model::{Listing, TitleId};

/// A catalog shared by every account of a session.
///
/// Mutations go through [`SharedCatalog::with`], which holds the lock for the
/// whole closure, so a stock check and the removal that depends on it can
/// never interleave with another caller.
#[derive(Debug, Clone, Default)]
pub struct SharedCatalog {
    inner: Arc<Mutex<Catalog>>,
}

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            inner: Arc::new(Mutex::new(catalog)),
        }
    }

    /// Run `f` with exclusive access to the catalog.
    pub fn with<R>(&self, f: impl FnOnce(&mut Catalog) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut *guard)
    }

    pub fn find_by_id(&self, id: TitleId) -> Option<Listing> {
        self.inner.lock().find_by_id(id).cloned()
    }

    /// Snapshot of the listings, in insertion order.
    pub fn snapshot(&self) -> Vec<Listing> {
        self.inner.lock().list().cloned().collect()
    }
}
