use std::collections::HashMap;
use std::sync::{Arc, Mutex, TryLockError};

use hopscope_store::EdgeStore;
use tracing::info;

use crate::{CallTreeQuery, GraphAlgoError, GraphOptions};

type Slot = Arc<Mutex<Option<Arc<CallTreeQuery>>>>;

/// Built queries keyed by analysis unit.
///
/// Each unit has its own slot lock, so concurrent requests for the same
/// unit wait for a single build while other units proceed. Cached queries
/// are immutable apart from their lazily computed distance matrix.
#[derive(Debug, Default)]
pub struct DistanceCache {
    options: GraphOptions,
    slots: Mutex<HashMap<String, Slot>>,
}

impl DistanceCache {
    pub fn new(options: GraphOptions) -> Self {
        Self {
            options,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn options(&self) -> GraphOptions {
        self.options
    }

    /// Returns the cached query for `unit`, loading edges from `store` and
    /// building graph and distances on first use.
    pub fn get_or_build(
        &self,
        store: &dyn EdgeStore,
        unit: &str,
    ) -> Result<Arc<CallTreeQuery>, GraphAlgoError> {
        let slot = self.slot(unit)?;
        let mut entry = slot
            .lock()
            .map_err(|_| GraphAlgoError::LockPoisoned(format!("distance cache slot '{unit}'")))?;

        if let Some(query) = entry.as_ref() {
            return Ok(Arc::clone(query));
        }

        let edges = store.load_edges(unit)?;
        let query = CallTreeQuery::from_edges(&edges, self.options)?;
        query.distances();
        info!(
            unit,
            nodes = query.graph().node_count(),
            edge_records = edges.len(),
            "cached call graph distances"
        );

        let query = Arc::new(query);
        *entry = Some(Arc::clone(&query));
        Ok(query)
    }

    pub fn invalidate(&self, unit: &str) -> Result<bool, GraphAlgoError> {
        let mut slots = self.lock_slots()?;
        Ok(slots.remove(unit).is_some())
    }

    /// Number of units with a completed build. Units still building are
    /// not counted.
    pub fn len(&self) -> Result<usize, GraphAlgoError> {
        let slots: Vec<Slot> = self.lock_slots()?.values().cloned().collect();
        Ok(slots
            .iter()
            .filter(|slot| match slot.try_lock() {
                Ok(entry) => entry.is_some(),
                Err(TryLockError::WouldBlock | TryLockError::Poisoned(_)) => false,
            })
            .count())
    }

    pub fn is_empty(&self) -> Result<bool, GraphAlgoError> {
        Ok(self.len()? == 0)
    }

    fn slot(&self, unit: &str) -> Result<Slot, GraphAlgoError> {
        let mut slots = self.lock_slots()?;
        Ok(Arc::clone(slots.entry(unit.to_owned()).or_default()))
    }

    fn lock_slots(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<String, Slot>>, GraphAlgoError> {
        self.slots
            .lock()
            .map_err(|_| GraphAlgoError::LockPoisoned("distance cache".to_owned()))
    }
}
