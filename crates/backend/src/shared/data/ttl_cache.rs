use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

struct Entry<T> {
    value: Arc<T>,
    loaded_at: Instant,
}

/// Один закешированный объект с временем жизни
///
/// Значение перечитывается, когда истек TTL или после `invalidate()`.
pub struct TtlCache<T> {
    ttl: Duration,
    slot: RwLock<Option<Entry<T>>>,
}

impl<T> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: RwLock::new(None),
        }
    }

    fn fresh(&self) -> Option<Arc<T>> {
        let slot = self.slot.read().unwrap_or_else(|e| e.into_inner());
        slot.as_ref()
            .filter(|entry| entry.loaded_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Вернуть закешированное значение или загрузить его через `load`.
    /// Ошибка загрузки не затирает прежнее значение.
    pub fn get_or_load<E, F>(&self, load: F) -> Result<Arc<T>, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        if let Some(value) = self.fresh() {
            return Ok(value);
        }

        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        // another request may have reloaded while we waited for the lock
        if let Some(entry) = slot.as_ref() {
            if entry.loaded_at.elapsed() < self.ttl {
                return Ok(Arc::clone(&entry.value));
            }
        }
        let value = Arc::new(load()?);
        *slot = Some(Entry {
            value: Arc::clone(&value),
            loaded_at: Instant::now(),
        });
        Ok(value)
    }

    pub fn invalidate(&self) {
        let mut slot = self.slot.write().unwrap_or_else(|e| e.into_inner());
        *slot = None;
    }
}
