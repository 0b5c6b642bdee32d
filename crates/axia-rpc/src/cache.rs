//! A small settable, invalidatable cache for values fetched once per client.

use std::future::Future;
use std::sync::{PoisonError, RwLock};

/// A lazily filled value. Readers get a clone; writers replace it.
#[derive(Debug)]
pub struct Memoized<T> {
    value: RwLock<Option<T>>,
}

impl<T> Default for Memoized<T> {
    fn default() -> Self {
        Self { value: RwLock::new(None) }
    }
}

impl<T: Clone> Memoized<T> {
    /// An empty cache.
    pub fn new() -> Self {
        Self { value: RwLock::new(None) }
    }

    /// The cached value, if any.
    pub fn get(&self) -> Option<T> {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the cached value.
    pub fn set(&self, value: T) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = Some(value);
    }

    /// Forget the cached value.
    pub fn invalidate(&self) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// The cached value, filling it from `init` when empty.
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> T {
        if let Some(v) = self.get() {
            return v;
        }
        let v = init();
        self.set(v.clone());
        v
    }

    /// Async variant of [`get_or_init`](Self::get_or_init). A failed `init`
    /// leaves the cache empty. The lock is not held across the await, so
    /// concurrent callers may both run `init`; the last write wins.
    pub async fn get_or_try_init<F, Fut, E>(&self, init: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(v) = self.get() {
            return Ok(v);
        }
        let v = init().await?;
        self.set(v.clone());
        Ok(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_invalidate() {
        let m = Memoized::new();
        assert_eq!(m.get(), None);
        assert_eq!(m.get_or_init(|| 7u64), 7);
        assert_eq!(m.get_or_init(|| 9u64), 7);
        m.set(3);
        assert_eq!(m.get(), Some(3));
        m.invalidate();
        assert_eq!(m.get(), None);
    }

    #[tokio::test]
    async fn test_failed_init_leaves_empty() {
        let m: Memoized<u32> = Memoized::new();
        let r: Result<u32, &str> = m.get_or_try_init(|| async { Err("boom") }).await;
        assert!(r.is_err());
        assert_eq!(m.get(), None);
        let r: Result<u32, &str> = m.get_or_try_init(|| async { Ok(5) }).await;
        assert_eq!(r, Ok(5));
        assert_eq!(m.get(), Some(5));
    }
}
