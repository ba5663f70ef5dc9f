use std::sync::{Arc, RwLock};

/// A shared, replaceable value. Clones point at the same storage.
pub struct ValueCell<T>(Arc<RwLock<T>>);

/// A read-only view that shares storage with a `ValueCell<T>`
pub struct ReadValueCell<T>(Arc<RwLock<T>>);

impl<T> Clone for ValueCell<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> Clone for ReadValueCell<T> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<T> ValueCell<T> {
    pub fn new(value: T) -> Self { Self(Arc::new(RwLock::new(value))) }

    /// Replace the stored value, returning the previous one
    pub fn replace(&self, value: T) -> T {
        let mut current = self.0.write().unwrap();
        std::mem::replace(&mut *current, value)
    }

    pub fn set(&self, value: T) { self.replace(value); }

    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.0.read().unwrap();
        f(&*guard)
    }

    /// Create a read-only view of this value
    pub fn readvalue(&self) -> ReadValueCell<T> { ReadValueCell(self.0.clone()) }
}

impl<T: Clone> ValueCell<T> {
    pub fn value(&self) -> T { self.0.read().unwrap().clone() }
}

impl<T> ReadValueCell<T> {
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.0.read().unwrap();
        f(&*guard)
    }
}

impl<T: Clone> ReadValueCell<T> {
    pub fn value(&self) -> T { self.0.read().unwrap().clone() }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ValueCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result { self.with(|value| f.debug_tuple("ValueCell").field(value).finish()) }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ReadValueCell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.with(|value| f.debug_tuple("ReadValueCell").field(value).finish())
    }
}
