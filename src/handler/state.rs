use rustc_hash::FxHashMap;
use std::{any::Any, fmt, marker::PhantomData};

/// A well-known state key bound to the type stored under it.
///
/// Reading through a `StateKey<T>` can only ever yield a `T`, so producers and
/// consumers of a value agree on its shape at compile time.
pub struct StateKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> StateKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for StateKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateKey").field(&self.name).finish()
    }
}

/// Per-request key/value bag shared by middleware and the terminal handler.
///
/// Lives inside one [`Context`](super::Context) and is dropped with it.
#[derive(Default)]
pub struct State {
    entries: FxHashMap<String, Box<dyn Any + Send + Sync>>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.entries.insert(key.into(), Box::new(value));
    }

    /// Returns the value under `key` if present and of type `T`.
    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.entries
            .get(key)
            .and_then(|value| (**value).downcast_ref::<T>())
    }

    pub fn get_mut<T: Any>(&mut self, key: &str) -> Option<&mut T> {
        self.entries
            .get_mut(key)
            .and_then(|value| (**value).downcast_mut::<T>())
    }

    pub fn typed<T: Any>(&self, key: &StateKey<T>) -> Option<&T> {
        self.get(key.name())
    }

    pub fn set_typed<T: Any + Send + Sync>(&mut self, key: &StateKey<T>, value: T) {
        self.set(key.name(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.entries.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNTER: StateKey<u32> = StateKey::new("counter");

    #[test]
    fn test_get_returns_value_of_matching_type() {
        let mut state = State::new();
        state.set("user", String::from("alice"));

        assert_eq!(state.get::<String>("user").map(String::as_str), Some("alice"));
        assert!(state.get::<u32>("user").is_none());
        assert!(state.get::<String>("missing").is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let mut state = State::new();
        state.set("user", String::from("alice"));
        state.set("user", String::from("bob"));

        assert_eq!(state.len(), 1);
        assert_eq!(state.get::<String>("user").map(String::as_str), Some("bob"));
    }

    #[test]
    fn test_typed_keys() {
        let mut state = State::new();
        state.set_typed(&COUNTER, 3);

        if let Some(counter) = state.get_mut::<u32>(COUNTER.name()) {
            *counter += 1;
        }

        assert_eq!(state.typed(&COUNTER), Some(&4));
        assert!(state.remove("counter"));
        assert!(state.is_empty());
    }
}
