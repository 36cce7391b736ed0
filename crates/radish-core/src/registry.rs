//! Registry of task handlers (name -> task).
//!
//! Additive only: a name, once registered, keeps its handler for the lifetime
//! of the process. The lock is held for map access only, never while a task
//! runs, so registration is never stalled by slow handlers.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{ErrorCode, RadishError};
use crate::task::Task;

#[derive(Default)]
pub struct Registry {
    handlers: RwLock<HashMap<String, Arc<dyn Task>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task` under `task.name()`.
    ///
    /// Fails with `TaskAlreadyRegistered` if the name is taken; the existing
    /// handler stays in place.
    pub fn register(&self, task: Arc<dyn Task>) -> Result<(), RadishError> {
        let mut handlers = self
            .handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        match handlers.entry(task.name().to_string()) {
            Entry::Occupied(e) => Err(RadishError::new(
                ErrorCode::TaskAlreadyRegistered,
                format!("task named {:?} has already been registered", e.key()),
            )),
            Entry::Vacant(e) => {
                e.insert(task);
                Ok(())
            }
        }
    }

    pub fn handler(&self, name: &str) -> Result<Arc<dyn Task>, RadishError> {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
            .ok_or_else(|| RadishError::not_registered(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::CountingTask;

    #[test]
    fn register_and_lookup() {
        let registry = Registry::new();
        registry.register(CountingTask::arc("email")).unwrap();

        let handler = registry.handler("email").unwrap();
        assert_eq!(handler.name(), "email");
        assert!(registry.contains("email"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn double_registration_keeps_original() {
        let registry = Registry::new();
        let original = CountingTask::arc("email");
        registry.register(original.clone()).unwrap();

        let err = registry.register(CountingTask::arc("email")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::TaskAlreadyRegistered);
        assert_eq!(
            err.to_string(),
            "[2] task named \"email\" has already been registered"
        );
        assert_eq!(registry.len(), 1);

        let handler = registry.handler("email").unwrap();
        let original: Arc<dyn Task> = original;
        assert!(Arc::ptr_eq(&handler, &original));
    }

    #[test]
    fn missing_handler_is_not_registered() {
        let registry = Registry::new();
        let err = registry.handler("nope").err().unwrap();
        assert_eq!(err.code(), ErrorCode::TaskNotRegistered);
        assert_eq!(err.to_string(), "[3] unknown task \"nope\"");
        assert!(registry.is_empty());
    }

    #[test]
    fn names_are_sorted() {
        let registry = Registry::new();
        for name in ["medium", "chance", "short", "long"] {
            registry.register(CountingTask::arc(name)).unwrap();
        }
        assert_eq!(registry.names(), vec!["chance", "long", "medium", "short"]);
    }
}
