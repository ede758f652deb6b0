use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::object::Object;

#[derive(Debug, Default)]
pub struct EnvironmentCore {
    store: FxHashMap<Rc<str>, Rc<Object>>,
    outer: Option<Environment>,
}

/// A scope of name bindings. Cloning yields another handle to the same
/// scope, which is how closures keep the scope they were created in alive.
///
/// A function stored in the scope it captured forms a reference cycle, so
/// that scope is never freed. Sessions are short lived and this is accepted.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    environment: Rc<RefCell<EnvironmentCore>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_enclosed(outer: &Environment) -> Environment {
        Environment {
            environment: Rc::new(RefCell::new(EnvironmentCore {
                store: FxHashMap::default(),
                outer: Some(outer.clone()),
            })),
        }
    }

    /// Looks `key` up in this scope, then in each enclosing scope in turn.
    pub fn get(&self, key: &str) -> Option<Rc<Object>> {
        let env = self.environment.borrow();
        match env.store.get(key) {
            Some(value) => Some(value.clone()),
            None => env.outer.as_ref().and_then(|outer| outer.get(key)),
        }
    }

    /// Binds `key` in this scope only, shadowing any outer binding.
    pub fn set(&mut self, key: Rc<str>, value: Rc<Object>) {
        self.environment.borrow_mut().store.insert(key, value);
    }

    pub fn ptr_eq(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.environment, &other.environment)
    }
}
