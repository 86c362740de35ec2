use std::collections::HashMap;

use crate::value::Value;

/// A name → value mapping: the run's globals or one invocation's locals.
#[derive(Debug, Default)]
pub struct Scope {
    values: HashMap<String, Value>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Local first, then global.
pub fn lookup<'a>(local: Option<&'a Scope>, globals: &'a Scope, name: &str) -> Option<&'a Value> {
    local
        .and_then(|scope| scope.get(name))
        .or_else(|| globals.get(name))
}

/// Binds into the local scope when one is active, otherwise into globals.
pub fn bind(local: Option<&mut Scope>, globals: &mut Scope, name: &str, value: Value) {
    match local {
        Some(scope) => scope.set(name, value),
        None => globals.set(name, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_shadows_global() {
        let mut globals = Scope::new();
        let mut local = Scope::new();
        globals.set("x", Value::Integer(1));
        local.set("x", Value::Integer(2));

        match lookup(Some(&local), &globals, "x") {
            Some(Value::Integer(n)) => assert_eq!(*n, 2),
            other => panic!("expected local 2, got {:?}", other),
        }
        match lookup(None, &globals, "x") {
            Some(Value::Integer(n)) => assert_eq!(*n, 1),
            other => panic!("expected global 1, got {:?}", other),
        }
        assert!(lookup(Some(&local), &globals, "y").is_none());
    }

    #[test]
    fn bind_prefers_the_active_local_scope() {
        let mut globals = Scope::new();
        let mut local = Scope::new();
        bind(Some(&mut local), &mut globals, "x", Value::Boolean(true));
        assert!(local.contains("x"));
        assert!(!globals.contains("x"));

        bind(None, &mut globals, "y", Value::Boolean(false));
        assert!(globals.contains("y"));
        assert_eq!((local.len(), globals.len()), (1, 1));
        assert!(!local.is_empty());
        assert!(Scope::new().is_empty());
    }
}
