//! Scoped name → value mapping (§3.4).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::object::Value;

/// A single scope frame: its own bindings plus an optional link to the
/// enclosing scope. Lookup walks outward; writes land only in `store`.
pub struct Environment {
    store: HashMap<String, Value>,
    outer: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: None,
        }))
    }

    /// Top-level environment preseeded with `repopath` and `tickets` (§3.4).
    pub fn with_params(tickets: &str) -> Rc<RefCell<Environment>> {
        let env = Environment::new();
        env.borrow_mut().set("repopath", Value::string("."));
        env.borrow_mut().set("tickets", Value::string(tickets));
        env
    }

    pub fn enclosed(outer: Rc<RefCell<Environment>>) -> Rc<RefCell<Environment>> {
        Rc::new(RefCell::new(Environment {
            store: HashMap::new(),
            outer: Some(outer),
        }))
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.store.get(name) {
            return Some(v.clone());
        }
        self.outer.as_ref().and_then(|o| o.borrow().get(name))
    }

    pub fn set(&mut self, name: &str, value: Value) -> Value {
        self.store.insert(name.to_string(), value.clone());
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_shadows_outer_on_lookup() {
        let outer = Environment::new();
        outer.borrow_mut().set("x", Value::Integer(1));
        let inner = Environment::enclosed(outer.clone());
        inner.borrow_mut().set("x", Value::Integer(2));

        assert!(matches!(inner.borrow().get("x"), Some(Value::Integer(2))));
        assert!(matches!(outer.borrow().get("x"), Some(Value::Integer(1))));
    }

    #[test]
    fn lookup_walks_outward() {
        let outer = Environment::new();
        outer.borrow_mut().set("y", Value::Integer(9));
        let inner = Environment::enclosed(outer);

        assert!(matches!(inner.borrow().get("y"), Some(Value::Integer(9))));
        assert!(inner.borrow().get("z").is_none());
    }

    #[test]
    fn set_never_writes_through_to_outer() {
        let outer = Environment::new();
        let inner = Environment::enclosed(outer.clone());
        inner.borrow_mut().set("x", Value::Integer(1));
        assert!(outer.borrow().get("x").is_none());
    }

    #[test]
    fn preseeded_top_level_has_repopath_and_tickets() {
        let env = Environment::with_params("ABC,DEF");
        assert!(matches!(env.borrow().get("repopath"), Some(Value::Str(_))));
        let tickets = env.borrow().get("tickets").unwrap();
        assert_eq!(tickets.inspect(), "ABC,DEF");
    }
}
