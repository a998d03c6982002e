//! The runtime value model: the closed set of values the evaluator produces.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::ast::{BlockStatement, Identifier};
use crate::environment::Environment;
use crate::vcs::{Repo, Tag};

/// A builtin's native implementation: takes the fully assembled argument
/// vector (including any environment-injected binding) and returns a value.
pub type BuiltinFn = fn(&[Value]) -> Value;

/// A native function registered in the builtin registry (§C8).
#[derive(Clone)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
    pub requires_env_binding: bool,
    pub binding_name: &'static str,
}

/// A user-defined closure: parameters, body, and the environment captured
/// at its definition site.
#[derive(Clone)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Rc<RefCell<Environment>>,
}

/// The kind tag half of a [`HashKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HashKeyKind {
    Integer,
    Boolean,
    String,
}

/// A hashable key: which kind produced it plus its 64-bit hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: HashKeyKind,
    pub value: u64,
}

fn fnv1a64(bytes: &[u8]) -> u64 {
    const OFFSET: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;
    let mut hash = OFFSET;
    for b in bytes {
        hash ^= *b as u64;
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

/// The closed set of runtime values (§3.3).
#[derive(Clone)]
pub enum Value {
    Integer(i64),
    Boolean(bool),
    Str(Rc<str>),
    Null,
    Array(Rc<Vec<Value>>),
    Hash(Rc<IndexMap<HashKey, (Value, Value)>>),
    Function(Rc<Function>),
    Builtin(Rc<Builtin>),
    /// Internal: wraps the value carried by a `return`, unwrapped before it
    /// can reach anything user-observable.
    ReturnValue(Box<Value>),
    /// Internal: a viral evaluation failure, never stored in a collection.
    Error(String),
    Repo(Rc<RefCell<Repo>>),
    Tag(Rc<Tag>),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Boolean(_) => "BOOLEAN",
            Value::Str(_) => "STRING",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Function(_) => "FUNCTION",
            Value::Builtin(_) => "BUILTIN",
            Value::ReturnValue(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
            Value::Repo(_) => "REPO",
            Value::Tag(_) => "TAG",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    pub fn string(s: impl Into<Rc<str>>) -> Value {
        Value::Str(s.into())
    }

    pub fn error(msg: impl Into<String>) -> Value {
        Value::Error(msg.into())
    }

    /// Returns the message carried by an `Error` value, if this is one.
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Value::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Truthiness per §4.3: only `Null` and `false` are falsy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Boolean(false))
    }

    /// Returns the value's [`HashKey`], or `None` if it isn't hashable.
    pub fn hash_key(&self) -> Option<HashKey> {
        match self {
            Value::Integer(i) => Some(HashKey {
                kind: HashKeyKind::Integer,
                value: *i as u64,
            }),
            Value::Boolean(b) => Some(HashKey {
                kind: HashKeyKind::Boolean,
                value: if *b { 1 } else { 0 },
            }),
            Value::Str(s) => Some(HashKey {
                kind: HashKeyKind::String,
                value: fnv1a64(s.as_bytes()),
            }),
            _ => None,
        }
    }

    /// Renders the value the way the REPL and `print` builtin do (§6.2).
    pub fn inspect(&self) -> String {
        match self {
            Value::Integer(i) => i.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Str(s) => s.to_string(),
            Value::Null => "null".to_string(),
            Value::Array(elements) => {
                let rendered: Vec<String> = elements.iter().map(|e| e.inspect()).collect();
                format!("[{}]", rendered.join(", "))
            }
            Value::Hash(pairs) => {
                let rendered: Vec<String> = pairs
                    .values()
                    .map(|(k, v)| format!("{}: {}", k.inspect(), v.inspect()))
                    .collect();
                format!("{{{}}}", rendered.join(", "))
            }
            Value::Function(f) => {
                let params: Vec<String> = f.parameters.iter().map(|p| p.name.clone()).collect();
                format!("fn({}) {{\n{}\n}}", params.join(", "), f.body)
            }
            Value::Builtin(_) => "builtin function".to_string(),
            Value::ReturnValue(inner) => inner.inspect(),
            Value::Error(msg) => format!("ERROR: {}", msg),
            Value::Repo(repo) => repo.borrow().path.clone(),
            Value::Tag(tag) => tag.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_hash_key_is_stable() {
        let a = Value::Integer(5).hash_key().unwrap();
        let b = Value::Integer(5).hash_key().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn string_hash_key_matches_fnv1a() {
        let key = Value::string("hello").hash_key().unwrap();
        assert_eq!(key.kind, HashKeyKind::String);
        assert_eq!(key.value, fnv1a64(b"hello"));
    }

    #[test]
    fn function_is_not_hashable() {
        assert!(Value::Null.hash_key().is_none());
    }

    #[test]
    fn truthiness_rules() {
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::string("").is_truthy());
        assert!(Value::Array(Rc::new(vec![])).is_truthy());
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
    }

    #[test]
    fn inspect_formats() {
        assert_eq!(Value::Integer(5).inspect(), "5");
        assert_eq!(Value::Boolean(true).inspect(), "true");
        assert_eq!(Value::Null.inspect(), "null");
        assert_eq!(Value::error("boom").inspect(), "ERROR: boom");
        let arr = Value::Array(Rc::new(vec![Value::Integer(1), Value::Integer(2)]));
        assert_eq!(arr.inspect(), "[1, 2]");
    }
}
