//! The built-in registry (§4.4): core language intrinsics plus the domain
//! built-ins that bridge the evaluator to the VCS collaborator.

use std::cell::RefCell;
use std::rc::Rc;

use crate::object::{Builtin, Value};
use crate::vcs::{self, Repo};

/// Looks up a builtin by name. Consulted only after environment lookup misses.
pub fn lookup(name: &str) -> Option<Builtin> {
    CORE
        .iter()
        .chain(DOMAIN.iter())
        .find(|b| b.name == name)
        .cloned()
}

fn wrong_arity(got: usize, want: usize) -> Value {
    Value::error(format!("wrong number of arguments. got={}, want={}", got, want))
}

const CORE: &[Builtin] = &[
    Builtin {
        name: "len",
        func: len,
        requires_env_binding: false,
        binding_name: "",
    },
    Builtin {
        name: "first",
        func: first,
        requires_env_binding: false,
        binding_name: "",
    },
    Builtin {
        name: "last",
        func: last,
        requires_env_binding: false,
        binding_name: "",
    },
    Builtin {
        name: "rest",
        func: rest,
        requires_env_binding: false,
        binding_name: "",
    },
    Builtin {
        name: "push",
        func: push,
        requires_env_binding: false,
        binding_name: "",
    },
    Builtin {
        name: "print",
        func: print_fn,
        requires_env_binding: false,
        binding_name: "",
    },
];

const DOMAIN: &[Builtin] = &[
    Builtin {
        name: "whichRepo",
        func: which_repo,
        requires_env_binding: true,
        binding_name: "repopath",
    },
    Builtin {
        name: "initRepo",
        func: init_repo,
        requires_env_binding: true,
        binding_name: "repopath",
    },
    Builtin {
        name: "extractTags",
        func: extract_tags,
        requires_env_binding: false,
        binding_name: "",
    },
    Builtin {
        name: "getTag",
        func: get_tag,
        requires_env_binding: false,
        binding_name: "",
    },
    Builtin {
        name: "getLatestTag",
        func: get_latest_tag,
        requires_env_binding: false,
        binding_name: "",
    },
    Builtin {
        name: "diff",
        func: diff,
        requires_env_binding: true,
        binding_name: "tickets",
    },
];

fn len(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elements) => Value::Integer(elements.len() as i64),
        Value::Str(s) => Value::Integer(s.len() as i64),
        other => Value::error(format!("argument to `len` not supported, got {}", other.kind())),
    }
}

fn first(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elements) => elements.first().cloned().unwrap_or(Value::Null),
        other => Value::error(format!("argument to `first` must be ARRAY, got {}", other.kind())),
    }
}

fn last(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elements) => elements.last().cloned().unwrap_or(Value::Null),
        other => Value::error(format!("argument to `last` must be ARRAY, got {}", other.kind())),
    }
}

fn rest(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Value::Array(elements) => {
            if elements.is_empty() {
                Value::Null
            } else {
                Value::Array(Rc::new(elements[1..].to_vec()))
            }
        }
        other => Value::error(format!("argument to `rest` must be ARRAY, got {}", other.kind())),
    }
}

fn push(args: &[Value]) -> Value {
    if args.len() != 2 {
        return wrong_arity(args.len(), 2);
    }
    match &args[0] {
        Value::Array(elements) => {
            let mut new_elements = (**elements).clone();
            new_elements.push(args[1].clone());
            Value::Array(Rc::new(new_elements))
        }
        other => Value::error(format!("argument to `push` must be ARRAY, got {}", other.kind())),
    }
}

fn print_fn(args: &[Value]) -> Value {
    if args.is_empty() {
        return wrong_arity(0, 1);
    }
    for arg in args {
        println!("{}", arg.inspect());
    }
    Value::Null
}

fn which_repo(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len().saturating_sub(1), 0);
    }
    match &args[0] {
        Value::Str(s) => Value::string(s.as_ref()),
        other => Value::error(format!(
            "argument to `whichRepo` must be STRING, got {}",
            other.kind()
        )),
    }
}

fn init_repo(args: &[Value]) -> Value {
    if args.len() != 1 {
        return wrong_arity(args.len().saturating_sub(1), 0);
    }
    let path = match &args[0] {
        Value::Str(s) => s.to_string(),
        other => {
            return Value::error(format!(
                "argument to `initRepo` must be STRING, got {}",
                other.kind()
            ))
        }
    };
    match Repo::open(&path) {
        Ok(repo) => Value::Repo(Rc::new(RefCell::new(repo))),
        Err(err) => Value::error(err.to_string()),
    }
}

fn extract_tags(args: &[Value]) -> Value {
    if args.len() != 2 {
        return wrong_arity(args.len(), 2);
    }
    let repo = match &args[0] {
        Value::Repo(repo) => repo,
        other => {
            return Value::error(format!(
                "argument to `extractTags` must be REPO, got {}",
                other.kind()
            ))
        }
    };
    let pattern = match &args[1] {
        Value::Str(s) => s,
        other => {
            return Value::error(format!(
                "argument to `extractTags` must be STRING, got {}",
                other.kind()
            ))
        }
    };
    match repo.borrow_mut().extract_tags(pattern) {
        Ok(()) => Value::Null,
        Err(err) => Value::error(err.to_string()),
    }
}

fn get_tag(args: &[Value]) -> Value {
    if args.len() != 2 {
        return wrong_arity(args.len(), 2);
    }
    let repo = match &args[0] {
        Value::Repo(repo) => repo,
        other => {
            return Value::error(format!("argument to `getTag` must be REPO, got {}", other.kind()))
        }
    };
    let name = match &args[1] {
        Value::Str(s) => s,
        other => {
            return Value::error(format!(
                "argument to `getTag` must be STRING, got {}",
                other.kind()
            ))
        }
    };
    match repo.borrow().get_tag(name) {
        Some(tag) => Value::Tag(Rc::new(tag)),
        None => Value::Null,
    }
}

fn get_latest_tag(args: &[Value]) -> Value {
    if args.len() != 2 {
        return wrong_arity(args.len(), 2);
    }
    let repo = match &args[0] {
        Value::Repo(repo) => repo,
        other => {
            return Value::error(format!(
                "argument to `getLatestTag` must be REPO, got {}",
                other.kind()
            ))
        }
    };
    let offset = match &args[1] {
        Value::Integer(i) if *i >= 0 => *i as usize,
        other => {
            return Value::error(format!(
                "argument to `getLatestTag` must be a non-negative INTEGER, got {}",
                other.kind()
            ))
        }
    };
    match repo.borrow().get_latest_tag(offset) {
        Some(tag) => Value::Tag(Rc::new(tag)),
        None => Value::Null,
    }
}

fn diff(args: &[Value]) -> Value {
    if args.len() != 4 {
        return wrong_arity(args.len().saturating_sub(1), 3);
    }
    let ticket_spec = match &args[0] {
        Value::Str(s) => s,
        other => {
            return Value::error(format!(
                "argument to `diff` must be STRING, got {}",
                other.kind()
            ))
        }
    };
    let repo = match &args[1] {
        Value::Repo(repo) => repo,
        other => {
            return Value::error(format!("argument to `diff` must be REPO, got {}", other.kind()))
        }
    };
    let from = match &args[2] {
        Value::Tag(tag) => tag,
        other => {
            return Value::error(format!(
                "argument to `diff` ('from') must be TAG, got {}",
                other.kind()
            ))
        }
    };
    let to = match &args[3] {
        Value::Tag(tag) => tag,
        other => {
            return Value::error(format!(
                "argument to `diff` ('to') must be TAG, got {}",
                other.kind()
            ))
        }
    };

    println!("Performing diff on {} --> {}", from.name, to.name);

    let messages = match repo.borrow().diff_commits(from, to) {
        Ok(messages) => messages,
        Err(err) => return Value::error(err.to_string()),
    };

    let regex = match vcs::compile_ticket_regex(ticket_spec) {
        Ok(regex) => regex,
        Err(err) => return Value::error(err.to_string()),
    };

    let mut seen = std::collections::HashSet::new();
    let mut tickets = Vec::new();
    for message in &messages {
        for ticket in vcs::find_tickets(&regex, message) {
            if seen.insert(ticket.clone()) {
                tickets.push(ticket);
            }
        }
    }

    println!("{:?}", tickets);
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_dispatches_on_array_and_string() {
        assert!(matches!(
            len(&[Value::Array(Rc::new(vec![Value::Integer(1), Value::Integer(2)]))]),
            Value::Integer(2)
        ));
        assert!(matches!(len(&[Value::string("hello")]), Value::Integer(5)));
    }

    #[test]
    fn len_rejects_wrong_arity() {
        match len(&[]) {
            Value::Error(msg) => assert_eq!(msg, "wrong number of arguments. got=0, want=1"),
            other => panic!("expected error, got {}", other.inspect()),
        }
    }

    #[test]
    fn push_does_not_mutate_input() {
        let original = Rc::new(vec![Value::Integer(1)]);
        let result = push(&[Value::Array(original.clone()), Value::Integer(2)]);
        assert_eq!(original.len(), 1);
        match result {
            Value::Array(elements) => assert_eq!(elements.len(), 2),
            other => panic!("expected array, got {}", other.inspect()),
        }
    }

    #[test]
    fn rest_on_empty_array_is_null() {
        assert!(matches!(rest(&[Value::Array(Rc::new(vec![]))]), Value::Null));
    }

    #[test]
    fn which_repo_echoes_bound_path() {
        match which_repo(&[Value::string("/tmp/repo")]) {
            Value::Str(s) => assert_eq!(&*s, "/tmp/repo"),
            other => panic!("expected string, got {}", other.inspect()),
        }
    }

    #[test]
    fn lookup_finds_core_and_domain_builtins() {
        assert!(lookup("len").is_some());
        assert!(lookup("diff").is_some());
        assert!(lookup("nonexistent").is_none());
    }
}
