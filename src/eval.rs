//! The tree-walking evaluator (§4.3): maps AST nodes directly onto [`Value`]s.

use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{BlockStatement, Expression, Program, Statement};
use crate::environment::Environment;
use crate::object::{Function, Value};

fn new_error(msg: impl Into<String>) -> Value {
    Value::error(msg.into())
}

fn is_error(value: &Value) -> bool {
    value.is_error()
}

/// Evaluates a whole program, unwrapping a top-level `return` and letting
/// any error short-circuit immediately.
pub fn eval_program(program: &Program, env: &Rc<RefCell<Environment>>) -> Value {
    let mut result = Value::Null;
    for stmt in &program.statements {
        result = eval_statement(stmt, env);
        match result {
            Value::ReturnValue(inner) => return *inner,
            Value::Error(_) => return result,
            _ => {}
        }
    }
    result
}

/// Evaluates a block, leaving `return`/`error` wrapped so they propagate
/// through nested blocks (only unwrapped at [`eval_program`]'s top level).
fn eval_block_statement(block: &BlockStatement, env: &Rc<RefCell<Environment>>) -> Value {
    let mut result = Value::Null;
    for stmt in &block.statements {
        result = eval_statement(stmt, env);
        if matches!(result, Value::ReturnValue(_) | Value::Error(_)) {
            return result;
        }
    }
    result
}

fn eval_statement(stmt: &Statement, env: &Rc<RefCell<Environment>>) -> Value {
    match stmt {
        Statement::Let(s) => {
            let value = eval_expression(&s.value, env);
            if is_error(&value) {
                return value;
            }
            env.borrow_mut().set(&s.name.name, value)
        }
        Statement::Set(s) => {
            let value = eval_expression(&s.value, env);
            if is_error(&value) {
                return value;
            }
            env.borrow_mut().set(&s.name.name, value)
        }
        Statement::Return(s) => {
            let value = eval_expression(&s.value, env);
            if is_error(&value) {
                return value;
            }
            Value::ReturnValue(Box::new(value))
        }
        Statement::Expression(s) => eval_expression(&s.value, env),
        Statement::Block(b) => eval_block_statement(b, env),
    }
}

fn eval_expression(expr: &Expression, env: &Rc<RefCell<Environment>>) -> Value {
    match expr {
        Expression::IntegerLiteral { value, .. } => Value::Integer(*value),
        Expression::StringLiteral { value, .. } => Value::string(value.as_str()),
        Expression::BooleanLiteral { value, .. } => Value::Boolean(*value),
        Expression::Identifier(ident) => eval_identifier(&ident.name, env),
        Expression::ArrayLiteral { elements, .. } => {
            let values = eval_expressions(elements, env);
            match values {
                Err(err) => err,
                Ok(values) => Value::Array(Rc::new(values)),
            }
        }
        Expression::HashLiteral { pairs, .. } => eval_hash_literal(pairs, env),
        Expression::Prefix {
            operator, right, ..
        } => {
            let right = eval_expression(right, env);
            if is_error(&right) {
                return right;
            }
            eval_prefix_expression(operator, right)
        }
        Expression::Infix {
            left,
            operator,
            right,
            ..
        } => {
            let left = eval_expression(left, env);
            if is_error(&left) {
                return left;
            }
            let right = eval_expression(right, env);
            if is_error(&right) {
                return right;
            }
            eval_infix_expression(operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
            ..
        } => {
            let cond = eval_expression(condition, env);
            if is_error(&cond) {
                return cond;
            }
            if cond.is_truthy() {
                eval_block_statement(consequence, env)
            } else if let Some(alt) = alternative {
                eval_block_statement(alt, env)
            } else {
                Value::Null
            }
        }
        Expression::FunctionLiteral {
            parameters, body, ..
        } => Value::Function(Rc::new(Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: env.clone(),
        })),
        Expression::Call {
            function,
            arguments,
            ..
        } => {
            let function = eval_expression(function, env);
            if is_error(&function) {
                return function;
            }
            let mut args = match eval_expressions(arguments, env) {
                Err(err) => return err,
                Ok(args) => args,
            };
            if let Value::Builtin(b) = &function {
                if b.requires_env_binding {
                    let bound = env
                        .borrow()
                        .get(b.binding_name)
                        .unwrap_or_else(|| new_error(format!("identifier not found: {}", b.binding_name)));
                    args.insert(0, bound);
                }
            }
            apply_function(function, &args)
        }
        Expression::Index { left, index, .. } => {
            let left = eval_expression(left, env);
            if is_error(&left) {
                return left;
            }
            let index = eval_expression(index, env);
            if is_error(&index) {
                return index;
            }
            eval_index_expression(left, index)
        }
    }
}

fn eval_expressions(
    exprs: &[Expression],
    env: &Rc<RefCell<Environment>>,
) -> Result<Vec<Value>, Value> {
    let mut result = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let value = eval_expression(expr, env);
        if is_error(&value) {
            return Err(value);
        }
        result.push(value);
    }
    Ok(result)
}

fn eval_identifier(name: &str, env: &Rc<RefCell<Environment>>) -> Value {
    if let Some(value) = env.borrow().get(name) {
        return value;
    }
    if let Some(builtin) = crate::builtins::lookup(name) {
        return Value::Builtin(Rc::new(builtin));
    }
    new_error(format!("identifier not found: {}", name))
}

fn eval_prefix_expression(operator: &str, right: Value) -> Value {
    match operator {
        "!" => Value::Boolean(!right.is_truthy()),
        "-" => match right {
            Value::Integer(i) => Value::Integer(-i),
            other => new_error(format!("unknown operator: -{}", other.kind())),
        },
        other => new_error(format!("unknown operator: {}{}", other, right.kind())),
    }
}

fn eval_infix_expression(operator: &str, left: Value, right: Value) -> Value {
    match (&left, &right) {
        (Value::Integer(l), Value::Integer(r)) => eval_integer_infix(operator, *l, *r),
        (Value::Str(l), Value::Str(r)) => eval_string_infix(operator, l, r),
        _ if operator == "==" => Value::Boolean(values_equal(&left, &right)),
        _ if operator == "!=" => Value::Boolean(!values_equal(&left, &right)),
        _ if left.kind() != right.kind() => new_error(format!(
            "type mismatch: {} {} {}",
            left.kind(),
            operator,
            right.kind()
        )),
        _ => new_error(format!(
            "unknown operator: {} {} {}",
            left.kind(),
            operator,
            right.kind()
        )),
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Integer(l), Value::Integer(r)) => l == r,
        (Value::Boolean(l), Value::Boolean(r)) => l == r,
        (Value::Str(l), Value::Str(r)) => l == r,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

fn eval_integer_infix(operator: &str, left: i64, right: i64) -> Value {
    match operator {
        "+" => Value::Integer(left + right),
        "-" => Value::Integer(left - right),
        "*" => Value::Integer(left * right),
        "/" => Value::Integer(left / right),
        "<" => Value::Boolean(left < right),
        ">" => Value::Boolean(left > right),
        "==" => Value::Boolean(left == right),
        "!=" => Value::Boolean(left != right),
        other => new_error(format!("unknown operator: INTEGER {} INTEGER", other)),
    }
}

fn eval_string_infix(operator: &str, left: &Rc<str>, right: &Rc<str>) -> Value {
    match operator {
        "+" => Value::string(format!("{}{}", left, right)),
        "==" => Value::Boolean(left == right),
        "!=" => Value::Boolean(left != right),
        other => new_error(format!("unknown operator: STRING {} STRING", other)),
    }
}

fn eval_hash_literal(
    pairs: &[(Expression, Expression)],
    env: &Rc<RefCell<Environment>>,
) -> Value {
    let mut result = indexmap::IndexMap::new();
    for (key_expr, value_expr) in pairs {
        let key = eval_expression(key_expr, env);
        if is_error(&key) {
            return key;
        }
        let hash_key = match key.hash_key() {
            Some(hk) => hk,
            None => return new_error(format!("unusable as hash key: {}", key.kind())),
        };
        let value = eval_expression(value_expr, env);
        if is_error(&value) {
            return value;
        }
        result.insert(hash_key, (key, value));
    }
    Value::Hash(Rc::new(result))
}

fn eval_index_expression(left: Value, index: Value) -> Value {
    match (&left, &index) {
        (Value::Array(elements), Value::Integer(i)) => {
            if *i < 0 || *i as usize >= elements.len() {
                Value::Null
            } else {
                elements[*i as usize].clone()
            }
        }
        (Value::Hash(pairs), _) => {
            let hash_key = match index.hash_key() {
                Some(hk) => hk,
                None => return new_error(format!("unusable as hash key: {}", index.kind())),
            };
            pairs
                .get(&hash_key)
                .map(|(_, v)| v.clone())
                .unwrap_or(Value::Null)
        }
        _ => new_error(format!("index operator not supported: {}", left.kind())),
    }
}

fn apply_function(function: Value, args: &[Value]) -> Value {
    match function {
        Value::Function(f) => {
            if args.len() != f.parameters.len() {
                return new_error(format!(
                    "wrong number of arguments. got={}, want={}",
                    args.len(),
                    f.parameters.len()
                ));
            }
            let call_env = Environment::enclosed(f.env.clone());
            for (param, arg) in f.parameters.iter().zip(args) {
                call_env.borrow_mut().set(&param.name, arg.clone());
            }
            let result = eval_block_statement(&f.body, &call_env);
            match result {
                Value::ReturnValue(inner) => *inner,
                other => other,
            }
        }
        Value::Builtin(b) => (b.func)(args),
        other => new_error(format!("not a function: {}", other.kind())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(input: &str) -> Value {
        let (program, errors) = crate::parser::parse(input);
        assert!(errors.is_empty(), "parser errors: {:?}", errors);
        let env = Environment::with_params("*");
        eval_program(&program, &env)
    }

    #[test]
    fn arithmetic() {
        assert!(matches!(eval("5 + 5 * 2"), Value::Integer(15)));
        assert!(matches!(eval("(5 + 10 * 2 + 15 / 3) * 2 + -10"), Value::Integer(50)));
    }

    #[test]
    fn string_concatenation() {
        match eval(r#""foo" + "bar""#) {
            Value::Str(s) => assert_eq!(&*s, "foobar"),
            other => panic!("expected string, got {}", other.inspect()),
        }
    }

    #[test]
    fn booleans_and_comparisons() {
        assert!(matches!(eval("1 < 2 == true"), Value::Boolean(true)));
        assert!(matches!(eval("1 > 2 == true"), Value::Boolean(false)));
    }

    #[test]
    fn if_else_and_null_branch() {
        assert!(matches!(eval("if (true) { 10 }"), Value::Integer(10)));
        assert!(matches!(eval("if (false) { 10 }"), Value::Null));
    }

    #[test]
    fn return_short_circuits_nested_blocks() {
        let input = "if (10 > 1) { if (10 > 1) { return 10; } return 1; }";
        assert!(matches!(eval(input), Value::Integer(10)));
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            eval("5 + true;").error_message(),
            Some("type mismatch: INTEGER + BOOLEAN")
        );
        assert_eq!(eval("-true").error_message(), Some("unknown operator: -BOOLEAN"));
        assert_eq!(
            eval("true + false;").error_message(),
            Some("unknown operator: BOOLEAN + BOOLEAN")
        );
        assert_eq!(
            eval("foobar").error_message(),
            Some("identifier not found: foobar")
        );
    }

    #[test]
    fn closures_capture_defining_environment() {
        let input = "let newAdder = fn(x) { fn(y) { x + y } }; let addTwo = newAdder(2); addTwo(3);";
        assert!(matches!(eval(input), Value::Integer(5)));
    }

    #[test]
    fn recursion_resolves_through_environment_lookup() {
        let input = "let fact = fn(n) { if (n == 0) { 1 } else { n * fact(n - 1) } }; fact(5);";
        assert!(matches!(eval(input), Value::Integer(120)));
    }

    #[test]
    fn array_and_hash_indexing() {
        assert!(matches!(eval("[1, 2, 3][1]"), Value::Integer(2)));
        assert!(matches!(eval("[1, 2, 3][3]"), Value::Null));
        assert!(matches!(eval(r#"{"a": 1}["a"]"#), Value::Integer(1)));
    }

    #[test]
    fn set_statement_updates_repopath() {
        let (program, errors) = crate::parser::parse(r#"set repopath "/tmp/x";"#);
        assert!(errors.is_empty());
        let env = Environment::with_params("*");
        eval_program(&program, &env);
        let repopath = env.borrow().get("repopath");
        match repopath {
            Some(Value::Str(s)) => assert_eq!(&*s, "/tmp/x"),
            other => panic!("expected repopath to be set, got {:?}", other.map(|v| v.inspect())),
        }
    }
}
