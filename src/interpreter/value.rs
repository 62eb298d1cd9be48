//! Runtime value model: a tagged dynamic union.
//!
//! Integer and float are distinct tags because `===` distinguishes them
//! and numeric literals pick a tag by the presence of a `.`. The reified
//! `Unary`/`Binary` forms carry top-level `const`/`import`/`export`
//! statements from the generic tree walk back to module assembly, and
//! `Quoted` carries a deferred node (ternary branch or arrow body).

use std::collections::{BTreeMap, HashMap};

use serde::ser::{Serialize, Serializer};

use crate::builtins::Builtin;
use crate::error::{ParseError, ParseResult};
use crate::parser::Node;

pub type Scope = HashMap<String, Value>;

/// Tolerance for float/float `===`.
const FLOAT_EQ_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    Function(Function),
    TrustedHtml(String),
    /// Absent-member sentinel; serializes as the string `<undefined>`.
    Undefined,
    /// Reified `const` / `import` / `export` / `default` / `...`.
    Unary(UnaryOp),
    /// Reified `=` / `from`.
    Binary(BinaryOp),
    /// A quoted node returned unevaluated; the ternary or call that needs
    /// it clears the flag and re-enters the evaluator.
    Quoted(Node),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOp {
    pub node: Node,
    pub arg: Box<Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp {
    pub node: Node,
    pub left: Box<Value>,
    pub right: Box<Value>,
}

impl Value {
    /// Zero numbers, the empty string, `null` and `undefined` are false;
    /// everything else (including empty sequences and mappings) is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null | Value::Undefined => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(n) => *n != 0.0,
            Value::Str(s) => !s.is_empty(),
            _ => true,
        }
    }

    /// `===`: tag + value identity for atomic tags, an absolute epsilon
    /// for float/float, `false` for every cross-tag compare and for
    /// sequences, mappings and functions.
    pub fn strict_eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Undefined, Value::Undefined) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => (a - b).abs() <= FLOAT_EQ_EPSILON,
            (Value::Str(a), Value::Str(b)) => a == b,
            _ => false,
        }
    }

    /// Display form used by template interpolation and by `m(...)` when
    /// it stringifies numeric children.
    pub fn display_string(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(n) => n.to_string(),
            Value::Str(s) => s.clone(),
            Value::TrustedHtml(html) => html.clone(),
            Value::Undefined => "<undefined>".to_string(),
            Value::Function(f) => f.display_string(),
            other => format!("{other:?}"),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(n) => serializer.serialize_f64(*n),
            Value::Str(s) => serializer.serialize_str(s),
            Value::Array(items) => serializer.collect_seq(items),
            Value::Object(map) => serializer.collect_map(map),
            Value::TrustedHtml(html) => serializer.serialize_str(html),
            Value::Undefined => serializer.serialize_str("<undefined>"),
            // functions and reified statement forms have no JSON shape
            Value::Function(_) | Value::Unary(_) | Value::Binary(_) | Value::Quoted(_) => {
                serializer.serialize_unit()
            }
        }
    }
}

/// Anything callable by `$`: a user-defined closure or a named builtin.
#[derive(Debug, Clone, PartialEq)]
pub enum Function {
    Closure(Closure),
    Builtin(Builtin),
}

impl Function {
    pub fn call(&self, node: &Node, args: Vec<Value>) -> ParseResult<Value> {
        match self {
            Function::Closure(closure) => closure.call(node, args),
            Function::Builtin(builtin) => builtin.call(node, args),
        }
    }

    fn display_string(&self) -> String {
        match self {
            Function::Closure(closure) => format!("<function: {}>", closure.node),
            Function::Builtin(builtin) => format!("<builtin: {}>", builtin.name()),
        }
    }
}

/// A user-defined arrow function: a snapshot of its defining scope, its
/// argument names, and the quoted body node.
#[derive(Debug, Clone, PartialEq)]
pub struct Closure {
    pub scope: Scope,
    pub node: Node,
    pub params: Vec<Param>,
    pub body: Node,
}

/// An arg-name is either a name or one level of sequence destructuring.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Name(String),
    Destructure(Vec<String>),
}

impl Closure {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    /// Bind positional arguments into a fresh extension of the captured
    /// scope. Missing arguments stay unbound; extra arguments are
    /// ignored; a destructuring parameter requires a sequence argument.
    pub fn call(&self, node: &Node, args: Vec<Value>) -> ParseResult<Value> {
        let mut scope = self.scope.clone();
        for (i, param) in self.params.iter().enumerate() {
            match param {
                Param::Name(name) => {
                    if let Some(arg) = args.get(i) {
                        scope.insert(name.clone(), arg.clone());
                    }
                }
                Param::Destructure(names) => {
                    let Some(Value::Array(items)) = args.get(i) else {
                        return Err(ParseError::new(
                            "cannot unpack argument",
                            argument_token(node, i),
                        ));
                    };
                    for (name, item) in names.iter().zip(items) {
                        scope.insert(name.clone(), item.clone());
                    }
                }
            }
        }
        let mut body = self.body.clone();
        body.quoted = false;
        crate::interpreter::eval(&scope, &body)
    }
}

/// The token of the i-th argument expression at a call site, for error
/// pointers. Falls back to the call node's own token when the call came
/// from the host rather than from source (e.g. CLI arguments).
pub(crate) fn argument_token(node: &Node, i: usize) -> &crate::token::Token {
    node.children
        .get(1)
        .and_then(|args| args.children.get(i))
        .map(|child| &child.token)
        .unwrap_or(&node.token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthiness_follows_zero_values() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Undefined.is_truthy());
        assert!(!Value::Int(0).is_truthy());
        assert!(!Value::Float(0.0).is_truthy());
        assert!(!Value::Str(String::new()).is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::Bool(true).is_truthy());
        assert!(Value::Int(-1).is_truthy());
        assert!(Value::Array(vec![]).is_truthy());
        assert!(Value::Object(BTreeMap::new()).is_truthy());
    }

    #[test]
    fn strict_eq_is_tag_sensitive() {
        assert!(Value::Int(1).strict_eq(&Value::Int(1)));
        assert!(!Value::Int(1).strict_eq(&Value::Float(1.0)));
        assert!(Value::Float(1.0).strict_eq(&Value::Float(1.0 + 1e-12)));
        assert!(!Value::Float(1.0).strict_eq(&Value::Float(2.0)));
        assert!(Value::Str("foo".into()).strict_eq(&Value::Str("foo".into())));
        assert!(!Value::Array(vec![]).strict_eq(&Value::Array(vec![])));
    }

    #[test]
    fn serializes_with_sorted_keys() {
        let mut map = BTreeMap::new();
        map.insert("b".to_string(), Value::Int(2));
        map.insert("a".to_string(), Value::Array(vec![Value::Null, Value::Float(3.14)]));
        let value = Value::Object(map);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"a":[null,3.14],"b":2}"#
        );
    }

    #[test]
    fn undefined_serializes_as_its_sentinel() {
        assert_eq!(
            serde_json::to_string(&Value::Undefined).unwrap(),
            "\"<undefined>\""
        );
    }
}
