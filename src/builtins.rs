//! The fixed builtin set: the hyperscript builder `m(...)` and
//! `m.trust`, `Object.entries`/`Object.fromEntries`, `dedent`, and the
//! sequence methods `map`/`filter`/`reduce`/`includes`. Sequence methods
//! are specialized over their receiver when `.` resolves them, so each
//! carries its sequence.

use std::collections::BTreeMap;

use crate::error::{ParseError, ParseResult};
use crate::interpreter::value::{argument_token, Value};
use crate::parser::Node;
use crate::token::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum Builtin {
    M,
    MTrust,
    Dedent,
    ObjectEntries,
    ObjectFromEntries,
    Map(Vec<Value>),
    Filter(Vec<Value>),
    Reduce(Vec<Value>),
    Includes(Vec<Value>),
}

impl Builtin {
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::M => "m",
            Builtin::MTrust => "m.trust",
            Builtin::Dedent => "dedent",
            Builtin::ObjectEntries => "Object.entries",
            Builtin::ObjectFromEntries => "Object.fromEntries",
            Builtin::Map(_) => "map",
            Builtin::Filter(_) => "filter",
            Builtin::Reduce(_) => "reduce",
            Builtin::Includes(_) => "includes",
        }
    }

    pub fn call(&self, node: &Node, args: Vec<Value>) -> ParseResult<Value> {
        match self {
            Builtin::M => hyperscript(node, args),
            Builtin::MTrust => {
                let value = take_one(node, args)?;
                match value {
                    Value::Str(s) => Ok(Value::TrustedHtml(s)),
                    _ => Err(ParseError::new(
                        "can only m.trust(...) string values",
                        &node.token,
                    )),
                }
            }
            Builtin::Dedent => {
                let value = take_one(node, args)?;
                match value {
                    Value::Str(s) => Ok(Value::Str(dedent_text(&s))),
                    _ => Err(ParseError::new(
                        "can only call with a string argument",
                        &node.token,
                    )),
                }
            }
            Builtin::ObjectEntries => {
                let value = take_one(node, args)?;
                let Value::Object(map) = value else {
                    return Err(ParseError::new(
                        "can only get entries of {",
                        arguments_token(node),
                    ));
                };
                let entries = map
                    .into_iter()
                    .map(|(k, v)| Value::Array(vec![Value::Str(k), v]))
                    .collect();
                Ok(Value::Array(entries))
            }
            Builtin::ObjectFromEntries => {
                let value = take_one(node, args)?;
                let Value::Array(items) = value else {
                    return Err(ParseError::new(
                        "can only get entries of [",
                        arguments_token(node),
                    ));
                };
                let mut map = BTreeMap::new();
                for item in items {
                    let pair_error = || {
                        ParseError::new("must be all (string, Value) pairs", arguments_token(node))
                    };
                    let Value::Array(pair) = item else {
                        return Err(pair_error());
                    };
                    let mut pair = pair.into_iter();
                    match (pair.next(), pair.next(), pair.next()) {
                        (Some(Value::Str(key)), Some(value), None) => {
                            map.insert(key, value);
                        }
                        _ => return Err(pair_error()),
                    }
                }
                Ok(Value::Object(map))
            }
            Builtin::Map(receiver) => {
                let f = take_function(node, args)?;
                let mut out = Vec::with_capacity(receiver.len());
                for (i, item) in receiver.iter().enumerate() {
                    out.push(f.call(node, vec![item.clone(), Value::Int(i as i64)])?);
                }
                Ok(Value::Array(out))
            }
            Builtin::Filter(receiver) => {
                let f = take_function(node, args)?;
                let mut out = Vec::new();
                for (i, item) in receiver.iter().enumerate() {
                    let keep = f.call(node, vec![item.clone(), Value::Int(i as i64)])?;
                    if keep.is_truthy() {
                        out.push(item.clone());
                    }
                }
                Ok(Value::Array(out))
            }
            Builtin::Reduce(receiver) => {
                let (f, mut accumulator) = take_two(node, args)?;
                let Value::Function(f) = f else {
                    return Err(ParseError::new(
                        "attempting to call non-function",
                        &node.token,
                    ));
                };
                for item in receiver {
                    accumulator = f.call(node, vec![accumulator, item.clone()])?;
                }
                Ok(accumulator)
            }
            Builtin::Includes(receiver) => {
                let needle = take_one(node, args)?;
                Ok(Value::Bool(
                    receiver.iter().any(|item| item.strict_eq(&needle)),
                ))
            }
        }
    }
}

fn take_one(node: &Node, args: Vec<Value>) -> ParseResult<Value> {
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(value), None) => Ok(value),
        _ => Err(ParseError::new("expected 1 argument", &node.token)),
    }
}

fn take_two(node: &Node, args: Vec<Value>) -> ParseResult<(Value, Value)> {
    let mut args = args.into_iter();
    match (args.next(), args.next(), args.next()) {
        (Some(first), Some(second), None) => Ok((first, second)),
        _ => Err(ParseError::new("expected 2 arguments", &node.token)),
    }
}

fn take_function(node: &Node, args: Vec<Value>) -> ParseResult<crate::interpreter::value::Function> {
    match take_one(node, args)? {
        Value::Function(f) => Ok(f),
        _ => Err(ParseError::new(
            "attempting to call non-function",
            &node.token,
        )),
    }
}

/// The token of the whole argument list at a call site, with the same
/// host-call fallback as `argument_token`.
fn arguments_token(node: &Node) -> &Token {
    node.children
        .get(1)
        .map(|args| &args.token)
        .unwrap_or(&node.token)
}

/// `m(selector, attrs?, ...children)` → `{tag, attrs, children}`.
///
/// The selector is matched greedily: a leading bare word sets the tag,
/// `.word` accumulates space-joined `className`, `#word` sets `id`. An
/// optional second argument that is not renderable supplies attributes;
/// its `class` key must be a sequence of strings and folds into
/// `className`. Remaining arguments become children, with nested
/// sequences flattened and numbers stringified.
fn hyperscript(node: &Node, args: Vec<Value>) -> ParseResult<Value> {
    let Some((first, mut rest)) = args.split_first() else {
        return Err(ParseError::new(
            "m(...) must be called with more than one argument",
            &node.token,
        ));
    };
    let Value::Str(selector) = first else {
        return Err(ParseError::new(
            "first argument to m(...) must be a string",
            argument_token(node, 0),
        ));
    };

    let mut tag = "div".to_string();
    let mut attrs = BTreeMap::new();
    attrs.insert("className".to_string(), Value::Str(String::new()));
    apply_selector(selector, &mut tag, &mut attrs);

    if let Some(head) = rest.first() {
        if !is_renderable(head) {
            let Value::Object(extra) = head else {
                return Err(ParseError::new(
                    "attributes must be a map of string to value",
                    argument_token(node, 1),
                ));
            };
            for (key, value) in extra {
                attrs.insert(key.clone(), value.clone());
            }
            rest = &rest[1..];
        }
    }

    if let Some(class_list) = attrs.remove("class") {
        let class_error =
            || ParseError::new("class attribute must be an array of strings", argument_token(node, 1));
        let Value::Array(classes) = class_list else {
            return Err(class_error());
        };
        for class in classes {
            let Value::Str(class) = class else {
                return Err(class_error());
            };
            push_class(&mut attrs, &class);
        }
    }

    let mut children = Vec::new();
    for value in rest {
        add_children(node, &mut children, value)?;
    }

    let mut vnode = BTreeMap::new();
    vnode.insert("tag".to_string(), Value::Str(tag));
    vnode.insert("attrs".to_string(), Value::Object(attrs));
    vnode.insert("children".to_string(), Value::Array(children));
    Ok(Value::Object(vnode))
}

fn is_selector_word(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Greedy scan of the selector grammar `(^|.|#)(word)`: runs not
/// introduced by the string start, a `.` or a `#` are ignored.
fn apply_selector(selector: &str, tag: &mut String, attrs: &mut BTreeMap<String, Value>) {
    let chars: Vec<char> = selector.chars().collect();
    let mut i = 0;

    let read_word = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && is_selector_word(chars[*i]) {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    if !chars.is_empty() && is_selector_word(chars[0]) {
        *tag = read_word(&mut i);
    }
    while i < chars.len() {
        match chars[i] {
            '.' => {
                i += 1;
                let word = read_word(&mut i);
                if !word.is_empty() {
                    push_class(attrs, &word);
                }
            }
            '#' => {
                i += 1;
                let word = read_word(&mut i);
                if !word.is_empty() {
                    attrs.insert("id".to_string(), Value::Str(word));
                }
            }
            _ => i += 1,
        }
    }
}

fn push_class(attrs: &mut BTreeMap<String, Value>, class: &str) {
    let current = match attrs.get("className") {
        Some(Value::Str(s)) => s.clone(),
        _ => String::new(),
    };
    attrs.insert(
        "className".to_string(),
        Value::Str(format!("{current} {class}").trim().to_string()),
    );
}

fn add_children(node: &Node, out: &mut Vec<Value>, value: &Value) -> ParseResult<()> {
    if !is_renderable(value) {
        return Err(ParseError::new(
            "one of the arguments to m(...) is not renderable",
            &node.token,
        ));
    }
    match value {
        Value::Null => {}
        Value::Array(items) => {
            for item in items {
                add_children(node, out, item)?;
            }
        }
        Value::Int(_) | Value::Float(_) => out.push(Value::Str(value.display_string())),
        _ => out.push(value.clone()),
    }
    Ok(())
}

/// A mapping with exactly the virtual-DOM keys.
pub(crate) fn is_vnode(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            map.contains_key("tag") && map.contains_key("attrs") && map.contains_key("children")
        }
        _ => false,
    }
}

pub(crate) fn is_renderable(value: &Value) -> bool {
    match value {
        Value::Null
        | Value::Int(_)
        | Value::Float(_)
        | Value::Str(_)
        | Value::Array(_)
        | Value::TrustedHtml(_) => true,
        Value::Object(_) => is_vnode(value),
        _ => false,
    }
}

/// Strips the common leading-whitespace margin of every non-blank line
/// (whitespace-only lines are first emptied), then trims the result.
fn dedent_text(text: &str) -> String {
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| {
            if !line.is_empty() && line.chars().all(|c| c == ' ' || c == '\t') {
                String::new()
            } else {
                line.to_string()
            }
        })
        .collect();

    let mut margin: Option<String> = None;
    for line in &lines {
        if line.is_empty() {
            continue;
        }
        let indent: String = line
            .chars()
            .take_while(|&c| c == ' ' || c == '\t')
            .collect();
        match &margin {
            None => margin = Some(indent),
            Some(current) => {
                if indent.starts_with(current.as_str()) {
                    // current margin still common
                } else if current.starts_with(indent.as_str()) {
                    margin = Some(indent);
                } else {
                    margin = Some(String::new());
                    break;
                }
            }
        }
    }

    let margin = margin.unwrap_or_default();
    lines
        .iter()
        .map(|line| line.strip_prefix(margin.as_str()).unwrap_or(line))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
