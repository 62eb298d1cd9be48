//! Tree-walking evaluator.
//!
//! Expression evaluation is one depth-first walk: children first (unless
//! the node is quoted), then a handler keyed on the node's token kind.
//! Top-level `const`/`import`/`export` forms evaluate to reified
//! `Unary`/`Binary` values that flow back up to the statement loop,
//! which applies their effect to the module.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::builtins::Builtin;
use crate::error::{InterpretError, ParseError, ParseResult};
use crate::parser::{self, Node};
use crate::token::TokenKind;
use crate::tokenizer::TokenStream;

pub mod value;

use value::{BinaryOp, Closure, Function, Param, Scope, UnaryOp, Value};

/// The result of evaluating one module file.
#[derive(Debug, Clone)]
pub struct Module {
    /// `None` for modules interpreted from in-memory source.
    pub path: Option<PathBuf>,
    /// Final top-level bindings, builtins included.
    pub scope: Scope,
    pub exports: BTreeMap<String, Value>,
    pub default_export: Option<Value>,
    /// The last bare expression statement, if any.
    pub value: Option<Value>,
}

impl Module {
    /// The default export, falling back to the last bare expression.
    pub fn main_value(&self) -> Option<&Value> {
        self.default_export.as_ref().or(self.value.as_ref())
    }
}

pub fn interpret_path(path: &Path) -> Result<Module, InterpretError> {
    let mut stream = TokenStream::from_file(path)?;
    interpret(&mut stream, Some(path.to_path_buf()))
}

pub fn interpret_source(source: &str) -> Result<Module, InterpretError> {
    let mut stream = TokenStream::from_source(source);
    interpret(&mut stream, None)
}

fn default_scope() -> Scope {
    let mut object = BTreeMap::new();
    object.insert(
        "entries".to_string(),
        Value::Function(Function::Builtin(Builtin::ObjectEntries)),
    );
    object.insert(
        "fromEntries".to_string(),
        Value::Function(Function::Builtin(Builtin::ObjectFromEntries)),
    );

    let mut scope = Scope::new();
    scope.insert("Object".to_string(), Value::Object(object));
    scope.insert("m".to_string(), Value::Function(Function::Builtin(Builtin::M)));
    scope.insert(
        "dedent".to_string(),
        Value::Function(Function::Builtin(Builtin::Dedent)),
    );
    scope
}

fn interpret(stream: &mut TokenStream, path: Option<PathBuf>) -> Result<Module, InterpretError> {
    let mut scope = default_scope();
    let mut module = Module {
        path,
        scope: Scope::new(),
        exports: BTreeMap::new(),
        default_export: None,
        value: None,
    };

    for statement_node in parser::parse_statements(stream)? {
        let statement = eval(&scope, &statement_node)?;
        match statement {
            Value::Unary(op) if op.node.token.kind == TokenKind::Const => {
                let (name, value) = unpack_assignment(*op.arg);
                scope.insert(name, value);
            }
            Value::Unary(op) if op.node.token.kind == TokenKind::Import => {
                apply_import(&mut scope, &module.path, op)?;
            }
            Value::Unary(op) if op.node.token.kind == TokenKind::Export => {
                let inner = match *op.arg {
                    Value::Unary(inner) => inner,
                    other => unreachable!("export wraps const or default, got {other:?}"),
                };
                if inner.node.token.kind == TokenKind::Const {
                    let (name, value) = unpack_assignment(*inner.arg);
                    scope.insert(name.clone(), value.clone());
                    module.exports.insert(name, value);
                } else {
                    module.default_export = Some(*inner.arg);
                }
            }
            other => module.value = Some(other),
        }
    }
    module.scope = scope;
    Ok(module)
}

fn unpack_assignment(value: Value) -> (String, Value) {
    match value {
        Value::Binary(assignment) => match *assignment.left {
            Value::Str(name) => (name, *assignment.right),
            other => unreachable!("assignment target is a dname string, got {other:?}"),
        },
        other => unreachable!("const wraps an assignment, got {other:?}"),
    }
}

/// `import X from "p"`: non-relative paths are skipped silently; relative
/// paths must end `.dn.js`, resolve against the importing module's
/// directory, and are interpreted recursively. A name binds the imported
/// default export, a `{...}` destructuring binds named exports.
fn apply_import(
    scope: &mut Scope,
    module_path: &Option<PathBuf>,
    op: UnaryOp,
) -> Result<(), InterpretError> {
    let from = match *op.arg {
        Value::Binary(from) => from,
        other => unreachable!("import wraps a from, got {other:?}"),
    };
    let from_path = match *from.right {
        Value::Str(path) => path,
        other => unreachable!("import path is a string, got {other:?}"),
    };
    if !from_path.starts_with('.') {
        return Ok(());
    }
    if !from_path.ends_with(".dn.js") {
        return Err(ParseError::new("can only import files ending .dn.js", &op.node.token).into());
    }

    let directory = module_path
        .as_deref()
        .and_then(Path::parent)
        .unwrap_or_else(|| Path::new("."));
    let imported = interpret_path(&directory.join(&from_path))?;

    match *from.left {
        Value::Str(name) => {
            let Some(default_export) = imported.default_export else {
                return Err(ParseError::new("missing export default", &op.node.token).into());
            };
            scope.insert(name, default_export);
        }
        Value::Array(names) => {
            for name in names {
                let Value::Str(name) = name else {
                    unreachable!("destructured import names are dname strings");
                };
                let export = imported.exports.get(&name).cloned().unwrap_or(Value::Null);
                scope.insert(name, export);
            }
        }
        other => unreachable!("import binds a name or a destructuring, got {other:?}"),
    }
    Ok(())
}

/// Evaluate one node in `scope`. Quoted nodes come back unevaluated.
pub fn eval(scope: &Scope, node: &Node) -> ParseResult<Value> {
    if node.quoted {
        return Ok(Value::Quoted(node.clone()));
    }
    let mut args = Vec::with_capacity(node.children.len());
    for child in &node.children {
        args.push(eval(scope, child)?);
    }

    match node.token.kind {
        // atoms
        TokenKind::Name => scope.get(&node.token.text).cloned().ok_or_else(|| {
            ParseError::new(
                format!("variable {} is not in scope", node.token.text),
                &node.token,
            )
        }),
        TokenKind::DName => Ok(Value::Str(node.token.text.clone())),
        TokenKind::Literal => Ok(match node.token.text.as_str() {
            "null" => Value::Null,
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => unreachable!("literal token {other}"),
        }),
        TokenKind::Number => parse_number(node),
        TokenKind::Str | TokenKind::Template => Ok(Value::Str(strip_delimiters(&node.token.text))),

        // unary
        TokenKind::ParenL => Ok(take_one(args)),
        TokenKind::Const
        | TokenKind::Import
        | TokenKind::Export
        | TokenKind::Default
        | TokenKind::Ellipsis => Ok(Value::Unary(UnaryOp {
            node: node.clone(),
            arg: Box::new(take_one(args)),
        })),

        // binary
        TokenKind::Assign | TokenKind::From => {
            let (left, right) = take_two(args);
            Ok(Value::Binary(BinaryOp {
                node: node.clone(),
                left: Box::new(left),
                right: Box::new(right),
            }))
        }
        TokenKind::Eq => {
            let (left, right) = take_two(args);
            Ok(Value::Bool(left.strict_eq(&right)))
        }
        TokenKind::Dot => {
            let (value, name) = take_two(args);
            let Value::Str(name) = name else {
                unreachable!("member name is a dname string");
            };
            member(node, value, &name)
        }
        TokenKind::Colon => {
            let (left, right) = take_two(args);
            Ok(Value::Array(vec![left, right]))
        }
        TokenKind::Apply => {
            let (callee, arguments) = take_two(args);
            let Value::Function(f) = callee else {
                return Err(ParseError::new(
                    "attempting to call non-function",
                    &node.token,
                ));
            };
            let Value::Array(arguments) = arguments else {
                unreachable!("argument list evaluates to a sequence");
            };
            f.call(node, arguments)
        }

        // ternary: only the selected (quoted) branch is evaluated
        TokenKind::Question => {
            let (predicate, if_true, if_false) = take_three(args);
            let chosen = if predicate.is_truthy() { if_true } else { if_false };
            let Value::Quoted(mut branch) = chosen else {
                unreachable!("ternary branches are quoted");
            };
            branch.quoted = false;
            eval(scope, &branch)
        }

        // variadic
        TokenKind::BrackL => array_literal(args),
        TokenKind::BraceL => object_literal(args),
        TokenKind::Backtick => Ok(Value::Str(
            args.iter().map(Value::display_string).collect::<String>(),
        )),
        TokenKind::Many | TokenKind::DMany | TokenKind::DBrack | TokenKind::DBrace => {
            Ok(Value::Array(args))
        }

        TokenKind::Arrow => {
            let (params, body) = take_two(args);
            let Value::Array(params) = params else {
                unreachable!("arrow argument list evaluates to a sequence");
            };
            let Value::Quoted(body) = body else {
                unreachable!("arrow bodies are quoted");
            };
            Ok(Value::Function(Function::Closure(Closure {
                scope: scope.clone(),
                node: node.clone(),
                params: params.into_iter().map(into_param).collect(),
                body,
            })))
        }

        other => unreachable!("no handler for operator kind {other}"),
    }
}

fn parse_number(node: &Node) -> ParseResult<Value> {
    let text = &node.token.text;
    if text.contains('.') {
        match text.parse::<f64>() {
            Ok(n) => Ok(Value::Float(n)),
            Err(e) => Err(ParseError::new(e.to_string(), &node.token)),
        }
    } else {
        match text.parse::<i64>() {
            Ok(n) => Ok(Value::Int(n)),
            Err(e) => Err(ParseError::new(e.to_string(), &node.token)),
        }
    }
}

/// Strip the outer quote/backtick pair; a chunk that ends with `${` also
/// loses those two characters. No escape decoding happens here: token
/// text is the source slice.
fn strip_delimiters(text: &str) -> String {
    let end = if text.ends_with("${") {
        text.len() - 2
    } else {
        text.len() - 1
    };
    text[1..end].to_string()
}

/// `.` member access. Sequences expose `length` and their methods, `m`
/// exposes `trust`, mappings index by key, anything else is undefined.
fn member(node: &Node, value: Value, name: &str) -> ParseResult<Value> {
    if value == Value::Undefined {
        return Err(ParseError::new(
            format!("cannot get .{name}, value is undefined"),
            &node.token,
        ));
    }
    if let Value::Array(items) = &value {
        match name {
            "length" => return Ok(Value::Int(items.len() as i64)),
            "map" => {
                return Ok(Value::Function(Function::Builtin(Builtin::Map(
                    items.clone(),
                ))));
            }
            "filter" => {
                return Ok(Value::Function(Function::Builtin(Builtin::Filter(
                    items.clone(),
                ))));
            }
            "reduce" => {
                return Ok(Value::Function(Function::Builtin(Builtin::Reduce(
                    items.clone(),
                ))));
            }
            "includes" => {
                return Ok(Value::Function(Function::Builtin(Builtin::Includes(
                    items.clone(),
                ))));
            }
            _ => {}
        }
    }
    if value == Value::Function(Function::Builtin(Builtin::M)) && name == "trust" {
        return Ok(Value::Function(Function::Builtin(Builtin::MTrust)));
    }
    match value {
        Value::Object(map) => Ok(map.get(name).cloned().unwrap_or(Value::Undefined)),
        _ => Ok(Value::Undefined),
    }
}

/// `[` literal: spreads must hold sequences and are inlined.
fn array_literal(values: Vec<Value>) -> ParseResult<Value> {
    let mut out = Vec::new();
    for value in values {
        match value {
            Value::Unary(spread) => {
                let Value::Array(items) = *spread.arg else {
                    return Err(ParseError::new(
                        "must be of type: [",
                        &spread.node.children[0].token,
                    ));
                };
                out.extend(items);
            }
            other => out.push(other),
        }
    }
    Ok(Value::Array(out))
}

/// `{` literal: children are `:` pairs; spreads must hold mappings and
/// merge, later keys overriding earlier ones.
fn object_literal(values: Vec<Value>) -> ParseResult<Value> {
    let mut out = BTreeMap::new();
    for value in values {
        match value {
            Value::Unary(spread) => {
                let Value::Object(map) = *spread.arg else {
                    return Err(ParseError::new(
                        "must be of type: {",
                        &spread.node.children[0].token,
                    ));
                };
                out.extend(map);
            }
            Value::Array(pair) => {
                let mut pair = pair.into_iter();
                match (pair.next(), pair.next()) {
                    (Some(Value::Str(key)), Some(value)) => {
                        out.insert(key, value);
                    }
                    _ => unreachable!("object entries are (string, value) pairs"),
                }
            }
            other => unreachable!("object child evaluates to a pair or spread, got {other:?}"),
        }
    }
    Ok(Value::Object(out))
}

fn into_param(value: Value) -> Param {
    match value {
        Value::Str(name) => Param::Name(name),
        Value::Array(names) => Param::Destructure(
            names
                .into_iter()
                .map(|name| match name {
                    Value::Str(name) => name,
                    other => unreachable!("nested arg-name is a string, got {other:?}"),
                })
                .collect(),
        ),
        other => unreachable!("arg-name is a string or sequence, got {other:?}"),
    }
}

fn take_one(args: Vec<Value>) -> Value {
    let mut args = args.into_iter();
    match (args.next(), args.next()) {
        (Some(value), None) => value,
        _ => unreachable!("validator guarantees unary arity"),
    }
}

fn take_two(args: Vec<Value>) -> (Value, Value) {
    let mut args = args.into_iter();
    match (args.next(), args.next(), args.next()) {
        (Some(left), Some(right), None) => (left, right),
        _ => unreachable!("validator guarantees binary arity"),
    }
}

fn take_three(args: Vec<Value>) -> (Value, Value, Value) {
    let mut args = args.into_iter();
    match (args.next(), args.next(), args.next(), args.next()) {
        (Some(first), Some(second), Some(third), None) => (first, second, third),
        _ => unreachable!("validator guarantees ternary arity"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn i(source: &str) -> String {
        let module = interpret_source(source).expect("interpret failed");
        serde_json::to_string(module.value.as_ref().expect("module has a value")).unwrap()
    }

    fn i_err(source: &str) -> String {
        match interpret_source(source).expect_err("expected interpret failure") {
            InterpretError::Parse(e) => e.to_string(),
            InterpretError::Io(e) => panic!("unexpected io error: {e}"),
        }
    }

    #[test]
    fn evaluates_literals() {
        assert_eq!(i("null"), "null");
        assert_eq!(i("true"), "true");
        assert_eq!(i("42"), "42");
        assert_eq!(i("-1.5"), "-1.5");
        assert_eq!(i("\"foo\""), "\"foo\"");
    }

    #[test]
    fn evaluates_strict_equality() {
        assert_eq!(i("(1)"), "1");
        assert_eq!(i("1 === 1"), "true");
        assert_eq!(i("2 === 2"), "true");
        assert_eq!(i("1.0 === 1.0"), "true");
        assert_eq!(i("1.0 === 2.0"), "false");
        assert_eq!(i("1 === 1.0"), "false");
        assert_eq!(i("\"foo\" === (\"foo\")"), "true");
        assert_eq!(i("\"foo\" === \"bar\""), "false");
        assert_eq!(i("null === null"), "true");
    }

    #[test]
    fn evaluates_objects_and_members() {
        assert_eq!(i("{foo: 42}"), r#"{"foo":42}"#);
        assert_eq!(i("({foo: 42}).foo"), "42");
        assert_eq!(i("({foo: 42}).bar"), "\"<undefined>\"");
        assert_eq!(
            i_err("({foo: 42}).bar.rar"),
            indoc! {"
                <ParserError line:1>
                cannot get .rar, value is undefined
                ({foo: 42}).bar.rar
                _______________^"}
        );
    }

    #[test]
    fn binds_and_looks_up_consts() {
        assert_eq!(i("const foo = 5\nfoo"), "5");
        assert_eq!(
            i_err("const foo = 5\nbar"),
            indoc! {"
                <ParserError line:2>
                variable bar is not in scope
                bar
                ^"}
        );
    }

    #[test]
    fn spreads_objects_and_arrays() {
        assert_eq!(
            i("const a = {foo: 1}\n{bar: 2, ...a}"),
            r#"{"bar":2,"foo":1}"#
        );
        assert_eq!(
            i_err("const a = 42\n{bar: 2, ...a}"),
            indoc! {"
                <ParserError line:2>
                must be of type: {
                {bar: 2, ...a}
                ____________^"}
        );
        assert_eq!(i("const a = [1]\n[...a, 2]"), "[1,2]");
        assert_eq!(
            i_err("const a = 1\n[...a, 2]"),
            indoc! {"
                <ParserError line:2>
                must be of type: [
                [...a, 2]
                ____^"}
        );
    }

    #[test]
    fn later_spread_keys_override_earlier_ones() {
        assert_eq!(
            i("const a = {x: 1, y: 1}\nconst b = {y: 2}\n{...a, ...b}"),
            r#"{"x":1,"y":2}"#
        );
        assert_eq!(
            i("const a = [1, 2]\nconst b = [3]\n[...a, ...b]"),
            "[1,2,3]"
        );
    }

    #[test]
    fn selects_ternary_branches() {
        assert_eq!(i("true ? 1 : 2"), "1");
        assert_eq!(i("false ? 1 : 2"), "2");
        // only the chosen branch evaluates, so the unbound name is fine
        assert_eq!(i("true ? 1 : missing"), "1");
    }

    #[test]
    fn interpolates_templates() {
        assert_eq!(i("`foo${1}bar`"), "\"foo1bar\"");
        assert_eq!(i("`foo${4.2}bar`"), "\"foo4.2bar\"");
        assert_eq!(i("`foo${\"baz\"}bar`"), "\"foobazbar\"");
        assert_eq!(i("``"), "\"\"");
    }

    #[test]
    fn applies_functions() {
        assert_eq!(i("(a => [a, 2])(1)"), "[1,2]");
        assert_eq!(
            i_err("[](1)"),
            indoc! {"
                <ParserError line:1>
                attempting to call non-function
                [](1)
                __^"}
        );
        assert_eq!(i("(([a, b]) => [b, a])([2, 1])"), "[1,2]");
        assert_eq!(i("(([a, b], c) => [b, a, c])([2, 1], 3)"), "[1,2,3]");
        assert_eq!(
            i_err("(([a, b]) => [b, a])({})"),
            indoc! {"
                <ParserError line:1>
                cannot unpack argument
                (([a, b]) => [b, a])({})
                _____________________^"}
        );
    }

    #[test]
    fn closures_capture_their_defining_scope() {
        assert_eq!(
            i("const a = 1\nconst f = b => [a, b]\nf(2)"),
            "[1,2]"
        );
    }

    #[test]
    fn array_methods() {
        assert_eq!(i("[1, 2, 3].length"), "3");
        assert_eq!(
            i_err("[1, 2, 3].map()"),
            indoc! {"
                <ParserError line:1>
                expected 1 argument
                [1, 2, 3].map()
                _____________^"}
        );
        assert_eq!(
            i_err("[1, 2, 3].map(4)"),
            indoc! {"
                <ParserError line:1>
                attempting to call non-function
                [1, 2, 3].map(4)
                _____________^"}
        );
        assert_eq!(
            i("[1, 2].map(n => ({foo: n}))"),
            r#"[{"foo":1},{"foo":2}]"#
        );
        assert_eq!(
            i("[1, 2, 3].map((n, i) => n === 2 ? 0 : i)"),
            "[0,0,2]"
        );
        assert_eq!(
            i("[1, 2, 3, 4].filter(n => n === 2 ? false : true)"),
            "[1,3,4]"
        );
        assert_eq!(
            i("[[1, 2], [3], [4, 5]].reduce((a, b)=>[...a, ...b], [])"),
            "[1,2,3,4,5]"
        );
        assert_eq!(i("[1, 2].includes(1)"), "true");
        assert_eq!(i("[1, 2].includes(9)"), "false");
    }

    #[test]
    fn object_entries_and_from_entries() {
        assert_eq!(i("Object.entries({foo: 1})"), r#"[["foo",1]]"#);
        assert_eq!(
            i_err("Object.entries()"),
            indoc! {"
                <ParserError line:1>
                expected 1 argument
                Object.entries()
                ______________^"}
        );
        assert_eq!(
            i_err("Object.entries([])"),
            indoc! {"
                <ParserError line:1>
                can only get entries of {
                Object.entries([])
                ______________^"}
        );
        assert_eq!(
            i("Object.fromEntries([[\"foo\", 1]])"),
            r#"{"foo":1}"#
        );
        assert_eq!(
            i_err("Object.fromEntries(2)"),
            indoc! {"
                <ParserError line:1>
                can only get entries of [
                Object.fromEntries(2)
                __________________^"}
        );
        assert_eq!(
            i_err("Object.fromEntries([2])"),
            indoc! {"
                <ParserError line:1>
                must be all (string, Value) pairs
                Object.fromEntries([2])
                __________________^"}
        );
        assert_eq!(
            i("Object.fromEntries(Object.entries({a: 1, b: 2}))"),
            r#"{"a":1,"b":2}"#
        );
    }

    #[test]
    fn hyperscript_builds_vnodes() {
        assert_eq!(
            i("m(\"li#id.foo.bar\", \"hello\")"),
            r#"{"attrs":{"className":"foo bar","id":"id"},"children":["hello"],"tag":"li"}"#
        );
        assert_eq!(
            i_err("m()"),
            indoc! {"
                <ParserError line:1>
                m(...) must be called with more than one argument
                m()
                _^"}
        );
        assert_eq!(
            i_err("m(1)"),
            indoc! {"
                <ParserError line:1>
                first argument to m(...) must be a string
                m(1)
                __^"}
        );
        assert_eq!(
            i_err("m(\"div\", ()=>null)"),
            indoc! {"
                <ParserError line:1>
                attributes must be a map of string to value
                m(\"div\", ()=>null)
                ___________^"}
        );
        assert_eq!(
            i_err("m(\"div\", {class: 1})"),
            indoc! {"
                <ParserError line:1>
                class attribute must be an array of strings
                m(\"div\", {class: 1})
                _________^"}
        );
        assert_eq!(
            i_err("m(\"div\", {class: [1]})"),
            indoc! {"
                <ParserError line:1>
                class attribute must be an array of strings
                m(\"div\", {class: [1]})
                _________^"}
        );
        assert_eq!(
            i_err("m(\"div\", {}, ()=>null)"),
            indoc! {"
                <ParserError line:1>
                one of the arguments to m(...) is not renderable
                m(\"div\", {}, ()=>null)
                _^"}
        );
    }

    #[test]
    fn hyperscript_flattens_and_stringifies_children() {
        assert_eq!(
            i("m(\"ul\", [1, 2].map(n => m(\"li\", n)), null, 3.5)"),
            concat!(
                r#"{"attrs":{"className":""},"children":["#,
                r#"{"attrs":{"className":""},"children":["1"],"tag":"li"},"#,
                r#"{"attrs":{"className":""},"children":["2"],"tag":"li"},"#,
                r#""3.5"],"tag":"ul"}"#
            )
        );
    }

    #[test]
    fn trusts_strings_only() {
        assert_eq!(i("m.trust(\"<b>hi</b>\")"), "\"<b>hi</b>\"");
        assert_eq!(
            i_err("m.trust(1)"),
            indoc! {"
                <ParserError line:1>
                can only m.trust(...) string values
                m.trust(1)
                _______^"}
        );
    }

    #[test]
    fn dedents_strings() {
        assert_eq!(
            i("dedent(`\n    foo\n    bar\n`)"),
            "\"foo\\nbar\""
        );
        assert_eq!(
            i_err("dedent(1)"),
            indoc! {"
                <ParserError line:1>
                can only call with a string argument
                dedent(1)
                ______^"}
        );
    }

    #[test]
    fn exports_and_module_values() {
        let module = interpret_source(indoc! {r#"
            export default [6]
            export const base = 42

            {"key": 1}
        "#})
        .unwrap();
        assert_eq!(
            serde_json::to_string(&module.default_export.unwrap()).unwrap(),
            "[6]"
        );
        assert_eq!(
            serde_json::to_string(module.exports.get("base").unwrap()).unwrap(),
            "42"
        );
        assert_eq!(
            serde_json::to_string(&module.value.unwrap()).unwrap(),
            r#"{"key":1}"#
        );
    }

    #[test]
    fn export_default_stores_the_evaluated_value() {
        let module = interpret_source("const a = 2\nexport default a === 2 ? [1] : [0]").unwrap();
        assert_eq!(
            serde_json::to_string(&module.default_export.unwrap()).unwrap(),
            "[1]"
        );
    }

    #[test]
    fn non_relative_imports_are_skipped() {
        let module = interpret_source("import m from \"mithril\"\nm(\"br\")").unwrap();
        assert_eq!(
            serde_json::to_string(&module.value.unwrap()).unwrap(),
            r#"{"attrs":{"className":""},"children":[],"tag":"br"}"#
        );
    }

    #[test]
    fn relative_imports_must_end_dn_js() {
        assert_eq!(
            i_err("import a from \"./foo.js\""),
            indoc! {"
                <ParserError line:1>
                can only import files ending .dn.js
                import a from \"./foo.js\"
                ^"}
        );
    }

    #[test]
    fn serialization_is_deterministic() {
        let source = "{b: 1, a: {d: 2, c: 3}, e: [1.5, null, true]}";
        let first = i(source);
        let second = i(source);
        assert_eq!(first, second);
        assert_eq!(first, r#"{"a":{"c":3,"d":2},"b":1,"e":[1.5,null,true]}"#);
    }
}
