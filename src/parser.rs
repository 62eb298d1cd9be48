//! Pratt (top-down operator precedence) parser.
//!
//! Every operator is a token kind; parsing folds tokens into a uniform
//! S-expression tree of `Node`s. Two rule tables drive the core loop:
//! prefix rules build a left-hand node from the current token, infix
//! rules extend it while the next token binds more tightly than the
//! caller's right binding power. After parsing, each top-level statement
//! runs through the child validator (`validate`), which checks shapes and
//! re-types leaf tokens by context so the interpreter can dispatch
//! without one.

use std::fmt;

use crate::error::{ParseError, ParseResult};
use crate::token::{Token, TokenKind};
use crate::tokenizer::TokenStream;

mod validate;

const LOW_PREC: i32 = 1;
const COLON_PREC: i32 = 2;
const HIGH_PREC: i32 = 999;

/// One S-expression node. The token is the operator identity; a quoted
/// node is returned as-is by the interpreter instead of being evaluated,
/// which defers ternary branches and arrow-function bodies.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub token: Token,
    pub children: Vec<Node>,
    pub quoted: bool,
}

impl Node {
    fn new(token: Token, children: Vec<Node>) -> Self {
        Self {
            token,
            children,
            quoted: false,
        }
    }

    fn max_line(&self) -> usize {
        let mut max = self.token.line;
        for child in &self.children {
            max = max.max(child.max_line());
        }
        max
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.quoted {
            f.write_str("'")?;
        }
        if self.token.kind.is_atom() {
            return f.write_str(&self.token.text);
        }
        write!(f, "({}", self.token.kind)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        f.write_str(")")
    }
}

enum PrefixRule {
    Atom,
    Unary,
    Variadic,
    TemplateLiteral,
    /// Grammatical token that cannot open an expression.
    Illegal,
    /// Token the grammar has no use for at all.
    Unexpected,
}

fn prefix_rule(kind: TokenKind) -> (PrefixRule, i32) {
    use TokenKind::*;
    match kind {
        Name | Str | Number | Template | Literal | DName => (PrefixRule::Atom, -1),
        Ellipsis | Import | Const | Export | Default => (PrefixRule::Unary, 3),
        Backtick => (PrefixRule::TemplateLiteral, 9),
        BrackL | BraceL | ParenL => (PrefixRule::Variadic, 20),
        Assign | Arrow | ParenR | BraceR | BrackR | Colon | Eof | Comma | From | Eq | Question
        | Dot => (PrefixRule::Illegal, -1),
        _ => (PrefixRule::Unexpected, HIGH_PREC),
    }
}

enum InfixRule {
    Binary,
    Ternary,
    /// Binds, but only to report that it cannot be used infix.
    Illegal,
    /// Never binds: ends the infix loop.
    Stop,
    Unexpected,
}

fn infix_rule(kind: TokenKind) -> (InfixRule, i32) {
    use TokenKind::*;
    match kind {
        Comma => (InfixRule::Illegal, LOW_PREC),
        Colon => (InfixRule::Binary, COLON_PREC),
        From | Assign => (InfixRule::Binary, 9),
        Arrow => (InfixRule::Binary, 10),
        Eq => (InfixRule::Binary, 11),
        Question => (InfixRule::Ternary, 11),
        Dot | ParenL => (InfixRule::Binary, 20),
        Name | Str | Number | Template | Literal | DName | Ellipsis | Import | Const | Export
        | Default | Backtick | BrackL | BraceL | ParenR | BraceR | BrackR | Eof => {
            (InfixRule::Stop, 0)
        }
        _ => (InfixRule::Unexpected, HIGH_PREC),
    }
}

/// Parse one statement per source line until `eof`. Each statement is
/// validated (and its leaves re-typed) before the next one starts.
pub fn parse_statements(stream: &mut TokenStream) -> ParseResult<Vec<Node>> {
    let mut statements = Vec::new();
    if stream.current.kind == TokenKind::Eof {
        return Ok(statements);
    }
    loop {
        let node = parse(stream, 0)?;

        let mut statement_token = node.token.clone();
        statement_token.kind = TokenKind::Statement;
        let wrapped = validate::validate(Node::new(statement_token, vec![node]))?;
        let node = wrapped
            .children
            .into_iter()
            .next()
            .expect("statement wrapper keeps its child");

        let prev_line = node.max_line();
        statements.push(node);
        if stream.current.kind == TokenKind::Eof {
            break;
        }
        if stream.current.line <= prev_line {
            return Err(ParseError::new(
                "expected statements to be on separate lines",
                &stream.current,
            ));
        }
    }
    Ok(statements)
}

/// Core loop: prefix-dispatch the current token, then fold infix
/// operators while they bind more tightly than `rbp`.
pub fn parse(stream: &mut TokenStream, rbp: i32) -> ParseResult<Node> {
    let (rule, bp) = prefix_rule(stream.current.kind);
    let mut node = match rule {
        PrefixRule::Atom => prefix_atom(stream),
        PrefixRule::Unary => prefix_unary(stream, bp)?,
        PrefixRule::Variadic => prefix_variadic(stream)?,
        PrefixRule::TemplateLiteral => prefix_template(stream, bp)?,
        PrefixRule::Illegal => {
            let message = if stream.current.kind == TokenKind::Eof {
                "unexpected end of input"
            } else {
                "can't be used in prefix position"
            };
            return Err(ParseError::new(message, &stream.current));
        }
        PrefixRule::Unexpected => {
            return Err(ParseError::new("unexpected token", &stream.current));
        }
    };
    loop {
        let (rule, lbp) = infix_rule(stream.current.kind);
        if rbp >= lbp {
            return Ok(node);
        }
        node = match rule {
            InfixRule::Binary => infix_binary(stream, lbp, node)?,
            // right-associative, so recurse at one less than its own power
            InfixRule::Ternary => infix_ternary(stream, lbp - 1, node)?,
            InfixRule::Illegal => {
                return Err(ParseError::new(
                    "can't be used in infix position",
                    &stream.current,
                ));
            }
            InfixRule::Unexpected => {
                return Err(ParseError::new("unexpected token", &stream.current));
            }
            InfixRule::Stop => unreachable!("stop rules never bind"),
        };
    }
}

/// Assert the kind of the current token, then move to the next one.
fn eat(stream: &mut TokenStream, kind: TokenKind) -> ParseResult<()> {
    if stream.current.kind != kind {
        return Err(ParseError::new(
            format!("expected '{}' got '{}'", kind, stream.current.text),
            &stream.current,
        ));
    }
    stream.advance();
    Ok(())
}

fn prefix_atom(stream: &mut TokenStream) -> Node {
    let token = stream.current.clone();
    stream.advance();
    Node::new(token, vec![])
}

fn prefix_unary(stream: &mut TokenStream, bp: i32) -> ParseResult<Node> {
    let token = stream.current.clone();
    stream.advance();
    let child = parse(stream, bp)?;
    Ok(Node::new(token, vec![child]))
}

/// `{a: 1, ...x}` becomes `({ (: a 1) (... x))`; same shape for `[` and
/// `(`. Trailing commas are tolerated.
fn prefix_variadic(stream: &mut TokenStream) -> ParseResult<Node> {
    let token = stream.current.clone();
    stream.advance();
    let end = match token.kind {
        TokenKind::BrackL => TokenKind::BrackR,
        TokenKind::BraceL => TokenKind::BraceR,
        TokenKind::ParenL => TokenKind::ParenR,
        _ => unreachable!("variadic rule only opens brackets"),
    };
    let mut children = Vec::new();
    while stream.current.kind != end {
        children.push(parse(stream, LOW_PREC)?);
        if stream.current.kind != end {
            eat(stream, TokenKind::Comma)?;
        }
    }
    eat(stream, end)?;
    Ok(Node::new(token, children))
}

/// ``(` `foo ${ a } bar`)`` — the opening chunk appears twice, as the
/// operator and as the first piece of template data. An opener that does
/// not itself end in a backtick is followed by alternating expressions
/// and continuation chunks until a chunk closes the template.
fn prefix_template(stream: &mut TokenStream, bp: i32) -> ParseResult<Node> {
    let token = stream.current.clone();
    stream.advance();

    let mut first = token.clone();
    first.kind = TokenKind::Template;
    let mut children = vec![Node::new(first, vec![])];

    if !token.text.ends_with('`') {
        while !stream.current.text.ends_with('`') {
            children.push(parse(stream, bp)?);
        }
        children.push(parse(stream, bp)?);
    }
    Ok(Node::new(token, children))
}

/// `a === b` becomes `(=== a b)`; also handles the kind rewrites for
/// application (`f(x)` → `($ f (* x))`) and arrows (`a => b` →
/// `(=> (* a) 'b)`).
fn infix_binary(stream: &mut TokenStream, rbp: i32, mut left: Node) -> ParseResult<Node> {
    let mut token = stream.current.clone();

    if token.kind == TokenKind::Arrow {
        if left.token.kind == TokenKind::Name {
            left = Node::new(left.token.clone(), vec![left]);
        }
        left.token.kind = TokenKind::Many;
    }

    let mut right;
    if token.kind == TokenKind::ParenL {
        // `(` in infix position is function application: the argument
        // list re-enters the `(` prefix rule and is retagged `*`
        token.kind = TokenKind::Apply;
        right = parse(stream, rbp)?;
        right.token.kind = TokenKind::Many;
    } else {
        stream.advance();
        right = parse(stream, rbp)?;
    }

    if token.kind == TokenKind::Arrow {
        right.quoted = true;
    }

    Ok(Node::new(token, vec![left, right]))
}

/// `p ? x : y` becomes `(? p 'x 'y)` with both branches quoted so that
/// only the selected branch is ever evaluated.
fn infix_ternary(stream: &mut TokenStream, rbp: i32, left: Node) -> ParseResult<Node> {
    let token = stream.current.clone();
    stream.advance();
    let mut true_expr = parse(stream, COLON_PREC)?;
    eat(stream, TokenKind::Colon)?;
    let mut false_expr = parse(stream, rbp)?;
    true_expr.quoted = true;
    false_expr.quoted = true;
    Ok(Node::new(token, vec![left, true_expr, false_expr]))
}
