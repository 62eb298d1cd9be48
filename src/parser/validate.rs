//! Structural validation of the raw parse tree.
//!
//! Every operator has a fixed child shape: an exact arity (or "any
//! number") and, per child slot, a set of allowed token kinds. Matching a
//! kind also re-types it — a `name` on the left of `=` becomes `dname`,
//! an arrow's argument list becomes `d*`, a destructuring `[` inside one
//! becomes `d[`, a `{` before `from` becomes `d{` — so the interpreter
//! can dispatch on kind alone, without context.

use crate::error::{ParseError, ParseResult};
use crate::parser::Node;
use crate::token::TokenKind;

/// Allowed child kinds for one slot, each mapped to the kind it is
/// rewritten to. Kept as an ordered list so error messages are stable.
#[derive(Clone)]
struct KindMap(Vec<(TokenKind, TokenKind)>);

impl KindMap {
    fn identity(kinds: &[TokenKind]) -> Self {
        Self(kinds.iter().map(|&k| (k, k)).collect())
    }

    fn with(mut self, from: TokenKind, to: TokenKind) -> Self {
        self.0.push((from, to));
        self
    }

    fn union(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    fn get(&self, kind: TokenKind) -> Option<TokenKind> {
        self.0
            .iter()
            .find(|(from, _)| *from == kind)
            .map(|(_, to)| *to)
    }

    fn allowed(&self) -> String {
        self.0
            .iter()
            .map(|(from, _)| from.to_string())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

enum Shape {
    Fixed(Vec<KindMap>),
    Variadic(KindMap),
}

fn value_kinds() -> KindMap {
    use TokenKind::*;
    KindMap::identity(&[
        ParenL, Eq, Dot, Arrow, Question, BrackL, Backtick, BraceL, Apply, Name, Str, Number,
        Template, Literal, DName,
    ])
}

fn value_kinds_no_brace() -> KindMap {
    use TokenKind::*;
    KindMap::identity(&[
        ParenL, Eq, Dot, Arrow, Question, BrackL, Backtick, Apply, Name, Str, Number, Template,
        Literal, DName,
    ])
}

fn shape(kind: TokenKind) -> Shape {
    use TokenKind::*;
    match kind {
        Name | Literal | Number | Str | Template | DName => Shape::Fixed(vec![]),
        Statement => Shape::Fixed(vec![
            KindMap::identity(&[Const, Import, Export]).union(value_kinds()),
        ]),
        // unary
        Const => Shape::Fixed(vec![KindMap::identity(&[Assign])]),
        Import => Shape::Fixed(vec![KindMap::identity(&[From])]),
        Export => Shape::Fixed(vec![KindMap::identity(&[Default, Const])]),
        Default | Ellipsis | ParenL => Shape::Fixed(vec![value_kinds()]),
        // binary
        Assign => Shape::Fixed(vec![
            KindMap(vec![(Name, DName)]),
            value_kinds(),
        ]),
        Eq => Shape::Fixed(vec![value_kinds(), value_kinds()]),
        Dot => Shape::Fixed(vec![
            value_kinds_no_brace(),
            KindMap(vec![(Name, DName)]),
        ]),
        From => Shape::Fixed(vec![
            KindMap(vec![(BraceL, DBrace), (Name, DName)]),
            KindMap::identity(&[Str]),
        ]),
        Colon => Shape::Fixed(vec![
            KindMap(vec![(Name, DName), (Str, Str)]),
            value_kinds(),
        ]),
        Apply => Shape::Fixed(vec![value_kinds(), KindMap::identity(&[Many])]),
        Arrow => Shape::Fixed(vec![
            KindMap(vec![(Many, DMany)]),
            value_kinds_no_brace(),
        ]),
        // ternary
        Question => Shape::Fixed(vec![value_kinds(), value_kinds(), value_kinds()]),
        // variadic
        BrackL => Shape::Variadic(value_kinds().with(Ellipsis, Ellipsis)),
        BraceL => Shape::Variadic(KindMap::identity(&[Colon, Ellipsis])),
        Backtick | Many => Shape::Variadic(value_kinds()),
        DBrack | DBrace => Shape::Variadic(KindMap(vec![(Name, DName)])),
        DMany => Shape::Variadic(KindMap(vec![(Name, DName), (BrackL, DBrack)])),
        other => unreachable!("no child shape for operator kind {other}"),
    }
}

pub(crate) fn validate(mut node: Node) -> ParseResult<Node> {
    let maps = match shape(node.token.kind) {
        Shape::Fixed(maps) => {
            if maps.len() != node.children.len() {
                return Err(ParseError::new(
                    "operator has wrong number of arguments",
                    &node.token,
                ));
            }
            maps
        }
        Shape::Variadic(map) => node.children.iter().map(|_| map.clone()).collect(),
    };

    let children = std::mem::take(&mut node.children);
    for (mut child, map) in children.into_iter().zip(maps) {
        match map.get(child.token.kind) {
            Some(retyped) => child.token.kind = retyped,
            None => {
                return Err(ParseError::new(
                    format!("token is not of type: {}", map.allowed()),
                    &child.token,
                ));
            }
        }
        node.children.push(validate(child)?);
    }
    Ok(node)
}
