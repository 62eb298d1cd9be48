//! Hand-rolled scanner over dnjs source text.
//!
//! The stream is lazy: it exposes one `current` token and an `advance()`
//! operation. Newlines are consumed internally and surface only through
//! line numbers, which the statement splitter uses to keep statements on
//! separate lines. Template literals are the stateful part: a `}` closes
//! an interpolation rather than an object whenever `template_depth` is
//! non-zero, and chunks are tagged by whether they were opened by a
//! backtick (`` ` ``) or resume after an interpolation (`template`).

use std::path::Path;
use std::sync::Arc;

use crate::token::{Source, Token, TokenKind};

const WHITESPACE: [char; 4] = [' ', '\t', '\x0c', '\r'];
const PUNCTUATION: [&str; 14] = [
    "=", "=>", "(", ")", "{", "}", "[", "]", ",", ":", ".", "...", "?", "===",
];
// spellings that must extend to a longer form or fail
const INTERIM_PUNCTUATION: [&str; 2] = ["..", "=="];

/// Text of the end-of-input token.
pub const EOF_TEXT: &str = "\u{3}";

#[derive(Debug, Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    column: usize,
}

pub struct TokenStream {
    pub source: Arc<Source>,
    pub current: Token,
    pos: usize,
    line: usize,
    column: usize,
    /// Byte length of the source after right-trimming trailing whitespace
    /// and newlines; reads at this offset produce `eof`.
    limit: usize,
    template_depth: usize,
}

impl TokenStream {
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(Source::from_file(path)?))
    }

    pub fn from_source(text: &str) -> Self {
        Self::new(Source::from_text(text))
    }

    fn new(source: Arc<Source>) -> Self {
        let limit = source
            .text
            .trim_end_matches(|c: char| WHITESPACE.contains(&c) || c == '\n')
            .len();
        let placeholder = Token::new(TokenKind::Newline, "\n", Arc::clone(&source), 0, 1, 0);
        let mut stream = Self {
            source,
            current: placeholder,
            pos: 0,
            line: 1,
            column: 0,
            limit,
            template_depth: 0,
        };
        stream.current = stream.read_skipping_newlines();
        stream
    }

    /// Step to the next token that is not a standalone newline. A stream
    /// that has reached `eof` stays there.
    pub fn advance(&mut self) {
        if self.current.kind == TokenKind::Eof {
            return;
        }
        self.current = self.read_skipping_newlines();
    }

    fn read_skipping_newlines(&mut self) -> Token {
        loop {
            let token = self.read();
            if token.kind != TokenKind::Newline {
                return token;
            }
        }
    }

    fn peek(&self) -> Option<char> {
        if self.pos >= self.limit {
            return None;
        }
        self.source.text[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        let mut chars = self.source.text[self.pos..self.limit].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn at_comment(&self) -> bool {
        self.peek() == Some('/') && self.peek_second() == Some('/')
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            if self.at_comment() {
                self.bump();
                self.bump();
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.bump();
                }
            } else if matches!(self.peek(), Some(c) if WHITESPACE.contains(&c)) {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn make(&self, kind: TokenKind, start: Mark) -> Token {
        Token::new(
            kind,
            &self.source.text[start.pos..self.pos],
            Arc::clone(&self.source),
            start.pos,
            start.line,
            start.column,
        )
    }

    fn read(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let start = self.mark();

        let Some(c) = self.bump() else {
            return Token::new(
                TokenKind::Eof,
                EOF_TEXT,
                Arc::clone(&self.source),
                start.pos,
                start.line,
                start.column,
            );
        };

        match c {
            '\n' => self.make(TokenKind::Newline, start),
            '"' => self.read_string(start),
            '`' => self.read_template(start, true),
            '}' if self.template_depth > 0 => self.read_template(start, false),
            _ if is_punctuation_start(c) => self.read_punctuation(c, start),
            '-' => self.read_number(start),
            _ if c.is_ascii_digit() => self.read_number(start),
            _ if is_name_start(c) => self.read_name(start),
            _ => self.make(TokenKind::Unexpected, start),
        }
    }

    /// A string accumulates until an unescaped closing quote. `\<c>` keeps
    /// both characters in the token text; a bare newline or end of input
    /// inside the string yields `unexpected`.
    fn read_string(&mut self, start: Mark) -> Token {
        loop {
            match self.peek() {
                None => return self.make(TokenKind::Unexpected, start),
                Some('\n') => {
                    self.bump();
                    return self.make(TokenKind::Unexpected, start);
                }
                Some('\\') => {
                    self.bump();
                    if self.bump().is_none() {
                        return self.make(TokenKind::Unexpected, start);
                    }
                }
                Some('"') => {
                    self.bump();
                    return self.make(TokenKind::Str, start);
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    /// One template chunk: from `` ` `` or a resuming `}` up to `${`, a
    /// closing `` ` ``, or end of input. Newlines stay in the token text.
    /// The chunk kind depends on the first character: backtick-opened
    /// chunks are `` ` `` tokens, continuation chunks are `template`.
    fn read_template(&mut self, start: Mark, opened_by_backtick: bool) -> Token {
        if opened_by_backtick {
            self.template_depth += 1;
        }
        loop {
            match self.peek() {
                None => return self.make(TokenKind::Unexpected, start),
                Some('\\') => {
                    self.bump();
                    if self.bump().is_none() {
                        return self.make(TokenKind::Unexpected, start);
                    }
                }
                Some('$') => {
                    self.bump();
                    if self.peek() == Some('{') {
                        self.bump();
                        return self.finish_template(start, opened_by_backtick);
                    }
                }
                Some('`') => {
                    self.template_depth -= 1;
                    self.bump();
                    return self.finish_template(start, opened_by_backtick);
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn finish_template(&self, start: Mark, opened_by_backtick: bool) -> Token {
        let kind = if opened_by_backtick {
            TokenKind::Backtick
        } else {
            TokenKind::Template
        };
        self.make(kind, start)
    }

    /// Greedy longest-match over the punctuation set. `..` and `==` are
    /// interim spellings: they must extend to `...`/`===` or fail.
    fn read_punctuation(&mut self, first: char, start: Mark) -> Token {
        let mut text = String::from(first);
        if let Some(next) = self.peek() {
            let two = format!("{text}{next}");
            if PUNCTUATION.contains(&two.as_str()) || INTERIM_PUNCTUATION.contains(&two.as_str()) {
                self.bump();
                text = two;
                if let Some(next) = self.peek() {
                    let three = format!("{text}{next}");
                    if PUNCTUATION.contains(&three.as_str()) {
                        self.bump();
                        return self.make(punctuation_kind(&three), start);
                    }
                }
                if INTERIM_PUNCTUATION.contains(&text.as_str()) {
                    return self.make(TokenKind::Unexpected, start);
                }
            }
        }
        self.make(punctuation_kind(&text), start)
    }

    /// Digits with at most one `.`; a second `.` yields `unexpected`.
    /// Exponent notation is not recognized.
    fn read_number(&mut self, start: Mark) -> Token {
        let mut seen_decimal_point = false;
        while matches!(self.peek(), Some(c) if c == '.' || c.is_ascii_digit()) {
            let digit = self.bump();
            if digit == Some('.') {
                if seen_decimal_point {
                    return self.make(TokenKind::Unexpected, start);
                }
                seen_decimal_point = true;
            }
        }
        self.make(TokenKind::Number, start)
    }

    fn read_name(&mut self, start: Mark) -> Token {
        while matches!(self.peek(), Some(c) if is_name_continue(c)) {
            self.bump();
        }
        let kind = match &self.source.text[start.pos..self.pos] {
            "import" => TokenKind::Import,
            "from" => TokenKind::From,
            "export" => TokenKind::Export,
            "default" => TokenKind::Default,
            "const" => TokenKind::Const,
            "null" | "true" | "false" => TokenKind::Literal,
            _ => TokenKind::Name,
        };
        self.make(kind, start)
    }
}

fn is_punctuation_start(c: char) -> bool {
    matches!(
        c,
        '=' | '(' | ')' | '{' | '}' | '[' | ']' | ',' | ':' | '.' | '?'
    )
}

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic()
}

fn is_name_continue(c: char) -> bool {
    c == '_' || c.is_ascii_alphanumeric()
}

fn punctuation_kind(text: &str) -> TokenKind {
    match text {
        "=" => TokenKind::Assign,
        "=>" => TokenKind::Arrow,
        "(" => TokenKind::ParenL,
        ")" => TokenKind::ParenR,
        "{" => TokenKind::BraceL,
        "}" => TokenKind::BraceR,
        "[" => TokenKind::BrackL,
        "]" => TokenKind::BrackR,
        "," => TokenKind::Comma,
        ":" => TokenKind::Colon,
        "." => TokenKind::Dot,
        "..." => TokenKind::Ellipsis,
        "?" => TokenKind::Question,
        "===" => TokenKind::Eq,
        _ => unreachable!("not a punctuation spelling: {text}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn l(source: &str) -> Vec<(String, String)> {
        let mut stream = TokenStream::from_source(source);
        let mut tokens = Vec::new();
        loop {
            let token = stream.current.clone();
            stream.advance();
            if token.kind == TokenKind::Eof {
                break;
            }
            tokens.push((token.kind.to_string(), token.text));
        }
        tokens
    }

    fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(kind, text)| (kind.to_string(), text.to_string()))
            .collect()
    }

    #[test]
    fn empty_input_is_just_eof() {
        assert_eq!(l(""), vec![]);
        assert_eq!(l(" "), vec![]);
        assert_eq!(l("\n\n"), vec![]);
    }

    #[test]
    fn unknown_characters_are_unexpected() {
        assert_eq!(l("±"), owned(&[("unexpected", "±")]));
    }

    #[test]
    fn numbers() {
        assert_eq!(l("1"), owned(&[("number", "1")]));
        assert_eq!(l("-1.5"), owned(&[("number", "-1.5")]));
        assert_eq!(
            l("-1..5"),
            owned(&[("unexpected", "-1.."), ("number", "5")])
        );
    }

    #[test]
    fn punctuation_is_greedy_longest_match() {
        assert_eq!(l(". "), owned(&[(".", ".")]));
        assert_eq!(l("."), owned(&[(".", ".")]));
        assert_eq!(l("..."), owned(&[("...", "...")]));
        assert_eq!(l("==="), owned(&[("===", "===")]));
        assert_eq!(l("=>."), owned(&[("=>", "=>"), (".", ".")]));
        assert_eq!(l(".."), owned(&[("unexpected", "..")]));
        assert_eq!(l("...."), owned(&[("...", "..."), (".", ".")]));
        assert_eq!(l("..=>"), owned(&[("unexpected", ".."), ("=>", "=>")]));
        assert_eq!(l(".12.6"), owned(&[(".", "."), ("number", "12.6")]));
    }

    #[test]
    fn names_keywords_and_literals() {
        assert_eq!(l("import"), owned(&[("import", "import")]));
        assert_eq!(l("importfoo"), owned(&[("name", "importfoo")]));
        assert_eq!(
            l("from _bar const"),
            owned(&[("from", "from"), ("name", "_bar"), ("const", "const")])
        );
        assert_eq!(l("null"), owned(&[("literal", "null")]));
        assert_eq!(l("true false"), owned(&[("literal", "true"), ("literal", "false")]));
    }

    #[test]
    fn strings_keep_escapes_in_the_token_text() {
        assert_eq!(l(r#""foo""#), owned(&[("str", r#""foo""#)]));
        assert_eq!(l(r#""foo\"bar""#), owned(&[("str", r#""foo\"bar""#)]));
        assert_eq!(
            l(r#""foo\\" 42"#),
            owned(&[("str", r#""foo\\""#), ("number", "42")])
        );
        assert_eq!(
            l("42\"foo"),
            owned(&[("number", "42"), ("unexpected", "\"foo")])
        );
        assert_eq!(
            l("\"foo\nbar\""),
            owned(&[
                ("unexpected", "\"foo\n"),
                ("name", "bar"),
                ("unexpected", "\""),
            ])
        );
    }

    #[test]
    fn template_chunks_are_tagged_by_their_opener() {
        assert_eq!(l("``"), owned(&[("`", "``")]));
        assert_eq!(l("`foo`"), owned(&[("`", "`foo`")]));
        assert_eq!(l(r"`foo\`bar`"), owned(&[("`", r"`foo\`bar`")]));
        assert_eq!(
            l(r"`foo\\` 42"),
            owned(&[("`", r"`foo\\`"), ("number", "42")])
        );
        assert_eq!(
            l("`foo${42}bar`"),
            owned(&[("`", "`foo${"), ("number", "42"), ("template", "}bar`")])
        );
        assert_eq!(
            l("`foo${a[`inner${1}2${3}`]}bar`"),
            owned(&[
                ("`", "`foo${"),
                ("name", "a"),
                ("[", "["),
                ("`", "`inner${"),
                ("number", "1"),
                ("template", "}2${"),
                ("number", "3"),
                ("template", "}`"),
                ("]", "]"),
                ("template", "}bar`"),
            ])
        );
        assert_eq!(l("`foo\nbar`"), owned(&[("`", "`foo\nbar`")]));
        assert_eq!(
            l("`${`${a}--${b}`}`"),
            owned(&[
                ("`", "`${"),
                ("`", "`${"),
                ("name", "a"),
                ("template", "}--${"),
                ("name", "b"),
                ("template", "}`"),
                ("template", "}`"),
            ])
        );
        // a } with no open template is plain punctuation
        assert_eq!(
            l("{`foo`}"),
            owned(&[("{", "{"), ("`", "`foo`"), ("}", "}")])
        );
    }

    #[test]
    fn unterminated_template_is_unexpected() {
        assert_eq!(l("`foo"), owned(&[("unexpected", "`foo")]));
        // a chunk that closes its interpolation still tokenizes; the
        // parser reports the unexpected end of input
        assert_eq!(
            l("`foo${1}bar${"),
            owned(&[("`", "`foo${"), ("number", "1"), ("template", "}bar${")])
        );
    }

    #[test]
    fn positions_track_bytes_lines_and_columns() {
        let positions = |source: &str| -> Vec<(String, usize, usize, usize)> {
            let mut stream = TokenStream::from_source(source);
            let mut out = Vec::new();
            while stream.current.kind != TokenKind::Eof {
                let t = stream.current.clone();
                out.push((t.text, t.pos, t.line, t.column));
                stream.advance();
            }
            out
        };

        assert_eq!(
            positions("012  56"),
            vec![
                ("012".to_string(), 0, 1, 0),
                ("56".to_string(), 5, 1, 5),
            ]
        );
        assert_eq!(
            positions("0\n23\n567\n"),
            vec![
                ("0".to_string(), 0, 1, 0),
                ("23".to_string(), 2, 2, 0),
                ("567".to_string(), 5, 3, 0),
            ]
        );
        assert_eq!(
            positions("012//56\n8\n"),
            vec![("012".to_string(), 0, 1, 0), ("8".to_string(), 8, 2, 0)]
        );
        // newlines inside a template advance the line counter
        assert_eq!(
            positions("0\n`3\n5`\n8"),
            vec![
                ("0".to_string(), 0, 1, 0),
                ("`3\n5`".to_string(), 2, 2, 0),
                ("8".to_string(), 8, 4, 0),
            ]
        );
    }

    #[test]
    fn token_text_is_a_slice_of_the_source() {
        let source = "const a = `x${1}y`\n[1.5, \"s\"]";
        let mut stream = TokenStream::from_source(source);
        while stream.current.kind != TokenKind::Eof {
            let t = stream.current.clone();
            assert_eq!(&source[t.pos..t.pos + t.text.len()], t.text);
            stream.advance();
        }
    }

    #[test]
    fn comments_are_skipped() {
        let source = indoc! {r#"
            {
                "key": ["item0", "not//a//comment", 3.14, true]  // another {} comment
                // a comment
                //
            }"#};
        assert_eq!(
            l(source),
            owned(&[
                ("{", "{"),
                ("str", "\"key\""),
                (":", ":"),
                ("[", "["),
                ("str", "\"item0\""),
                (",", ","),
                ("str", "\"not//a//comment\""),
                (",", ","),
                ("number", "3.14"),
                (",", ","),
                ("literal", "true"),
                ("]", "]"),
                ("}", "}"),
            ])
        );
    }

    #[test]
    fn advancing_past_eof_stays_at_eof() {
        let mut stream = TokenStream::from_source("1");
        stream.advance();
        assert_eq!(stream.current.kind, TokenKind::Eof);
        assert_eq!(stream.current.text, EOF_TEXT);
        stream.advance();
        assert_eq!(stream.current.kind, TokenKind::Eof);
    }
}
