use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The buffer a token was cut from. Every token of one parse shares a
/// handle to it so that errors can point back at the offending line.
#[derive(Debug, Clone, PartialEq)]
pub struct Source {
    /// `None` for in-memory sources, which render as `line` in errors.
    pub path: Option<PathBuf>,
    pub text: String,
}

impl Source {
    pub fn from_file(path: &Path) -> std::io::Result<Arc<Source>> {
        let text = std::fs::read_to_string(path)?;
        Ok(Arc::new(Source {
            path: Some(path.to_path_buf()),
            text,
        }))
    }

    pub fn from_text(text: &str) -> Arc<Source> {
        Arc::new(Source {
            path: None,
            text: text.to_string(),
        })
    }

    pub fn display_name(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "line".to_string(),
        }
    }

    /// The 1-based `lineno`-th line, right-trimmed, for error rendering.
    pub fn line(&self, lineno: usize) -> &str {
        self.text
            .split('\n')
            .nth(lineno.saturating_sub(1))
            .unwrap_or("")
            .trim_end()
    }
}

/// Token tags. Punctuation and keyword tags equal their source text; the
/// parser re-uses them as operator tags and the interpreter dispatches on
/// the same tags, so the three stages share this one vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // atoms
    Name,
    Str,
    Number,
    Template,
    Literal,
    // decorative atoms introduced by the child validator
    DName,
    DMany,
    DBrack,
    DBrace,
    // punctuation
    Assign,   // =
    Arrow,    // =>
    ParenL,   // (
    ParenR,   // )
    BraceL,   // {
    BraceR,   // }
    BrackL,   // [
    BrackR,   // ]
    Comma,    // ,
    Colon,    // :
    Dot,      // .
    Ellipsis, // ...
    Question, // ?
    Eq,       // ===
    // keywords
    Import,
    From,
    Export,
    Default,
    Const,
    // template delimiter: a chunk opened by a backtick
    Backtick,
    // synthetic
    Apply,     // $ function application
    Many,      // * argument list
    Statement, // top-level wrapper used during validation
    Newline,
    Eof,
    Unexpected,
}

impl TokenKind {
    /// Atoms carry a value payload and print as their text in S-expressions.
    pub fn is_atom(self) -> bool {
        matches!(
            self,
            TokenKind::Name
                | TokenKind::Str
                | TokenKind::Number
                | TokenKind::Template
                | TokenKind::Literal
                | TokenKind::DName
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            TokenKind::Name => "name",
            TokenKind::Str => "str",
            TokenKind::Number => "number",
            TokenKind::Template => "template",
            TokenKind::Literal => "literal",
            TokenKind::DName => "dname",
            TokenKind::DMany => "d*",
            TokenKind::DBrack => "d[",
            TokenKind::DBrace => "d{",
            TokenKind::Assign => "=",
            TokenKind::Arrow => "=>",
            TokenKind::ParenL => "(",
            TokenKind::ParenR => ")",
            TokenKind::BraceL => "{",
            TokenKind::BraceR => "}",
            TokenKind::BrackL => "[",
            TokenKind::BrackR => "]",
            TokenKind::Comma => ",",
            TokenKind::Colon => ":",
            TokenKind::Dot => ".",
            TokenKind::Ellipsis => "...",
            TokenKind::Question => "?",
            TokenKind::Eq => "===",
            TokenKind::Import => "import",
            TokenKind::From => "from",
            TokenKind::Export => "export",
            TokenKind::Default => "default",
            TokenKind::Const => "const",
            TokenKind::Backtick => "`",
            TokenKind::Apply => "$",
            TokenKind::Many => "*",
            TokenKind::Statement => "statement",
            TokenKind::Newline => "\\n",
            TokenKind::Eof => "eof",
            TokenKind::Unexpected => "unexpected",
        };
        f.write_str(tag)
    }
}

/// Immutable after creation. `pos` is the byte offset of the first
/// character, `line` is 1-based and `column` counts characters from the
/// start of the line.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub source: Arc<Source>,
    pub pos: usize,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(
        kind: TokenKind,
        text: impl Into<String>,
        source: Arc<Source>,
        pos: usize,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            kind,
            text: text.into(),
            source,
            pos,
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {}>", self.kind, self.text)
    }
}
