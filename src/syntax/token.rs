//! Token model for C source text

use std::fmt;

/// Classification of a lexed token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Punctuation,
    StringLiteral,
    CharLiteral,
    NumericLiteral,
    Comment,
    /// A whole preprocessor directive line, continuations included
    Preprocessor,
    /// Horizontal whitespace run, or a single line break
    Whitespace,
}

impl TokenKind {
    /// Tokens the C grammar never sees: whitespace, comments and directives
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::Preprocessor
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Punctuation => "punctuation",
            TokenKind::StringLiteral => "string-literal",
            TokenKind::CharLiteral => "char-literal",
            TokenKind::NumericLiteral => "numeric-literal",
            TokenKind::Comment => "comment",
            TokenKind::Preprocessor => "preprocessor-directive",
            TokenKind::Whitespace => "whitespace",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A location in the source text
///
/// `line` and `column` are 1-indexed; `column` counts bytes from the line start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub line: u32,
    pub column: u32,
    pub offset: usize,
}

impl Position {
    pub fn new(line: u32, column: u32, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new(1, 1, 0)
    }
}

/// Name introduced by a `#define`, with its exact location
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacroName<'src> {
    pub name: &'src str,
    pub position: Position,
}

/// Parsed head of a preprocessor directive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive<'src> {
    /// Directive word after `#` (`define`, `include`, ...); empty for a null directive
    pub keyword: &'src str,
    /// Macro name when `keyword` is `define`
    pub macro_name: Option<MacroName<'src>>,
}

/// A classified slice of the source text
///
/// `start` is inclusive and `end` exclusive, so adjacent tokens share a boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'src> {
    pub kind: TokenKind,
    pub text: &'src str,
    pub start: Position,
    pub end: Position,
    /// Set only on the `Preprocessor` token that starts at `#`
    pub directive: Option<Directive<'src>>,
}

impl<'src> Token<'src> {
    /// Punctuator with exactly this spelling
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punctuation && self.text == punct
    }

    /// Keyword with exactly this spelling
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text == keyword
    }

    pub fn is_identifier(&self) -> bool {
        self.kind == TokenKind::Identifier
    }

    /// Identifiers, literals and closing brackets end an operand
    pub fn ends_operand(&self) -> bool {
        match self.kind {
            TokenKind::Identifier
            | TokenKind::NumericLiteral
            | TokenKind::StringLiteral
            | TokenKind::CharLiteral => true,
            TokenKind::Punctuation => matches!(self.text, ")" | "]" | "++" | "--"),
            _ => false,
        }
    }
}

/// C keywords (C11 plus the C23 spellings)
pub const KEYWORDS: &[&str] = &[
    "_Alignas",
    "_Alignof",
    "_Atomic",
    "_Bool",
    "_Complex",
    "_Generic",
    "_Imaginary",
    "_Noreturn",
    "_Static_assert",
    "_Thread_local",
    "alignas",
    "alignof",
    "auto",
    "bool",
    "break",
    "case",
    "char",
    "const",
    "constexpr",
    "continue",
    "default",
    "do",
    "double",
    "else",
    "enum",
    "extern",
    "false",
    "float",
    "for",
    "goto",
    "if",
    "inline",
    "int",
    "long",
    "nullptr",
    "register",
    "restrict",
    "return",
    "short",
    "signed",
    "sizeof",
    "static",
    "static_assert",
    "struct",
    "switch",
    "thread_local",
    "true",
    "typedef",
    "typeof",
    "typeof_unqual",
    "union",
    "unsigned",
    "void",
    "volatile",
    "while",
];

/// Whether `word` is a reserved C keyword
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.binary_search(&word).is_ok()
}
