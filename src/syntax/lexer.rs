#![forbid(unsafe_code)]

//! C lexer
//!
//! Splits source text into classified tokens whose spans tile the input
//! exactly: concatenating every token's text reproduces the source up to the
//! point where lexing stopped. Comments and string/char literals become
//! single tokens, and preprocessor lines become `Preprocessor` tokens around
//! any comments they contain, so detectors never mistake their contents for
//! code. Only the token starting at `#` carries the parsed `Directive`.

use crate::error::{LexError, LexErrorKind};
use crate::syntax::source_map::SourceMap;
use crate::syntax::token::{Directive, MacroName, Token, TokenKind, is_keyword};

const PUNCTUATORS_3: &[&str] = &["<<=", ">>=", "..."];
const PUNCTUATORS_2: &[&str] = &[
    "->", "++", "--", "<<", ">>", "<=", ">=", "==", "!=", "&&", "||", "*=", "/=", "%=", "+=",
    "-=", "&=", "^=", "|=", "##",
];

/// Lazy token iterator over one source text
///
/// Yields `Ok(token)` until the input is exhausted, or a single `Err` for an
/// unterminated literal or comment, after which it is fused.
pub struct Lexer<'src> {
    source: &'src str,
    map: SourceMap,
    pos: usize,
    at_line_start: bool,
    /// Inside a directive's logical line, past a comment embedded in it
    in_directive: bool,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            map: SourceMap::new(source),
            pos: 0,
            at_line_start: true,
            in_directive: false,
            finished: false,
        }
    }

    /// Line/column mapping for the text being lexed
    pub fn source_map(&self) -> &SourceMap {
        &self.map
    }

    fn into_source_map(self) -> SourceMap {
        self.map
    }

    fn byte_at(&self, i: usize) -> Option<u8> {
        self.source.as_bytes().get(i).copied()
    }

    fn make(&self, kind: TokenKind, start: usize, end: usize) -> Token<'src> {
        Token {
            kind,
            text: &self.source[start..end],
            start: self.map.position(start),
            end: self.map.position(end),
            directive: None,
        }
    }

    fn fail(&mut self, kind: LexErrorKind, start: usize) -> LexError {
        self.finished = true;
        let position = self.map.position(start);
        LexError {
            kind,
            line: position.line,
            column: position.column,
            offset: start,
        }
    }

    fn lex_token(&mut self) -> Result<Token<'src>, LexError> {
        let start = self.pos;
        let bytes = self.source.as_bytes();
        let b = bytes[start];

        if self.in_directive
            && !matches!(b, b'\n' | b' ' | b'\t' | b'\r' | 0x0b | 0x0c)
            && !self.at_comment(start)
        {
            return Ok(self.lex_directive_rest(start));
        }

        let (kind, end) = match b {
            b'\n' => (TokenKind::Whitespace, start + 1),
            b' ' | b'\t' | b'\r' | 0x0b | 0x0c => {
                let mut end = start + 1;
                while matches!(self.byte_at(end), Some(b' ' | b'\t' | b'\r' | 0x0b | 0x0c)) {
                    end += 1;
                }
                (TokenKind::Whitespace, end)
            }
            b'/' if self.byte_at(start + 1) == Some(b'/') => {
                (TokenKind::Comment, self.line_comment_end(start))
            }
            b'/' if self.byte_at(start + 1) == Some(b'*') => {
                match self.source[start + 2..].find("*/") {
                    Some(rel) => (TokenKind::Comment, start + 2 + rel + 2),
                    None => return Err(self.fail(LexErrorKind::UnterminatedComment, start)),
                }
            }
            b'#' if self.at_line_start => return Ok(self.lex_directive(start)),
            b'"' => (TokenKind::StringLiteral, self.quoted_end(start, b'"')?),
            b'\'' => (TokenKind::CharLiteral, self.quoted_end(start, b'\'')?),
            b'0'..=b'9' => (TokenKind::NumericLiteral, self.number_end(start)),
            b'.' if matches!(self.byte_at(start + 1), Some(b'0'..=b'9')) => {
                (TokenKind::NumericLiteral, self.number_end(start))
            }
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => {
                let mut end = start + 1;
                while matches!(self.byte_at(end), Some(c) if c.is_ascii_alphanumeric() || c == b'_')
                {
                    end += 1;
                }
                let word = &self.source[start..end];
                match self.byte_at(end) {
                    Some(quote @ (b'"' | b'\'')) if matches!(word, "L" | "u" | "U" | "u8") => {
                        let kind = if quote == b'"' {
                            TokenKind::StringLiteral
                        } else {
                            TokenKind::CharLiteral
                        };
                        (kind, self.quoted_end_from(start, end, quote)?)
                    }
                    _ if is_keyword(word) => (TokenKind::Keyword, end),
                    _ => (TokenKind::Identifier, end),
                }
            }
            _ => (TokenKind::Punctuation, self.punct_end(start)),
        };

        let token = self.make(kind, start, end);
        match kind {
            TokenKind::Whitespace => {
                if b == b'\n' {
                    self.at_line_start = true;
                    self.in_directive = false;
                }
            }
            TokenKind::Comment => {}
            _ => self.at_line_start = false,
        }
        self.pos = end;
        Ok(token)
    }

    /// A `//` comment runs to the end of the line; a backslash before the
    /// newline splices the next line into it
    fn line_comment_end(&self, start: usize) -> usize {
        let bytes = self.source.as_bytes();
        let mut i = start + 2;
        while i < bytes.len() {
            if bytes[i] == b'\n' {
                let mut back = i;
                if back > start && bytes[back - 1] == b'\r' {
                    back -= 1;
                }
                if back > start + 2 && bytes[back - 1] == b'\\' {
                    i += 1;
                    continue;
                }
                // keep a CRLF's carriage return with the line break, not the comment
                return if i > start + 2 && bytes[i - 1] == b'\r' {
                    i - 1
                } else {
                    i
                };
            }
            i += 1;
        }
        bytes.len()
    }

    fn quoted_end(&mut self, start: usize, quote: u8) -> Result<usize, LexError> {
        self.quoted_end_from(start, start, quote)
    }

    /// End of a literal whose opening quote sits at `quote_at`; `start` is
    /// where the token (including any encoding prefix) begins
    fn quoted_end_from(
        &mut self,
        start: usize,
        quote_at: usize,
        quote: u8,
    ) -> Result<usize, LexError> {
        let bytes = self.source.as_bytes();
        let mut i = quote_at + 1;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' => {
                    i += match (self.byte_at(i + 1), self.byte_at(i + 2)) {
                        (Some(b'\r'), Some(b'\n')) => 3,
                        _ => 2,
                    };
                }
                b'\n' => break,
                c if c == quote => return Ok(i + 1),
                _ => i += 1,
            }
        }
        let kind = if quote == b'"' {
            LexErrorKind::UnterminatedString
        } else {
            LexErrorKind::UnterminatedChar
        };
        Err(self.fail(kind, start))
    }

    /// Preprocessing-number: digits, letters, `_`, `.`, and a sign after an exponent
    fn number_end(&self, start: usize) -> usize {
        let bytes = self.source.as_bytes();
        let mut i = start + 1;
        while i < bytes.len() {
            let c = bytes[i];
            if c.is_ascii_alphanumeric() || c == b'_' || c == b'.' {
                i += 1;
            } else if matches!(c, b'+' | b'-') && matches!(bytes[i - 1], b'e' | b'E' | b'p' | b'P')
            {
                i += 1;
            } else {
                break;
            }
        }
        i
    }

    fn punct_end(&self, start: usize) -> usize {
        let rest = &self.source[start..];
        if let Some(p) = PUNCTUATORS_3.iter().find(|p| rest.starts_with(**p)) {
            return start + p.len();
        }
        if let Some(p) = PUNCTUATORS_2.iter().find(|p| rest.starts_with(**p)) {
            return start + p.len();
        }
        start + rest.chars().next().map_or(1, char::len_utf8)
    }

    fn at_comment(&self, i: usize) -> bool {
        self.byte_at(i) == Some(b'/') && matches!(self.byte_at(i + 1), Some(b'/' | b'*'))
    }

    /// End of the directive text starting at `from`: the end of the logical
    /// line or the start of a comment, with trailing blanks left out
    fn directive_end(&self, start: usize, from: usize) -> usize {
        let bytes = self.source.as_bytes();
        let mut i = from;
        while i < bytes.len() {
            match bytes[i] {
                b'\\' if self.byte_at(i + 1) == Some(b'\n') => i += 2,
                b'\\' if self.byte_at(i + 1) == Some(b'\r') && self.byte_at(i + 2) == Some(b'\n') => {
                    i += 3
                }
                b'\n' => break,
                b'/' if self.at_comment(i) => break,
                quote @ (b'"' | b'\'') => {
                    // `#error don't` has an unpaired quote; only skip a pair on this line
                    let close = bytes[i + 1..]
                        .iter()
                        .position(|&c| c == quote || c == b'\n')
                        .map(|rel| i + 1 + rel);
                    match close {
                        Some(c) if bytes[c] == quote => i = c + 1,
                        _ => i += 1,
                    }
                }
                _ => i += 1,
            }
        }
        let mut end = i;
        while end > start + 1 && matches!(bytes[end - 1], b' ' | b'\t' | b'\r') {
            end -= 1;
        }
        end
    }

    /// A directive runs to the end of its logical line. Comments inside it
    /// are lexed as their own tokens and the text after them continues the
    /// directive; trailing blanks stay whitespace.
    fn lex_directive(&mut self, start: usize) -> Token<'src> {
        let end = self.directive_end(start, start + 1);
        let mut token = self.make(TokenKind::Preprocessor, start, end);
        token.directive = Some(self.parse_directive(start, end));
        self.at_line_start = false;
        self.in_directive = true;
        self.pos = end;
        token
    }

    /// Directive text following an embedded comment
    fn lex_directive_rest(&mut self, start: usize) -> Token<'src> {
        let end = self.directive_end(start, start);
        let token = self.make(TokenKind::Preprocessor, start, end);
        self.pos = end;
        token
    }

    fn parse_directive(&self, start: usize, end: usize) -> Directive<'src> {
        let word_at = |mut i: usize| -> (usize, usize) {
            while i < end && matches!(self.source.as_bytes()[i], b' ' | b'\t') {
                i += 1;
            }
            let word_start = i;
            while i < end
                && matches!(self.source.as_bytes()[i], c if c.is_ascii_alphanumeric() || c == b'_')
            {
                i += 1;
            }
            (word_start, i)
        };

        let (kw_start, kw_end) = word_at(start + 1);
        let keyword = &self.source[kw_start..kw_end];
        let macro_name = if keyword == "define" {
            let (name_start, name_end) = word_at(kw_end);
            let name = &self.source[name_start..name_end];
            let valid = name
                .bytes()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == b'_');
            valid.then(|| MacroName {
                name,
                position: self.map.position(name_start),
            })
        } else {
            None
        };

        Directive {
            keyword,
            macro_name,
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished || self.pos >= self.source.len() {
            return None;
        }
        Some(self.lex_token())
    }
}

impl std::iter::FusedIterator for Lexer<'_> {}

/// All tokens of one source text, plus the error that stopped lexing, if any
#[derive(Debug, Clone)]
pub struct TokenStream<'src> {
    source: &'src str,
    map: SourceMap,
    tokens: Vec<Token<'src>>,
    error: Option<LexError>,
}

impl<'src> TokenStream<'src> {
    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn source_map(&self) -> &SourceMap {
        &self.map
    }

    pub fn tokens(&self) -> &[Token<'src>] {
        &self.tokens
    }

    /// Terminal lexing error; tokens before it are still valid
    pub fn error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Token<'src>> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Lex a whole source text, keeping whatever was produced before an error
pub fn tokenize(source: &str) -> TokenStream<'_> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    let mut error = None;

    for item in lexer.by_ref() {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => error = Some(e),
        }
    }

    TokenStream {
        source,
        map: lexer.into_source_map(),
        tokens,
        error,
    }
}
