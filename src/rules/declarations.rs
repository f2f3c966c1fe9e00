#![forbid(unsafe_code)]

//! Lexical declaration recognition
//!
//! Recognizes `specifiers declarator [= init], ... ;` shapes at statement
//! starts, function parameter lists and enumerator lists. This is a best-effort
//! approximation: an identifier in type position is assumed to be a typedef
//! name, and statement shapes that do not parse as a declaration are skipped.

use crate::syntax::{BlockId, BlockKind, CodeToken, Position, SourceIndex, TokenKind};

/// Where a declaration appears
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclContext {
    /// Block-scope or file-scope statement, or a struct/union member
    Statement,
    /// Function parameter
    Parameter,
    /// First clause of a `for` header
    ForInit,
}

/// A name introduced at a specific code token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameRef<'src> {
    pub name: &'src str,
    pub start: Position,
    pub end: Position,
    /// Index into `SourceIndex::code`
    pub code_idx: usize,
}

/// One declared name with its declarator shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declarator<'src> {
    pub name: NameRef<'src>,
    pub initialized: bool,
    pub is_array: bool,
    pub is_function: bool,
    /// Code indices of the `(` and `)` around the parameter list
    params: Option<(usize, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration<'src> {
    pub context: DeclContext,
    /// Code index of the first specifier
    pub start: usize,
    /// Code index of the terminating `;` (or `{` of a function definition)
    pub end: usize,
    /// Innermost block enclosing the declaration
    pub scope: Option<BlockId>,
    pub is_typedef: bool,
    pub is_static: bool,
    pub is_extern: bool,
    pub is_function_definition: bool,
    /// struct/union/enum tag whose body this declaration defines
    pub defined_tag: Option<NameRef<'src>>,
    pub declarators: Vec<Declarator<'src>>,
}

/// Find all declarations in the file, in source order
pub fn scan<'src>(index: &SourceIndex<'src>) -> Vec<Declaration<'src>> {
    let scanner = Scanner {
        index,
        code: index.code(),
    };
    let mut out = Vec::new();

    for start in 0..scanner.code.len() {
        let Some(context) = scanner.statement_context(start) else {
            continue;
        };
        let Some(decl) = scanner.parse_declaration(start, context) else {
            continue;
        };
        let param_lists: Vec<(usize, usize)> =
            decl.declarators.iter().filter_map(|d| d.params).collect();
        out.push(decl);
        for (open, close) in param_lists {
            scanner.parse_parameters(open, close, &mut out);
        }
    }

    out
}

/// Names listed inside every enum body
pub fn enumerators<'src>(index: &SourceIndex<'src>) -> Vec<NameRef<'src>> {
    let code = index.code();
    let mut out = Vec::new();

    for block in index.blocks().iter().filter(|b| b.kind == BlockKind::Enum) {
        let end = block.close_code.unwrap_or(code.len());
        let mut expect_name = true;
        let mut j = block.open_code + 1;
        while j < end {
            let token = &code[j];
            if expect_name && token.is_identifier() {
                out.push(name_ref(code, j));
                expect_name = false;
            } else if token.is_punct(",") {
                expect_name = true;
            } else {
                if is_open_bracket(token)
                    && let Some(close) = token.partner
                {
                    j = close;
                }
                expect_name = false;
            }
            j += 1;
        }
    }

    out
}

const STORAGE_WORDS: &[&str] = &[
    "auto",
    "constexpr",
    "extern",
    "inline",
    "register",
    "static",
    "thread_local",
    "typedef",
    "_Noreturn",
    "_Thread_local",
];

const QUALIFIER_WORDS: &[&str] = &["const", "restrict", "volatile", "_Atomic"];

const TYPE_WORDS: &[&str] = &[
    "bool",
    "char",
    "double",
    "float",
    "int",
    "long",
    "short",
    "signed",
    "unsigned",
    "void",
    "_Bool",
    "_Complex",
    "_Imaginary",
];

/// Compiler-extension spellings that behave like qualifiers
const EXTENSION_WORDS: &[&str] = &[
    "__const",
    "__extension__",
    "__inline",
    "__inline__",
    "__restrict",
    "__restrict__",
    "__volatile__",
];

/// Compiler-extension spellings followed by a parenthesized argument
const ATTRIBUTE_WORDS: &[&str] = &[
    "__asm",
    "__asm__",
    "__attribute",
    "__attribute__",
    "__declspec",
    "asm",
];

#[derive(Debug, Default)]
struct Specifiers<'src> {
    has_type: bool,
    is_typedef: bool,
    is_static: bool,
    is_extern: bool,
    /// A struct/union/enum tag or body was written
    names_type: bool,
    defined_tag: Option<NameRef<'src>>,
}

struct Scanner<'i, 'src> {
    index: &'i SourceIndex<'src>,
    code: &'i [CodeToken<'src>],
}

impl<'src> Scanner<'_, 'src> {
    fn at(&self, i: usize, limit: usize) -> Option<&CodeToken<'src>> {
        if i < limit { self.code.get(i) } else { None }
    }

    /// Whether a declaration may start at `i`, and in which context
    fn statement_context(&self, i: usize) -> Option<DeclContext> {
        let token = &self.code[i];
        if !matches!(token.kind, TokenKind::Keyword | TokenKind::Identifier) {
            return None;
        }
        if matches!(
            self.index.block_kind_at(i),
            Some(BlockKind::Initializer | BlockKind::Enum)
        ) {
            return None;
        }
        let Some(prev) = i.checked_sub(1).map(|p| &self.code[p]) else {
            return Some(DeclContext::Statement);
        };
        if prev.is_punct(";") || prev.is_punct("{") || prev.is_punct("}") {
            Some(DeclContext::Statement)
        } else if prev.is_punct("(") && i >= 2 && self.code[i - 2].is_keyword("for") {
            Some(DeclContext::ForInit)
        } else {
            None
        }
    }

    fn parse_declaration(&self, start: usize, context: DeclContext) -> Option<Declaration<'src>> {
        let limit = self.code.len();
        let (spec, mut i) = self.parse_specifiers(start, limit)?;
        let mut declarators: Vec<Declarator<'src>> = Vec::new();
        let mut is_function_definition = false;

        let end = loop {
            let (declarator, next) = self.parse_declarator(i, limit)?;
            let Some(mut declarator) = declarator else {
                // `struct tag { ... };` or `struct tag;`
                let terminated = self.at(next, limit).is_some_and(|t| t.is_punct(";"));
                if declarators.is_empty() && spec.names_type && terminated {
                    break next;
                }
                return None;
            };
            i = next;

            let token = self.at(i, limit)?;
            if token.is_punct("=") {
                declarator.initialized = true;
                i = self.skip_expression(i + 1, limit)?;
            } else if token.is_punct(":") && context == DeclContext::Statement {
                i = self.skip_expression(i + 1, limit)?;
            }
            declarators.push(declarator);

            let token = self.at(i, limit)?;
            if token.is_punct(",") {
                i += 1;
            } else if token.is_punct(";") {
                break i;
            } else if token.is_punct("{")
                && context == DeclContext::Statement
                && !spec.is_typedef
                && declarators.len() == 1
                && declarators[0].is_function
            {
                is_function_definition = true;
                break i;
            } else {
                return None;
            }
        };

        Some(Declaration {
            context,
            start,
            end,
            scope: self.code[start].block,
            is_typedef: spec.is_typedef,
            is_static: spec.is_static,
            is_extern: spec.is_extern,
            is_function_definition,
            defined_tag: spec.defined_tag,
            declarators,
        })
    }

    fn parse_specifiers(&self, mut i: usize, limit: usize) -> Option<(Specifiers<'src>, usize)> {
        let mut spec = Specifiers::default();

        while let Some(token) = self.at(i, limit) {
            match token.kind {
                TokenKind::Keyword if STORAGE_WORDS.contains(&token.text) => {
                    match token.text {
                        "typedef" => spec.is_typedef = true,
                        "static" => spec.is_static = true,
                        "extern" => spec.is_extern = true,
                        _ => {}
                    }
                    i += 1;
                }
                TokenKind::Keyword
                    if token.text == "_Atomic"
                        && self.at(i + 1, limit).is_some_and(|t| t.is_punct("(")) =>
                {
                    i = self.after_partner(i + 1, limit)?;
                    spec.has_type = true;
                }
                TokenKind::Keyword if QUALIFIER_WORDS.contains(&token.text) => i += 1,
                TokenKind::Keyword if TYPE_WORDS.contains(&token.text) => {
                    spec.has_type = true;
                    i += 1;
                }
                TokenKind::Keyword if matches!(token.text, "struct" | "union" | "enum") => {
                    spec.has_type = true;
                    i += 1;
                    while self.is_attribute(i, limit) {
                        i = self.after_partner(i + 1, limit)?;
                    }
                    let mut tag = None;
                    if self.at(i, limit).is_some_and(|t| t.is_identifier()) {
                        tag = Some(name_ref(self.code, i));
                        spec.names_type = true;
                        i += 1;
                    }
                    if self.at(i, limit).is_some_and(|t| t.is_punct("{")) {
                        spec.defined_tag = tag;
                        spec.names_type = true;
                        i = self.after_partner(i, limit)?;
                    }
                }
                TokenKind::Keyword
                    if matches!(
                        token.text,
                        "typeof" | "typeof_unqual" | "_Alignas" | "alignas"
                    ) =>
                {
                    if matches!(token.text, "typeof" | "typeof_unqual") {
                        spec.has_type = true;
                    }
                    if !self.at(i + 1, limit).is_some_and(|t| t.is_punct("(")) {
                        return None;
                    }
                    i = self.after_partner(i + 1, limit)?;
                }
                TokenKind::Identifier if EXTENSION_WORDS.contains(&token.text) => i += 1,
                TokenKind::Identifier if self.is_attribute(i, limit) => {
                    i = self.after_partner(i + 1, limit)?;
                }
                TokenKind::Identifier if !spec.has_type => {
                    spec.has_type = true;
                    i += 1;
                }
                _ => break,
            }
        }

        spec.has_type.then_some((spec, i))
    }

    /// Parse one declarator; the name is `None` for an abstract declarator
    fn parse_declarator(
        &self,
        mut i: usize,
        limit: usize,
    ) -> Option<(Option<Declarator<'src>>, usize)> {
        while let Some(token) = self.at(i, limit) {
            if token.is_punct("*") || token.is_punct("^") {
                i += 1;
            } else if (token.kind == TokenKind::Keyword && QUALIFIER_WORDS.contains(&token.text))
                || (token.is_identifier() && EXTENSION_WORDS.contains(&token.text))
            {
                i += 1;
            } else if self.is_attribute(i, limit) {
                i = self.after_partner(i + 1, limit)?;
            } else {
                break;
            }
        }

        let mut name = None;
        let mut grouped = false;
        let mut is_array = false;
        match self.at(i, limit) {
            Some(token) if token.is_identifier() => {
                name = Some(name_ref(self.code, i));
                i += 1;
            }
            Some(token)
                if token.is_punct("(")
                    && self
                        .at(i + 1, limit)
                        .is_some_and(|t| t.is_punct("*") || t.is_punct("^")) =>
            {
                let close = token.partner.filter(|&c| c < limit)?;
                let (inner, next) = self.parse_declarator(i + 1, close)?;
                if next != close {
                    return None;
                }
                // `(*name)` must be followed by a suffix, which keeps
                // call statements like `free(*p);` out
                if !self
                    .at(close + 1, limit)
                    .is_some_and(|t| t.is_punct("(") || t.is_punct("["))
                {
                    return None;
                }
                if let Some(inner) = inner {
                    is_array = inner.is_array;
                    name = Some(inner.name);
                }
                grouped = true;
                i = close + 1;
            }
            _ => {}
        }

        let mut is_function = false;
        let mut params = None;
        while let Some(token) = self.at(i, limit) {
            if token.is_punct("[") {
                if !grouped {
                    is_array = true;
                }
                i = self.after_partner(i, limit)?;
            } else if token.is_punct("(") {
                let close = token.partner.filter(|&c| c < limit)?;
                if params.is_none() && !is_array {
                    is_function = !grouped;
                    params = Some((i, close));
                }
                i = close + 1;
            } else if self.is_attribute(i, limit) {
                i = self.after_partner(i + 1, limit)?;
            } else {
                break;
            }
        }

        let declarator = name.map(|name| Declarator {
            name,
            initialized: false,
            is_array,
            is_function,
            params,
        });
        Some((declarator, i))
    }

    fn parse_parameters(&self, open: usize, close: usize, out: &mut Vec<Declaration<'src>>) {
        let mut start = open + 1;
        while start < close {
            let end = self.segment_end(start, close);
            if let Some((spec, i)) = self.parse_specifiers(start, end)
                && let Some((Some(declarator), _)) = self.parse_declarator(i, end)
            {
                let params = declarator.params;
                out.push(Declaration {
                    context: DeclContext::Parameter,
                    start,
                    end,
                    scope: self.code[open].block,
                    is_typedef: false,
                    is_static: false,
                    is_extern: false,
                    is_function_definition: false,
                    defined_tag: spec.defined_tag,
                    declarators: vec![declarator],
                });
                // parameters of a function-pointer parameter
                if let Some((inner_open, inner_close)) = params {
                    self.parse_parameters(inner_open, inner_close, out);
                }
            }
            start = end + 1;
        }
    }

    /// Index of the next top-level `,` before `limit`, or `limit`
    fn segment_end(&self, mut i: usize, limit: usize) -> usize {
        while i < limit {
            let token = &self.code[i];
            if token.is_punct(",") {
                return i;
            }
            match token.partner {
                Some(close) if is_open_bracket(token) && close < limit => i = close + 1,
                _ => i += 1,
            }
        }
        limit
    }

    /// Skip an initializer or bit-field width up to the next top-level `,` or `;`
    fn skip_expression(&self, mut i: usize, limit: usize) -> Option<usize> {
        while let Some(token) = self.at(i, limit) {
            if token.is_punct(",") || token.is_punct(";") {
                return Some(i);
            }
            if is_open_bracket(token) {
                i = self.after_partner(i, limit)?;
            } else if token.is_punct(")") || token.is_punct("]") || token.is_punct("}") {
                return None;
            } else {
                i += 1;
            }
        }
        None
    }

    /// Index after the bracket matching the opener at `i`
    fn after_partner(&self, i: usize, limit: usize) -> Option<usize> {
        let close = self.at(i, limit)?.partner?;
        (close < limit).then_some(close + 1)
    }

    fn is_attribute(&self, i: usize, limit: usize) -> bool {
        self.at(i, limit)
            .is_some_and(|t| t.is_identifier() && ATTRIBUTE_WORDS.contains(&t.text))
            && self.at(i + 1, limit).is_some_and(|t| t.is_punct("("))
    }
}

fn is_open_bracket(token: &CodeToken<'_>) -> bool {
    token.kind == TokenKind::Punctuation && matches!(token.text, "(" | "[" | "{")
}

fn name_ref<'src>(code: &[CodeToken<'src>], i: usize) -> NameRef<'src> {
    let token = &code[i];
    NameRef {
        name: token.text,
        start: token.start,
        end: token.end,
        code_idx: i,
    }
}
