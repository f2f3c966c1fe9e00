#![forbid(unsafe_code)]

//! Line and block structure derived from a token stream
//!
//! The index records, for every physical line, its leading whitespace and the
//! brace depth at its start, and keeps an arena of brace-delimited blocks.
//! Blocks refer to their parent by `BlockId` rather than by reference, so the
//! nesting tree has no ownership cycles. Unbalanced braces are tolerated: a
//! stray `}` is ignored and an unclosed `{` stays open to the end of input.

use crate::syntax::lexer::TokenStream;
use crate::syntax::token::{Position, Token, TokenKind};
use std::ops::Deref;

/// Arena index of a block; ids increase in order of the opening brace
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(usize);

impl BlockId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// What a pair of braces delimits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    /// Function body, control-statement body or bare `{ }` block
    Compound,
    /// Body of a `switch`
    Switch,
    /// Member list of a `struct` or `union`
    Aggregate,
    /// Enumerator list of an `enum`
    Enum,
    /// Brace initializer or compound literal
    Initializer,
}

impl BlockKind {
    /// Blocks that hold statements (and therefore local variables)
    pub fn is_scope(self) -> bool {
        matches!(self, BlockKind::Compound | BlockKind::Switch)
    }
}

/// A brace-delimited region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub parent: Option<BlockId>,
    /// Nesting depth of the block's contents; top-level blocks have depth 1
    pub depth: usize,
    pub open: Position,
    /// `None` when the block is never closed
    pub close: Option<Position>,
    /// Index of the `{` in `SourceIndex::code`
    pub open_code: usize,
    /// Index of the matching `}` in `SourceIndex::code`
    pub close_code: Option<usize>,
}

impl Block {
    /// Whether the code token at `code_idx` lies strictly inside the braces
    pub fn contains_code(&self, code_idx: usize) -> bool {
        code_idx > self.open_code && self.close_code.is_none_or(|close| code_idx < close)
    }
}

/// One physical source line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine<'src> {
    pub number: u32,
    /// Line text without its terminator
    pub text: &'src str,
    /// Leading run of spaces and tabs, verbatim
    pub indent: &'src str,
    /// Brace depth at the start of the line
    pub depth: usize,
    /// First non-whitespace token starting on this line (index into the token stream)
    pub first_token: Option<usize>,
    /// First code token starting on this line (index into `SourceIndex::code`)
    pub first_code: Option<usize>,
    /// Line begins inside a token opened on an earlier line (block comment,
    /// continued directive or spliced literal)
    pub continues_token: bool,
}

impl SourceLine<'_> {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Number of whitespace characters in the indentation run
    pub fn indent_len(&self) -> usize {
        self.indent.len()
    }

    pub fn indent_has_tabs(&self) -> bool {
        self.indent.contains('\t')
    }

    pub fn indent_has_spaces(&self) -> bool {
        self.indent.contains(' ')
    }

    /// Indentation mixes tabs and spaces
    pub fn indent_is_mixed(&self) -> bool {
        self.indent_has_tabs() && self.indent_has_spaces()
    }
}

/// A code token annotated with its block context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeToken<'src> {
    pub token: Token<'src>,
    /// Number of enclosing open blocks; a brace counts toward its outer block
    pub depth: usize,
    /// Innermost enclosing block
    pub block: Option<BlockId>,
    /// Index of the matching bracket for `(`/`)`, `[`/`]`, `{`/`}`
    pub partner: Option<usize>,
}

impl<'src> Deref for CodeToken<'src> {
    type Target = Token<'src>;

    fn deref(&self) -> &Self::Target {
        &self.token
    }
}

/// Line/block index over one token stream
#[derive(Debug, Clone)]
pub struct SourceIndex<'src> {
    lines: Vec<SourceLine<'src>>,
    blocks: Vec<Block>,
    code: Vec<CodeToken<'src>>,
}

impl<'src> SourceIndex<'src> {
    /// Build the index for a (possibly partial) token stream
    pub fn build(stream: &TokenStream<'src>) -> Self {
        let mut builder = IndexBuilder::default();
        builder.scan_tokens(stream);
        let lines = builder.build_lines(stream);
        SourceIndex {
            lines,
            blocks: builder.blocks,
            code: builder.code,
        }
    }

    pub fn lines(&self) -> &[SourceLine<'src>] {
        &self.lines
    }

    /// Line by 1-indexed number
    pub fn line(&self, number: u32) -> Option<&SourceLine<'src>> {
        (number as usize)
            .checked_sub(1)
            .and_then(|idx| self.lines.get(idx))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id.0]
    }

    /// Tokens the C grammar sees, in source order
    pub fn code(&self) -> &[CodeToken<'src>] {
        &self.code
    }

    /// Block whose `{` is the code token at `code_idx`
    pub fn block_opened_at(&self, code_idx: usize) -> Option<&Block> {
        self.blocks
            .binary_search_by_key(&code_idx, |b| b.open_code)
            .ok()
            .map(|i| &self.blocks[i])
    }

    /// Code token before `idx`, if any
    pub fn prev_code(&self, idx: usize) -> Option<&CodeToken<'src>> {
        idx.checked_sub(1).and_then(|i| self.code.get(i))
    }

    /// Kind of the innermost block around a code token (`None` at file scope)
    pub fn block_kind_at(&self, code_idx: usize) -> Option<BlockKind> {
        self.code[code_idx].block.map(|id| self.block(id).kind)
    }

    /// Walk from a block outward to the top level
    pub fn ancestors(&self, id: BlockId) -> impl Iterator<Item = &Block> + '_ {
        std::iter::successors(Some(self.block(id)), move |b| b.parent.map(|p| self.block(p)))
    }
}

#[derive(Default)]
struct IndexBuilder<'src> {
    blocks: Vec<Block>,
    code: Vec<CodeToken<'src>>,
    /// Open blocks, innermost last
    open_blocks: Vec<BlockId>,
    parens: Vec<usize>,
    brackets: Vec<usize>,
}

impl<'src> IndexBuilder<'src> {
    fn scan_tokens(&mut self, stream: &TokenStream<'src>) {
        for token in stream.iter().filter(|t| !t.kind.is_trivia()) {
            let idx = self.code.len();
            let depth = self.open_blocks.len();
            let block = self.open_blocks.last().copied();
            self.code.push(CodeToken {
                token: *token,
                depth,
                block,
                partner: None,
            });

            if token.kind != TokenKind::Punctuation {
                continue;
            }
            match token.text {
                "(" => self.parens.push(idx),
                "[" => self.brackets.push(idx),
                ")" => {
                    if let Some(open) = self.parens.pop() {
                        self.pair(open, idx);
                    }
                }
                "]" => {
                    if let Some(open) = self.brackets.pop() {
                        self.pair(open, idx);
                    }
                }
                "{" => self.open_block(idx),
                "}" => self.close_block(idx),
                _ => {}
            }
        }
    }

    fn pair(&mut self, open: usize, close: usize) {
        self.code[open].partner = Some(close);
        self.code[close].partner = Some(open);
    }

    fn open_block(&mut self, idx: usize) {
        let id = BlockId(self.blocks.len());
        let kind = self.classify(idx);
        self.blocks.push(Block {
            id,
            kind,
            parent: self.open_blocks.last().copied(),
            depth: self.open_blocks.len() + 1,
            open: self.code[idx].start,
            close: None,
            open_code: idx,
            close_code: None,
        });
        self.open_blocks.push(id);
    }

    fn close_block(&mut self, idx: usize) {
        // unmatched `}` is ignored
        let Some(id) = self.open_blocks.pop() else {
            return;
        };
        let open = self.blocks[id.0].open_code;
        self.blocks[id.0].close = Some(self.code[idx].start);
        self.blocks[id.0].close_code = Some(idx);
        self.pair(open, idx);
        self.code[idx].depth = self.open_blocks.len();
        self.code[idx].block = self.open_blocks.last().copied();
    }

    /// Decide what the `{` at `idx` opens from the tokens before it
    fn classify(&self, idx: usize) -> BlockKind {
        if let Some(&outer) = self.open_blocks.last()
            && self.blocks[outer.0].kind == BlockKind::Initializer
        {
            return BlockKind::Initializer;
        }
        let Some(prev) = idx.checked_sub(1).map(|i| &self.code[i]) else {
            return BlockKind::Compound;
        };
        let before_prev = idx.checked_sub(2).map(|i| &self.code[i]);

        match prev.kind {
            TokenKind::Keyword => match prev.text {
                "struct" | "union" => BlockKind::Aggregate,
                "enum" => BlockKind::Enum,
                _ => BlockKind::Compound,
            },
            TokenKind::Identifier => match before_prev {
                Some(t) if t.is_keyword("struct") || t.is_keyword("union") => {
                    BlockKind::Aggregate
                }
                Some(t) if t.is_keyword("enum") => BlockKind::Enum,
                _ => BlockKind::Compound,
            },
            TokenKind::Punctuation => match prev.text {
                "=" | "," | "?" => BlockKind::Initializer,
                ")" => self.classify_after_paren(idx - 1),
                _ => BlockKind::Compound,
            },
            _ => BlockKind::Compound,
        }
    }

    /// `) {` opens a body after a call-like head (`f(...)`, `if (...)`), but a
    /// compound literal after a cast-like `(type)`
    fn classify_after_paren(&self, close: usize) -> BlockKind {
        let Some(open) = self.code[close].partner else {
            return BlockKind::Compound;
        };
        match open.checked_sub(1).map(|i| &self.code[i]) {
            Some(head) if head.is_keyword("switch") => BlockKind::Switch,
            Some(head) if head.is_identifier() => BlockKind::Compound,
            Some(head)
                if head.kind == TokenKind::Keyword
                    && matches!(head.text, "if" | "for" | "while") =>
            {
                BlockKind::Compound
            }
            // function returning a function pointer: `(*name(args))(params) {`
            Some(head) if head.is_punct(")") => BlockKind::Compound,
            None => BlockKind::Compound,
            Some(_) => BlockKind::Initializer,
        }
    }

    fn build_lines(&self, stream: &TokenStream<'src>) -> Vec<SourceLine<'src>> {
        let source = stream.source();
        let map = stream.source_map();
        let line_count = map.line_count();

        let mut lines: Vec<SourceLine<'src>> = (1..=line_count as u32)
            .map(|number| {
                let text = map
                    .line_range(source, number)
                    .map_or("", |range| &source[range]);
                let indent_end = text
                    .find(|c: char| c != ' ' && c != '\t')
                    .unwrap_or(text.len());
                SourceLine {
                    number,
                    text,
                    indent: &text[..indent_end],
                    depth: 0,
                    first_token: None,
                    first_code: None,
                    continues_token: false,
                }
            })
            .collect();

        for (i, token) in stream.iter().enumerate() {
            if token.kind == TokenKind::Whitespace {
                continue;
            }
            let start_line = token.start.line as usize;
            if let Some(line) = lines.get_mut(start_line - 1)
                && line.first_token.is_none()
            {
                line.first_token = Some(i);
            }
            // lines whose start is covered by this token
            let last = if token.end.column > 1 {
                token.end.line
            } else {
                token.end.line.saturating_sub(1)
            } as usize;
            for line in lines.iter_mut().take(last).skip(start_line) {
                line.continues_token = true;
            }
        }

        for (idx, code) in self.code.iter().enumerate() {
            if let Some(line) = lines.get_mut(code.start.line as usize - 1)
                && line.first_code.is_none()
            {
                line.first_code = Some(idx);
            }
        }

        // depth at line start: depth of the first code token on or after the line
        let mut next_code = 0;
        let mut depth = 0;
        for line in &mut lines {
            while next_code < self.code.len()
                && (self.code[next_code].start.line as usize) < line.number as usize
            {
                depth = self.depth_after(next_code);
                next_code += 1;
            }
            line.depth = match self.code.get(next_code) {
                Some(code) if code.start.line == line.number => self.depth_before(next_code),
                _ => depth,
            };
        }

        lines
    }

    /// Open-block count just before the code token at `idx` is processed
    fn depth_before(&self, idx: usize) -> usize {
        let code = &self.code[idx];
        if code.is_punct("}") && code.partner.is_some() {
            code.depth + 1
        } else {
            code.depth
        }
    }

    /// Open-block count just after the code token at `idx` is processed
    fn depth_after(&self, idx: usize) -> usize {
        let code = &self.code[idx];
        if code.is_punct("{") {
            code.depth + 1
        } else {
            code.depth
        }
    }
}
