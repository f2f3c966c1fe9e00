#![forbid(unsafe_code)]

//! Lexical layer: tokens, line/column mapping and the line/block index
//!
//! Source text flows through here in one direction: `lexer` turns bytes into
//! classified tokens, and `index` derives line and brace structure from them.
//! Everything produced is immutable and shared read-only by the detectors.

pub mod index;
pub mod lexer;
pub mod source_map;
pub mod token;

pub use index::{Block, BlockId, BlockKind, CodeToken, SourceIndex, SourceLine};
pub use lexer::{Lexer, TokenStream, tokenize};
pub use source_map::SourceMap;
pub use token::{Directive, MacroName, Position, Token, TokenKind};
