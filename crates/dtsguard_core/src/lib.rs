//! Front end for dtsguard.
//!
//! This crate turns TypeScript declaration files into the inputs of the public
//! API pipeline:
//! - Parsing `.d.ts` files with oxc and lowering them into an immutable,
//!   full-fidelity [`SyntaxTree`]
//! - Building each module's symbol table (exports, local bindings, aliases)
//! - Resolving relative module specifiers and loading every reachable file
//! - Abstracting source access behind [`SourceHost`] so tests can use
//!   in-memory files

mod constants;
mod error;
mod host;
mod lower;
mod parser;
mod program;
mod resolver;
mod symbols;
mod tree;
mod trivia;

// Re-export public API
pub use constants::{DECLARATION_EXTENSIONS, INDEX_FILES, is_declaration_file};
pub use error::FrontEndError;
pub use host::{FsHost, MemoryHost, SourceHost};
pub use program::{FileId, FrontEnd, FrontEndConfig, OxcFrontEnd, Program, ResolutionMode, SourceFile};
pub use resolver::{is_relative, resolve};
pub use symbols::{AliasTarget, ModuleSymbols, Symbol, SymbolKind};
pub use tree::{NodeFlags, NodeId, NodeKind, SyntaxNode, SyntaxTree};
pub use trivia::comment_ranges;
