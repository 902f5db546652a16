//! Canonical public API rendering for TypeScript declaration files.
//!
//! The exports of an entry `.d.ts` file are resolved through re-exports and
//! rendered as text: private members and comments are removed, class and
//! interface members are put in a fixed order, and entries are sorted by
//! name. Comparing the output across releases shows API changes as text
//! diffs.
//!
//! # Examples
//!
//! ```no_run
//! use dtsguard_public_api::{Options, public_api};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), dtsguard_public_api::PublicApiError> {
//! let options = Options::new().with_strip_export_pattern("^ɵ")?.allow_module_identifier("React");
//! let api = public_api(Path::new("dist/index.d.ts"), &options)?;
//! println!("{api}");
//! # Ok(())
//! # }
//! ```

mod api;
mod assembler;
mod checker;
mod collector;
mod config;
mod error;
mod golden;
mod locator;
mod reporter;
mod resolver;
mod sanitizer;
mod types;

// Re-export public API
pub use api::{public_api, public_api_internal, public_api_report};
pub use assembler::assemble;
pub use checker::run_public_api_check;
pub use config::{Config, Options};
pub use error::{PublicApiError, Result};
pub use locator::locate_export_statement;
pub use reporter::{print_json, print_reports, print_verification, print_warnings, print_written};
pub use resolver::resolve_exports;
pub use sanitizer::Sanitizer;
pub use types::{ApiEntry, ApiReport, EntryResult, RunResult, Verification, Warning, WarningKind};
