//! JSON syntax-index adapter
//!
//! Reads what a language front end exported: either one `SyntaxIndex` file or a directory
//! tree of per-file `*.syntax.json` documents.

mod provider;

pub use provider::{JsonUnitProvider, SYNTAX_FILE_SUFFIX};
