//! View renderers
//!
//! Each renderer turns a `ViewState` into a self-contained document. Writing it to a file
//! or stdout is the caller's job.

mod dot;
mod json;
mod text;

pub use dot::DotRenderer;
pub use json::JsonRenderer;
pub use text::TextRenderer;

use crate::domain::ports::ViewRenderer;

/// Look up a renderer by format name.
pub fn renderer_for(format: &str) -> Option<Box<dyn ViewRenderer>> {
    match format.to_ascii_lowercase().as_str() {
        "text" | "tree" => Some(Box::new(TextRenderer)),
        "dot" | "graphviz" => Some(Box::new(DotRenderer)),
        "json" => Some(Box::new(JsonRenderer)),
        _ => None,
    }
}
