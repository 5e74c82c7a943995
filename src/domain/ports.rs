use crate::domain::semantic::SourceUnit;
use crate::domain::view::ViewState;
use anyhow::Result;

/// Parsed-syntax source port (implemented by a language front end or a file adapter)
pub trait SourceUnitProvider {
    fn load(&self) -> Result<Vec<SourceUnit>>;
}

/// View presentation port
pub trait ViewRenderer: Send + Sync {
    /// Short format name (`text`, `dot`, `json`).
    fn name(&self) -> &'static str;

    fn render(&self, view: &ViewState) -> Result<String>;
}
