use crate::domain::ports::ViewRenderer;
use crate::domain::view::ViewState;
use anyhow::{Context, Result};

pub struct JsonRenderer;

impl ViewRenderer for JsonRenderer {
    fn name(&self) -> &'static str {
        "json"
    }

    fn render(&self, view: &ViewState) -> Result<String> {
        serde_json::to_string_pretty(view).context("Failed to serialize view")
    }
}
