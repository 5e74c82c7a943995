use crate::domain::ports::SourceUnitProvider;
use crate::domain::semantic::{SourceUnit, SyntaxIndex};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Suffix of per-file documents in a syntax directory.
pub const SYNTAX_FILE_SUFFIX: &str = ".syntax.json";

/// JSON source-unit adapter
pub struct JsonUnitProvider {
    pub path: PathBuf,
}

impl JsonUnitProvider {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Load everything, keeping the project name when a single index file carries one.
    pub fn load_index(&self) -> Result<SyntaxIndex> {
        if self.path.is_dir() {
            let units = load_directory(&self.path)?;
            return Ok(SyntaxIndex {
                project_name: None,
                units,
            });
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read syntax index: {}", self.path.display()))?;
        let index: SyntaxIndex = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse syntax index: {}", self.path.display()))?;
        tracing::info!(
            path = %self.path.display(),
            units = index.units.len(),
            "syntax index loaded"
        );
        Ok(index)
    }
}

impl SourceUnitProvider for JsonUnitProvider {
    fn load(&self) -> Result<Vec<SourceUnit>> {
        Ok(self.load_index()?.units)
    }
}

fn load_directory(root: &Path) -> Result<Vec<SourceUnit>> {
    let mut units = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
    {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if !file_name.ends_with(SYNTAX_FILE_SUFFIX) {
            continue;
        }

        let content = std::fs::read_to_string(entry.path())
            .with_context(|| format!("Failed to read syntax file: {}", entry.path().display()))?;
        let mut unit: SourceUnit = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse syntax file: {}", entry.path().display()))?;

        // Without an explicit path the document stands for `<relative path>` minus the suffix.
        if unit.path.is_empty() {
            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            let relative = relative.to_string_lossy().replace('\\', "/");
            unit.path = relative
                .strip_suffix(SYNTAX_FILE_SUFFIX)
                .unwrap_or(&relative)
                .to_string();
        }
        units.push(unit);
    }

    tracing::info!(path = %root.display(), units = units.len(), "syntax directory loaded");
    Ok(units)
}
