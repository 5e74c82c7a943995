//! Mapping from source paths to the package/module namespace.

use serde::{Deserialize, Serialize};

/// How file locations translate into package chains and module names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamespaceScheme {
    /// Package that prefixes every FQN (usually the project name).
    pub root_package: Option<String>,
    /// File stems that stand for their directory's package (`__init__`, `mod`, `index`).
    pub init_stems: Vec<String>,
    /// Path prefixes stripped before mapping (`src`, `lib`).
    pub source_roots: Vec<String>,
}

impl Default for NamespaceScheme {
    fn default() -> Self {
        Self {
            root_package: None,
            init_stems: vec!["__init__".to_string()],
            source_roots: Vec::new(),
        }
    }
}

/// Namespace location of one source unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModulePath {
    /// Package chain from the top (root package included when configured).
    pub packages: Vec<String>,
    /// Module name; `None` for init files, whose definitions live in the innermost package.
    pub module: Option<String>,
}

impl NamespaceScheme {
    pub fn with_root_package(mut self, root: impl Into<String>) -> Self {
        self.root_package = Some(root.into());
        self
    }

    /// Map a relative source path to its namespace location.
    ///
    /// Segment validity (non-empty, no `.`) is enforced at registration time.
    pub fn module_path(&self, path: &str) -> ModulePath {
        let normalized = path.replace('\\', "/");
        let mut rel = normalized.trim_start_matches("./").trim_start_matches('/');
        for root in &self.source_roots {
            let root = root.trim_matches('/');
            if root.is_empty() {
                continue;
            }
            if let Some(rest) = rel.strip_prefix(root).and_then(|r| r.strip_prefix('/')) {
                rel = rest;
                break;
            }
        }

        let mut segments: Vec<&str> = rel.split('/').filter(|s| !s.is_empty()).collect();
        let file = segments.pop().unwrap_or_default();
        let stem = match file.rfind('.') {
            Some(pos) if pos > 0 => &file[..pos],
            _ => file,
        };

        let mut packages: Vec<String> = self.root_package.iter().cloned().collect();
        packages.extend(segments.iter().map(|s| s.to_string()));

        let module = if self.init_stems.iter().any(|s| s == stem) && !packages.is_empty() {
            None
        } else {
            Some(stem.to_string())
        };

        ModulePath { packages, module }
    }

    /// Prefix `fqn` with the root package unless it already carries it.
    pub fn qualify(&self, fqn: &str) -> Option<String> {
        let root = self.root_package.as_deref()?;
        if fqn == root || fqn.starts_with(&format!("{root}.")) {
            None
        } else {
            Some(format!("{root}.{fqn}"))
        }
    }
}
