//! Loading snippet stylesheets by name

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::stylesheet::Stylesheet;
use crate::error::{Error, Result};

/// Where snippet CSS comes from.
pub trait StylesheetSource {
    /// The CSS text of snippet `name`.
    fn load(&self, name: &str) -> Result<String>;
}

/// Snippets stored as `<dir>/<name>.css`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetDirectory {
    dir: PathBuf,
}

impl SnippetDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The snippet folder of an Obsidian vault.
    pub fn for_vault(vault: &Path) -> Self {
        Self::new(vault.join(".obsidian").join("snippets"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.css", name))
    }

    /// Names of the snippets present in the directory, sorted.
    pub fn available(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.extension()
                    .and_then(|ext| ext.to_str())
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("css"))
            })
            .filter_map(|path| {
                path.file_stem()
                    .and_then(|stem| stem.to_str())
                    .map(String::from)
            })
            .collect();
        names.sort();
        Ok(names)
    }
}

impl StylesheetSource for SnippetDirectory {
    fn load(&self, name: &str) -> Result<String> {
        let path = self.path_for(name);
        debug!("Loading snippet '{}' from {}", name, path.display());
        fs::read_to_string(&path).map_err(|e| Error::Stylesheet {
            name: name.to_string(),
            source: Box::new(e),
        })
    }
}

/// Snippets held in memory, for embedders that already have the CSS.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnippets {
    sheets: HashMap<String, String>,
}

impl InMemorySnippets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, css: impl Into<String>) -> Self {
        self.insert(name, css);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, css: impl Into<String>) {
        self.sheets.insert(name.into(), css.into());
    }
}

impl StylesheetSource for InMemorySnippets {
    fn load(&self, name: &str) -> Result<String> {
        self.sheets.get(name).cloned().ok_or_else(|| Error::Stylesheet {
            name: name.to_string(),
            source: format!("no snippet named '{}'", name).into(),
        })
    }
}

/// Load and parse `names` in order. A snippet that fails to load is logged
/// and left out.
pub fn load_stylesheets(source: &dyn StylesheetSource, names: &[String]) -> Vec<Stylesheet> {
    names
        .iter()
        .filter_map(|name| match source.load(name) {
            Ok(css) => Some(Stylesheet::parse(name.as_str(), &css)),
            Err(e) => {
                warn!("Skipping stylesheet: {}", e);
                None
            }
        })
        .collect()
}
