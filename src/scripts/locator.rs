//! Script resolution.
//!
//! Resolves a script name to its statement sequence. Two sources are
//! consulted in order: scripts compiled into the binary (registered by
//! embedding applications for their built-in steps) and an ordered
//! filesystem search path from configuration. A name that resolves
//! nowhere is a configuration error, raised before any statement runs.

use std::collections::HashMap;
use std::path::PathBuf;

use crate::error::AppError;
use crate::scripts::Script;

/// Resolves script names to [`Script`]s.
#[derive(Debug, Clone, Default)]
pub struct ScriptLocator {
    embedded: HashMap<String, String>,
    search_paths: Vec<PathBuf>,
}

impl ScriptLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers compiled-in scripts (name → SQL text). Embedded scripts
    /// shadow filesystem scripts of the same name.
    pub fn with_embedded<I, K, V>(mut self, scripts: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.embedded
            .extend(scripts.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Appends a directory to the filesystem search path.
    pub fn with_search_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.search_paths.push(dir.into());
        self
    }

    /// Appends several directories to the filesystem search path.
    pub fn with_search_paths<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.search_paths.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Resolves `name` to a parsed script.
    pub fn locate(&self, name: &str) -> Result<Script, AppError> {
        if let Some(sql) = self.embedded.get(name) {
            return Ok(Script::parse(name, sql));
        }

        for dir in &self.search_paths {
            let candidate = dir.join(name);
            if candidate.is_file() {
                let sql =
                    std::fs::read_to_string(&candidate).map_err(|source| AppError::ScriptRead {
                        name: name.to_string(),
                        path: candidate.clone(),
                        source,
                    })?;
                return Ok(Script::parse(name, &sql));
            }
        }

        Err(AppError::ScriptNotFound {
            name: name.to_string(),
            searched: self.searched_description(),
        })
    }

    fn searched_description(&self) -> String {
        let mut sources = vec![format!("{} embedded scripts", self.embedded.len())];
        sources.extend(
            self.search_paths
                .iter()
                .map(|p| p.display().to_string()),
        );
        sources.join(", ")
    }
}
