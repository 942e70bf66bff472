//! Template sources
//!
//! A source turns a template path into raw template text. The loader never
//! touches storage directly, so the same cache works over the filesystem,
//! an in-memory table, or a network fetch.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{builtin_template, TemplateError, BUILTIN_TEMPLATES};

/// Template source trait
///
/// Implement this to serve template text from a new backing store.
#[async_trait]
pub trait TemplateSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Retrieve the raw template text for `path`
    async fn fetch(&self, path: &str) -> Result<String, TemplateError>;
}

// ============================================================================
// In-memory source
// ============================================================================

/// In-memory template table
///
/// Counts every fetch so callers can observe cache behaviour.
#[derive(Debug, Default)]
pub struct MemoryTemplateSource {
    templates: RwLock<HashMap<String, String>>,
    fetches: RwLock<HashMap<String, usize>>,
    total_fetches: AtomicUsize,
}

impl MemoryTemplateSource {
    /// Create an empty source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source pre-populated with the built-in templates
    #[must_use]
    pub fn with_builtin() -> Self {
        let source = Self::new();
        for (path, text) in BUILTIN_TEMPLATES {
            source.insert(*path, *text);
        }
        source
    }

    /// Add or replace a template
    pub fn insert(&self, path: impl Into<String>, text: impl Into<String>) {
        self.templates.write().insert(path.into(), text.into());
    }

    /// Builder form of [`insert`](Self::insert)
    #[must_use]
    pub fn with_template(self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(path, text);
        self
    }

    /// Number of fetches served for `path`
    #[must_use]
    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches.read().get(path).copied().unwrap_or(0)
    }

    /// Number of fetches served across all paths
    #[must_use]
    pub fn total_fetches(&self) -> usize {
        self.total_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TemplateSource for MemoryTemplateSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch(&self, path: &str) -> Result<String, TemplateError> {
        self.total_fetches.fetch_add(1, Ordering::SeqCst);
        *self.fetches.write().entry(path.to_string()).or_insert(0) += 1;

        self.templates
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| TemplateError::NotFound {
                path: path.to_string(),
            })
    }
}

// ============================================================================
// Filesystem source
// ============================================================================

/// Serves templates from a directory
///
/// Paths are resolved relative to the root and may not escape it.
#[derive(Clone, Debug)]
pub struct FileTemplateSource {
    root: PathBuf,
    builtin_fallback: bool,
}

impl FileTemplateSource {
    /// Create a source rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            builtin_fallback: false,
        }
    }

    /// Serve the built-in templates when a file is missing on disk
    #[must_use]
    pub fn with_builtin_fallback(mut self, enabled: bool) -> Self {
        self.builtin_fallback = enabled;
        self
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` under the root, rejecting traversal and absolute paths
    fn resolve(&self, path: &str) -> Result<PathBuf, TemplateError> {
        let relative = Path::new(path);
        let escapes = relative.components().any(|component| {
            matches!(
                component,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });

        if path.is_empty() || escapes {
            return Err(TemplateError::InvalidPath {
                path: path.to_string(),
            });
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl TemplateSource for FileTemplateSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn fetch(&self, path: &str) -> Result<String, TemplateError> {
        let full_path = self.resolve(path)?;

        match tokio::fs::read_to_string(&full_path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                if self.builtin_fallback {
                    if let Some(text) = builtin_template(path) {
                        tracing::debug!(path = %path, "Serving built-in template");
                        return Ok(text.to_string());
                    }
                }
                Err(TemplateError::NotFound {
                    path: path.to_string(),
                })
            }
            Err(source) => Err(TemplateError::Fetch {
                path: path.to_string(),
                source,
            }),
        }
    }
}
