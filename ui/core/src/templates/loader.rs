//! Template loader with a per-path compile cache
//!
//! The first request for a path fetches and compiles it; every later request
//! returns the same compiled template. Two concurrent first requests for one
//! path may both fetch. Compilation is deterministic, so the later cache
//! write simply replaces an identical entry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use minijinja::{AutoEscape, Environment};
use parking_lot::RwLock;
use serde_json::Value;

use super::{TemplateData, TemplateError, TemplateSource};

/// Loader behaviour switches
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TemplateOptions {
    /// Let templates read inherited data properties
    ///
    /// Only enable this where every data object comes from trusted,
    /// same-origin code. Untrusted data must never be rendered with it on.
    pub allow_prototype_access: bool,
}

/// A compiled template, ready to render
pub struct CompiledTemplate {
    path: String,
    env: Environment<'static>,
}

impl CompiledTemplate {
    /// Compile `source` as the template for `path`
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Compile` when the source has a syntax error.
    pub fn compile(path: &str, source: String) -> Result<Self, TemplateError> {
        let mut env = Environment::new();
        // Handlebars semantics: `{{ value }}` is HTML-escaped regardless of path
        env.set_auto_escape_callback(|_| AutoEscape::Html);
        env.add_template_owned(path.to_string(), source)
            .map_err(|e| TemplateError::Compile {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            path: path.to_string(),
            env,
        })
    }

    /// Path this template was compiled from
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Render against an already-resolved context
    ///
    /// # Errors
    ///
    /// Returns `TemplateError::Render` if evaluation fails.
    pub fn render(&self, context: &Value) -> Result<String, TemplateError> {
        let render_error = |e: minijinja::Error| TemplateError::Render {
            path: self.path.clone(),
            message: e.to_string(),
        };

        let template = self.env.get_template(&self.path).map_err(render_error)?;
        template.render(context).map_err(render_error)
    }
}

impl fmt::Debug for CompiledTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledTemplate")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

struct LoaderInner {
    source: Arc<dyn TemplateSource>,
    cache: RwLock<HashMap<String, Arc<CompiledTemplate>>>,
    options: TemplateOptions,
}

/// Fetches, compiles and memoizes templates by path
///
/// Cheap to clone; clones share one cache.
#[derive(Clone)]
pub struct TemplateLoader {
    inner: Arc<LoaderInner>,
}

impl fmt::Debug for TemplateLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateLoader")
            .field("source", &self.inner.source.name())
            .field("cached", &self.inner.cache.read().len())
            .field("options", &self.inner.options)
            .finish()
    }
}

impl TemplateLoader {
    /// Create a loader with default options
    pub fn new(source: Arc<dyn TemplateSource>) -> Self {
        Self::with_options(source, TemplateOptions::default())
    }

    /// Create a loader with explicit options
    pub fn with_options(source: Arc<dyn TemplateSource>, options: TemplateOptions) -> Self {
        Self {
            inner: Arc::new(LoaderInner {
                source,
                cache: RwLock::new(HashMap::new()),
                options,
            }),
        }
    }

    /// Loader options
    #[must_use]
    pub fn options(&self) -> TemplateOptions {
        self.inner.options
    }

    /// Get the compiled template for `path`, fetching it on first use
    ///
    /// # Errors
    ///
    /// Propagates fetch and compile failures. Nothing is cached on failure.
    pub async fn get_template(&self, path: &str) -> Result<Arc<CompiledTemplate>, TemplateError> {
        if let Some(compiled) = self.inner.cache.read().get(path) {
            tracing::trace!(path = %path, "Template cache hit");
            return Ok(Arc::clone(compiled));
        }

        tracing::debug!(
            path = %path,
            source = self.inner.source.name(),
            "Template cache miss, fetching"
        );
        let text = self.inner.source.fetch(path).await?;
        let compiled = Arc::new(CompiledTemplate::compile(path, text)?);

        self.inner
            .cache
            .write()
            .insert(path.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Fetch and cache a batch of templates
    ///
    /// Resolves with the loaded paths once every template is cached.
    ///
    /// # Errors
    ///
    /// Fails on the first template that cannot be loaded. Templates that did
    /// load stay cached, but the caller is not told which ones.
    pub async fn load_templates<S: AsRef<str>>(
        &self,
        paths: &[S],
    ) -> Result<Vec<String>, TemplateError> {
        let loads = paths.iter().map(|path| self.get_template(path.as_ref()));
        futures::future::try_join_all(loads).await?;

        Ok(paths.iter().map(|p| p.as_ref().to_string()).collect())
    }

    /// Resolve the template for `path` and render it against `data`
    ///
    /// # Errors
    ///
    /// Propagates fetch, compile and render failures.
    pub async fn render_template(
        &self,
        path: &str,
        data: &TemplateData,
    ) -> Result<String, TemplateError> {
        let compiled = self.get_template(path).await?;
        compiled.render(&data.resolve(self.inner.options.allow_prototype_access))
    }

    /// Whether `path` has been compiled and cached
    #[must_use]
    pub fn is_cached(&self, path: &str) -> bool {
        self.inner.cache.read().contains_key(path)
    }

    /// Paths currently cached, sorted
    #[must_use]
    pub fn cached_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.inner.cache.read().keys().cloned().collect();
        paths.sort();
        paths
    }
}
