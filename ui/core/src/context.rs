//! Shared UI context
//!
//! Bundles the process-scoped collaborators every window needs: the window
//! registry, the template loader, the surface and the configuration. Windows
//! receive a context at construction instead of reaching for globals.

use std::sync::Arc;

use crate::config::{ConfigError, UiConfig};
use crate::registry::WindowRegistry;
use crate::surface::{HeadlessSurface, Surface};
use crate::templates::{MemoryTemplateSource, TemplateLoader, TemplateSource};

/// Collaborators shared by all windows of one UI
#[derive(Clone)]
pub struct UiContext {
    /// Open window tracking and z-order
    pub registry: WindowRegistry,
    /// Template cache
    pub templates: TemplateLoader,
    /// Document bridge
    pub surface: Arc<dyn Surface>,
    /// Active configuration
    pub config: Arc<UiConfig>,
}

impl UiContext {
    /// Build a context from configuration, a template source and a surface
    ///
    /// The configuration is taken as is; an unusable z-order policy is
    /// normalized by the registry. Use [`try_new`](Self::try_new) to reject
    /// invalid configuration instead.
    pub fn new(
        config: UiConfig,
        source: Arc<dyn TemplateSource>,
        surface: Arc<dyn Surface>,
    ) -> Self {
        Self {
            registry: WindowRegistry::with_policy(config.windows.z_policy()),
            templates: TemplateLoader::with_options(source, config.templates.loader_options()),
            surface,
            config: Arc::new(config),
        }
    }

    /// Build a context after validating the configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if [`UiConfig::validate`] fails.
    pub fn try_new(
        config: UiConfig,
        source: Arc<dyn TemplateSource>,
        surface: Arc<dyn Surface>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config, source, surface))
    }

    /// Headless context over a template source
    ///
    /// Returns the surface as well so callers can inspect what was drawn.
    pub fn headless(
        config: UiConfig,
        source: Arc<dyn TemplateSource>,
    ) -> (Self, Arc<HeadlessSurface>) {
        let surface = Arc::new(HeadlessSurface::new());
        (Self::new(config, source, surface.clone()), surface)
    }

    /// Headless context serving only the built-in templates
    #[must_use]
    pub fn builtin_headless() -> (Self, Arc<HeadlessSurface>) {
        Self::headless(
            UiConfig::default(),
            Arc::new(MemoryTemplateSource::with_builtin()),
        )
    }
}

impl std::fmt::Debug for UiContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UiContext")
            .field("registry", &self.registry)
            .field("templates", &self.templates)
            .finish_non_exhaustive()
    }
}
