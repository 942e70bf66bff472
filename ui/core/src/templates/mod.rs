//! Template Loading and Caching
//!
//! Fetches template sources, compiles them once per path, and renders them
//! against data to produce window markup.
//!
//! # Architecture
//!
//! ```text
//!   render_template(path, data)
//!             │
//!   ┌─────────▼──────────┐   miss   ┌────────────────┐
//!   │   TemplateLoader   ├─────────►│ TemplateSource │  (files, memory, network)
//!   │ path → compiled fn │◄─────────┤   fetch(path)  │
//!   └─────────┬──────────┘  source  └────────────────┘
//!             │ hit
//!   ┌─────────▼──────────┐
//!   │  CompiledTemplate  │  minijinja, Handlebars-style `{{ name }}` output
//!   └────────────────────┘
//! ```
//!
//! Compiled templates live for the lifetime of the loader. Template paths are
//! a finite, developer-controlled set, so there is no eviction.

mod data;
mod loader;
mod source;

use thiserror::Error;

pub use data::TemplateData;
pub use loader::{CompiledTemplate, TemplateLoader, TemplateOptions};
pub use source::{FileTemplateSource, MemoryTemplateSource, TemplateSource};

/// Path of the outer window shell template
pub const WINDOW_SHELL_TEMPLATE: &str = "templates/app-window.html";

/// Path of the dialog body template
pub const DIALOG_TEMPLATE: &str = "templates/hud/dialog.html";

/// Templates compiled into the crate, keyed by path
pub const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        WINDOW_SHELL_TEMPLATE,
        include_str!("../../templates/app-window.html"),
    ),
    (DIALOG_TEMPLATE, include_str!("../../templates/hud/dialog.html")),
];

/// Look up a built-in template source by path
#[must_use]
pub fn builtin_template(path: &str) -> Option<&'static str> {
    BUILTIN_TEMPLATES
        .iter()
        .find(|(builtin, _)| *builtin == path)
        .map(|(_, source)| *source)
}

/// Errors raised while resolving or rendering a template
#[derive(Debug, Error)]
pub enum TemplateError {
    /// No template exists at the path
    #[error("template not found: {path}")]
    NotFound {
        /// Requested template path
        path: String,
    },

    /// The path escapes the template root or is otherwise malformed
    #[error("invalid template path: {path}")]
    InvalidPath {
        /// Requested template path
        path: String,
    },

    /// Retrieval failed for a reason other than a missing file
    #[error("failed to fetch template {path}: {source}")]
    Fetch {
        /// Requested template path
        path: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The template source did not compile
    #[error("failed to compile template {path}: {message}")]
    Compile {
        /// Template path
        path: String,
        /// Engine diagnostic
        message: String,
    },

    /// The compiled template failed while rendering
    #[error("failed to render template {path}: {message}")]
    Render {
        /// Template path
        path: String,
        /// Engine diagnostic
        message: String,
    },
}

impl TemplateError {
    /// The template path the error refers to
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::NotFound { path }
            | Self::InvalidPath { path }
            | Self::Fetch { path, .. }
            | Self::Compile { path, .. }
            | Self::Render { path, .. } => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lookup() {
        assert!(builtin_template(WINDOW_SHELL_TEMPLATE).is_some());
        assert!(builtin_template(DIALOG_TEMPLATE).is_some());
        assert!(builtin_template("templates/missing.html").is_none());
    }

    #[test]
    fn test_window_shell_has_content_slot() {
        let shell = builtin_template(WINDOW_SHELL_TEMPLATE).unwrap();
        assert!(shell.contains(crate::application::CONTENT_SLOT));
    }

    #[test]
    fn test_error_display() {
        let err = TemplateError::NotFound {
            path: "a.html".to_string(),
        };
        assert_eq!(err.to_string(), "template not found: a.html");
        assert_eq!(err.path(), "a.html");

        let err = TemplateError::Compile {
            path: "b.html".to_string(),
            message: "unexpected end".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to compile template b.html: unexpected end"
        );
    }
}
