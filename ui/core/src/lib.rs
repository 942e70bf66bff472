//! UI Core - Headless Window Layer for the Tabletop Client
//!
//! This crate provides the window layer of the tabletop client: stackable
//! application windows, modal dialogs, and the template cache that produces
//! their markup. It has no DOM binding of its own; a [`Surface`] carries
//! rendered markup to the document and reports input back as [`UiEvent`]s.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Dialog                              │
//! │      Open ── choose / Enter ──► Resolved  │  close ─► Dismissed
//! └──────────────────────────┬───────────────────────────────────┘
//!                            │ owns
//! ┌──────────────────────────▼───────────────────────────────────┐
//! │                        Application                           │
//! │  Unrendered ─► Rendering ─► Rendered ─► Closing ─► Closed    │
//! └───────┬─────────────────────┬─────────────────────┬──────────┘
//!         │ markup              │ z-order             │ attach / detach
//! ┌───────▼────────┐   ┌────────▼────────┐   ┌────────▼────────┐
//! │ TemplateLoader │   │ WindowRegistry  │   │     Surface     │
//! │ path → compiled│   │ id → z-index    │   │   (document)    │
//! └───────┬────────┘   └─────────────────┘   └─────────────────┘
//!         │ fetch
//! ┌───────▼────────┐
//! │ TemplateSource │
//! └────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`UiContext`]: registry, template loader, surface and config shared by
//!   all windows
//! - [`Application`]: one window's lifecycle
//! - [`Dialog`]: a window collecting exactly one choice
//! - [`WindowRegistry`]: open windows and their stacking order
//! - [`TemplateLoader`]: compile-once template cache
//!
//! # Quick Start
//!
//! ```ignore
//! use ui_core::{confirm, ConfirmConfig, Key, UiContext, UiEvent};
//!
//! #[tokio::main]
//! async fn main() {
//!     let (context, _surface) = UiContext::builtin_headless();
//!
//!     let (dialog, outcome) = confirm::<bool>(
//!         &context,
//!         ConfirmConfig::new("Delete token?", "<p>This cannot be undone.</p>"),
//!     )
//!     .await
//!     .unwrap();
//!
//!     dialog.handle_event(UiEvent::key(Key::Enter)).await.unwrap();
//!     assert_eq!(outcome.value().await.unwrap(), Some(true));
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`application`]: window lifecycle, options and geometry
//! - [`config`]: layered TOML/env configuration
//! - [`context`]: shared collaborators
//! - [`dialog`]: modal choice state machine and factories
//! - [`events`]: input from the surface
//! - [`registry`]: window tracking and z-order
//! - [`surface`]: document bridge
//! - [`templates`]: template sources, cache and data

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod application;
pub mod config;
pub mod context;
pub mod dialog;
pub mod events;
pub mod registry;
pub mod surface;
pub mod templates;

// Re-exports for convenience
pub use application::{
    Application, ApplicationError, ApplicationOptions, ApplicationState, Position,
    PositionUpdate, Size, WindowRecord, CONTENT_SLOT,
};
pub use context::UiContext;
pub use dialog::{
    confirm, prompt, ButtonSet, CallbackTarget, ConfirmConfig, Dialog, DialogButton, DialogData,
    DialogError, DialogOptions, DialogOutcome, DialogResolution, DialogState, ElementRef,
    PromptConfig,
};
pub use events::{Key, UiEvent};
pub use registry::{WindowId, WindowRegistry, ZIndex, ZOrderPolicy};
pub use surface::{HeadlessSurface, Surface, SurfaceError};
pub use templates::{
    FileTemplateSource, MemoryTemplateSource, TemplateData, TemplateError, TemplateLoader,
    TemplateOptions, TemplateSource,
};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, EnterFallback, UiConfig,
};
