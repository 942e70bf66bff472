//! Application - Window Lifecycle Controller
//!
//! An [`Application`] owns one window from construction to close:
//!
//! ```text
//!   Unrendered ──render──► Rendering ──ok──► Rendered ──close──► Closing ──► Closed
//!        ▲                     │                                              │
//!        └──────── error ──────┘                    render (re-open) ◄────────┘
//! ```
//!
//! Rendering fetches the outer window shell and the content template through
//! the [`TemplateLoader`](crate::templates::TemplateLoader), then, in one
//! synchronous step, admits the window to the registry, attaches it to the
//! surface and runs render handlers. A failed render rolls back to the prior
//! state and leaves nothing registered.
//!
//! Closing runs close handlers, waits for the surface to detach the window,
//! then unregisters it. Closing twice is a no-op. A close requested while a
//! render is in flight is queued and applied once the render settles.
//!
//! Every method takes `&self`; callers typically share an application behind
//! an `Arc`. Locks are never held across an `.await`.

mod options;
mod record;

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::context::UiContext;
use crate::registry::{WindowId, ZIndex};
use crate::surface::SurfaceError;
use crate::templates::{TemplateData, TemplateError};

pub use options::{merge_options, ApplicationOptions};
pub use record::{Position, PositionUpdate, Size, WindowRecord};

/// Marker in the window shell where content markup is inserted
pub const CONTENT_SLOT: &str = "<!-- window-content -->";

/// Handler run after a window's markup is attached
pub type RenderHandler = Arc<dyn Fn(&WindowRecord, &str) + Send + Sync>;

/// Handler run before a window is marked closed
pub type CloseHandler = Arc<dyn Fn(&WindowRecord) + Send + Sync>;

/// Errors from the window lifecycle
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// A template could not be fetched, compiled or rendered
    #[error("template resolution failed: {0}")]
    TemplateResolution(#[from] TemplateError),

    /// The surface refused the window
    #[error("surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// No content template is configured
    #[error("application {0} has no template configured")]
    MissingTemplate(WindowId),

    /// Options failed to merge or deserialize
    #[error("invalid application options: {0}")]
    InvalidOptions(#[from] serde_json::Error),
}

/// Lifecycle state of a window
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplicationState {
    /// Constructed, never drawn
    Unrendered,
    /// Templates are being resolved
    Rendering,
    /// On screen
    Rendered,
    /// Close in progress
    Closing,
    /// Removed from the surface
    Closed,
}

impl ApplicationState {
    /// Human-readable label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unrendered => "Unrendered",
            Self::Rendering => "Rendering",
            Self::Rendered => "Rendered",
            Self::Closing => "Closing",
            Self::Closed => "Closed",
        }
    }

    /// Whether a render may start from this state
    #[must_use]
    pub fn can_render(&self) -> bool {
        matches!(self, Self::Unrendered | Self::Closed)
    }
}

impl fmt::Display for ApplicationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single application window
///
/// Dropping a window that is still on screen releases its registry entry.
/// Its markup stays on the surface; call [`close`](Self::close) to detach it.
pub struct Application {
    id: WindowId,
    options: ApplicationOptions,
    context: UiContext,
    state: Mutex<ApplicationState>,
    record: Mutex<WindowRecord>,
    element: Mutex<Option<String>>,
    minimized: Mutex<bool>,
    pending_close: Mutex<bool>,
    render_handlers: Mutex<Vec<RenderHandler>>,
    close_handlers: Mutex<Vec<CloseHandler>>,
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("id", &self.id)
            .field("state", &*self.state.lock())
            .field("record", &*self.record.lock())
            .finish_non_exhaustive()
    }
}

impl Application {
    /// Create a window with fully specified options
    ///
    /// Size is floored to the configured minimum so a window is usable even
    /// without explicit dimensions.
    pub fn new(context: &UiContext, options: ApplicationOptions) -> Self {
        let id = context.registry.allocate_id();
        let min = Self::min_size(context);
        let size = Size::new(
            options.width.unwrap_or(min.width),
            options.height.unwrap_or(min.height),
        )
        .at_least(min);

        let record = WindowRecord {
            id,
            z_index: None,
            is_popped_out: options.pop_out,
            size,
            position: Position::new(options.top.unwrap_or(0), options.left.unwrap_or(0)),
        };

        tracing::debug!(window_id = %id, title = %options.title, "Application created");

        Self {
            id,
            options,
            context: context.clone(),
            state: Mutex::new(ApplicationState::Unrendered),
            record: Mutex::new(record),
            element: Mutex::new(None),
            minimized: Mutex::new(false),
            pending_close: Mutex::new(false),
            render_handlers: Mutex::new(Vec::new()),
            close_handlers: Mutex::new(Vec::new()),
        }
    }

    /// Create a window from class defaults plus instance overrides
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidOptions` if the merge fails.
    pub fn with_defaults(
        context: &UiContext,
        defaults: &ApplicationOptions,
        overrides: serde_json::Value,
    ) -> Result<Self, ApplicationError> {
        let options = ApplicationOptions::merge(defaults, overrides)?;
        Ok(Self::new(context, options))
    }

    fn min_size(context: &UiContext) -> Size {
        Size::new(
            context.config.windows.min_width,
            context.config.windows.min_height,
        )
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Window identifier
    #[must_use]
    pub fn id(&self) -> WindowId {
        self.id
    }

    /// Current lifecycle state
    #[must_use]
    pub fn state(&self) -> ApplicationState {
        *self.state.lock()
    }

    /// Whether the window is on screen
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.state() == ApplicationState::Rendered
    }

    /// Snapshot of the window record
    #[must_use]
    pub fn record(&self) -> WindowRecord {
        self.record.lock().clone()
    }

    /// Merged options
    #[must_use]
    pub fn options(&self) -> &ApplicationOptions {
        &self.options
    }

    /// Window title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.options.title
    }

    /// CSS id of the window element
    #[must_use]
    pub fn css_id(&self) -> String {
        match &self.options.id {
            Some(id) if !id.is_empty() => id.clone(),
            _ => format!("app-{}", self.id),
        }
    }

    /// Markup currently attached to the surface
    #[must_use]
    pub fn element(&self) -> Option<String> {
        self.element.lock().clone()
    }

    /// Whether the window is minimized
    #[must_use]
    pub fn is_minimized(&self) -> bool {
        *self.minimized.lock()
    }

    /// Register a handler run on every successful render
    ///
    /// Handlers run after the markup is attached and before the state
    /// becomes `Rendered`, in registration order.
    pub fn on_render(&self, handler: impl Fn(&WindowRecord, &str) + Send + Sync + 'static) {
        self.render_handlers.lock().push(Arc::new(handler));
    }

    /// Register a handler run when the window closes
    ///
    /// Handlers run before the state becomes `Closed`, in registration order.
    pub fn on_close(&self, handler: impl Fn(&WindowRecord) + Send + Sync + 'static) {
        self.close_handlers.lock().push(Arc::new(handler));
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Render the window with `data` as the content template's context
    ///
    /// Without `force`, rendering an already rendered window does nothing.
    /// A render is never started while another is in flight or while the
    /// window is closing.
    ///
    /// # Errors
    ///
    /// Template and surface failures are returned to the caller; the window
    /// keeps its previous state and is not left in the registry. The same
    /// rollback applies when the render future is dropped before it
    /// completes, for example under a timeout.
    ///
    /// A close queued during the render is applied afterwards. If that close
    /// fails, the failure is logged and the render's own result is returned;
    /// the window stays rendered and `close` can be called again.
    pub async fn render(&self, force: bool, data: TemplateData) -> Result<(), ApplicationError> {
        let prior = {
            let mut state = self.state.lock();
            let current = *state;
            match current {
                ApplicationState::Rendering | ApplicationState::Closing => {
                    tracing::debug!(window_id = %self.id, state = %current, "Render ignored");
                    return Ok(());
                }
                ApplicationState::Rendered if !force => return Ok(()),
                _ => {
                    *state = ApplicationState::Rendering;
                    current
                }
            }
        };

        let guard = TransitionGuard {
            app: self,
            prior,
            armed: true,
        };
        let result = self.render_inner(prior, &data).await;

        match &result {
            Ok(()) => *self.state.lock() = ApplicationState::Rendered,
            Err(e) => {
                guard.rollback();
                tracing::warn!(window_id = %self.id, error = %e, "Render failed, state rolled back");
            }
        }
        guard.disarm();

        let close_queued = std::mem::take(&mut *self.pending_close.lock());
        if close_queued {
            tracing::debug!(window_id = %self.id, "Applying queued close");
            if let Err(e) = self.close().await {
                // The window stays rendered; a later close() retries.
                tracing::warn!(window_id = %self.id, error = %e, "Queued close failed");
            }
        }

        result
    }

    async fn render_inner(
        &self,
        prior: ApplicationState,
        data: &TemplateData,
    ) -> Result<(), ApplicationError> {
        let template = self
            .options
            .template
            .clone()
            .ok_or(ApplicationError::MissingTemplate(self.id))?;
        let templates = &self.context.templates;

        let shell = if self.options.pop_out {
            let shell_path = &self.context.config.templates.window_shell;
            Some(
                templates
                    .render_template(shell_path, &self.shell_data())
                    .await?,
            )
        } else {
            None
        };
        let content = templates.render_template(&template, data).await?;
        let html = compose(shell.as_deref(), &content);

        // Synchronous from here on: registry, surface and handlers settle
        // together.
        let rerender = prior == ApplicationState::Rendered;
        let record = {
            let mut record = self.record.lock();
            if self.options.pop_out && !rerender {
                record.z_index = Some(self.context.registry.admit(self.id));
            }
            record.clone()
        };

        self.context.surface.attach(&record, &html)?;

        *self.element.lock() = Some(html.clone());

        let handlers: Vec<RenderHandler> = self.render_handlers.lock().clone();
        for handler in &handlers {
            handler(&record, &html);
        }

        tracing::info!(
            window_id = %self.id,
            z_index = ?record.z_index,
            rerender = rerender,
            "Window rendered"
        );
        Ok(())
    }

    /// Data for the outer window shell
    fn shell_data(&self) -> TemplateData {
        let options = &self.options;
        let mut header_buttons = Vec::new();
        if options.minimizable {
            header_buttons.push(json!({
                "class": "minimize",
                "label": "Minimize",
                "icon": "fas fa-window-minimize",
            }));
        }
        header_buttons.push(json!({
            "class": "close",
            "label": "Close",
            "icon": "fas fa-times",
        }));

        TemplateData::new()
            .with("id", self.css_id())
            .with("appId", self.id.as_u64())
            .with("classes", options.classes.join(" "))
            .with("title", options.title.clone())
            .with("popOut", options.pop_out)
            .with("minimizable", options.minimizable)
            .with("resizable", options.resizable)
            .with("headerButtons", header_buttons)
    }

    // ========================================================================
    // Closing
    // ========================================================================

    /// Close the window
    ///
    /// Closing a window that is not on screen, or is already closing, does
    /// nothing. A close during a render is queued until the render settles.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Surface` if the surface fails to detach the
    /// window. The window stays rendered and registered so the close can be
    /// retried. A close future dropped mid-detach leaves the window rendered
    /// as well.
    pub async fn close(&self) -> Result<(), ApplicationError> {
        {
            let mut state = self.state.lock();
            let current = *state;
            match current {
                ApplicationState::Rendering => {
                    *self.pending_close.lock() = true;
                    tracing::debug!(window_id = %self.id, "Close queued behind render");
                    return Ok(());
                }
                ApplicationState::Rendered => *state = ApplicationState::Closing,
                _ => return Ok(()),
            }
        }

        let guard = TransitionGuard {
            app: self,
            prior: ApplicationState::Rendered,
            armed: true,
        };

        let record = self.record();
        let handlers: Vec<CloseHandler> = self.close_handlers.lock().clone();
        for handler in &handlers {
            handler(&record);
        }

        if let Err(e) = self.context.surface.detach(self.id).await {
            guard.rollback();
            guard.disarm();
            tracing::warn!(window_id = %self.id, error = %e, "Close failed");
            return Err(e.into());
        }
        guard.disarm();

        self.context.registry.unregister(self.id);
        self.record.lock().z_index = None;
        *self.element.lock() = None;
        *self.minimized.lock() = false;
        *self.state.lock() = ApplicationState::Closed;

        tracing::info!(window_id = %self.id, "Window closed");
        Ok(())
    }

    // ========================================================================
    // Window management
    // ========================================================================

    /// Raise a rendered pop-out window above all others
    ///
    /// Returns the new z-index, or `None` if the window is not on screen.
    pub fn bring_to_top(&self) -> Option<ZIndex> {
        if !self.is_rendered() || !self.options.pop_out {
            return None;
        }

        let z = self.context.registry.bring_to_front(self.id)?;
        let record = {
            let mut record = self.record.lock();
            record.z_index = Some(z);
            record.clone()
        };
        self.context.surface.update(&record);
        Some(z)
    }

    /// Move or resize the window
    ///
    /// Size is clamped to the configured minimum. The surface is updated
    /// if the window is on screen.
    pub fn set_position(&self, update: PositionUpdate) -> WindowRecord {
        let min = Self::min_size(&self.context);
        let record = {
            let mut record = self.record.lock();
            record.apply(update, min);
            record.clone()
        };

        if self.is_rendered() {
            self.context.surface.update(&record);
        }
        record
    }

    /// Minimize a rendered pop-out window
    ///
    /// Returns false if the window cannot be minimized or already is.
    pub fn minimize(&self) -> bool {
        if !self.is_rendered() || !self.options.pop_out || !self.options.minimizable {
            return false;
        }
        let mut minimized = self.minimized.lock();
        if *minimized {
            return false;
        }
        *minimized = true;
        tracing::debug!(window_id = %self.id, "Window minimized");
        true
    }

    /// Restore a minimized window
    ///
    /// Returns false if the window was not minimized.
    pub fn maximize(&self) -> bool {
        let mut minimized = self.minimized.lock();
        if !*minimized {
            return false;
        }
        *minimized = false;
        tracing::debug!(window_id = %self.id, "Window restored");
        true
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        let state = *self.state.get_mut();
        if matches!(state, ApplicationState::Rendered | ApplicationState::Closing)
            && self.context.registry.unregister(self.id)
        {
            tracing::debug!(window_id = %self.id, state = %state, "Open window dropped, unregistered");
        }
    }
}

/// Rolls an in-flight render or close back to its prior state
///
/// Armed while `Application::render` or `Application::close` is between
/// states. If the future is dropped at an await point, or a handler panics,
/// the drop restores the prior state, forgets any queued close and releases
/// a registry entry a render took.
struct TransitionGuard<'a> {
    app: &'a Application,
    prior: ApplicationState,
    armed: bool,
}

impl TransitionGuard<'_> {
    fn rollback(&self) {
        *self.app.state.lock() = self.prior;
        // A re-render keeps the entry the earlier render took.
        if self.prior != ApplicationState::Rendered
            && self.app.context.registry.unregister(self.app.id)
        {
            self.app.record.lock().z_index = None;
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for TransitionGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.rollback();
            *self.app.pending_close.lock() = false;
            tracing::warn!(
                window_id = %self.app.id,
                prior = %self.prior,
                "Transition abandoned, state rolled back"
            );
        }
    }
}

/// Insert content markup into the window shell
///
/// Without a shell the content stands alone. A shell missing the content
/// slot gets the content appended.
fn compose(shell: Option<&str>, content: &str) -> String {
    match shell {
        None => content.to_string(),
        Some(shell) => match shell.find(CONTENT_SLOT) {
            Some(at) => {
                let mut html = String::with_capacity(shell.len() + content.len());
                html.push_str(&shell[..at]);
                html.push_str(content);
                html.push_str(&shell[at + CONTENT_SLOT.len()..]);
                html
            }
            None => format!("{shell}{content}"),
        },
    }
}
