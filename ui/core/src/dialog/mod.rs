//! Dialog - Modal Choice State Machine
//!
//! A [`Dialog`] wraps an [`Application`] window and collects exactly one
//! choice from a fixed [`ButtonSet`]:
//!
//! ```text
//!          ┌── choose(key) / Enter ──► Resolved(key)
//!   Open ──┤
//!          └── close ────────────────► Dismissed
//! ```
//!
//! Both end states are terminal. The outcome is delivered once through the
//! [`DialogOutcome`] returned at construction. Whichever path ends the
//! dialog, the window is closed and the `close` data-callback runs once.
//!
//! Button callbacks run on the caller's task. A panicking callback leaves
//! the dialog resolved with no outcome sent; the outcome then reports
//! [`DialogError::Abandoned`] once the dialog is dropped.

mod button;
mod factory;

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::application::{Application, ApplicationError, ApplicationOptions};
use crate::config::{DialogConfig, EnterFallback};
use crate::context::UiContext;
use crate::events::{Key, UiEvent};
use crate::registry::WindowId;
use crate::templates::TemplateData;

pub use button::{ButtonCallback, ButtonSet, CallbackTarget, DialogButton, ElementRef};
pub use factory::{confirm, prompt, ConfirmConfig, PromptConfig};

/// Hook run with the dialog's callback target
pub type DialogHook = Arc<dyn Fn(&CallbackTarget) + Send + Sync>;

/// Errors from dialogs
#[derive(Debug, Error)]
pub enum DialogError {
    /// Buttons or options are inconsistent
    #[error("invalid dialog configuration: {0}")]
    InvalidConfiguration(String),

    /// Closed without a choice while dismissal is configured to reject
    #[error("dialog was closed without a choice")]
    Dismissed,

    /// The dialog was dropped before settling its outcome
    #[error("dialog was dropped before it settled")]
    Abandoned,

    /// The underlying window failed
    #[error(transparent)]
    Application(#[from] ApplicationError),
}

/// Choice state of a dialog
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogState {
    /// Awaiting a choice
    Open,
    /// A button was chosen
    Resolved(String),
    /// Closed without a choice
    Dismissed,
}

impl DialogState {
    /// Whether no further choice is accepted
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Open)
    }
}

/// How a dialog settled
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DialogResolution<T> {
    /// A button was chosen
    Chosen {
        /// Key of the chosen button
        button: String,
        /// Callback result; `None` when the button has no callback
        value: Option<T>,
    },
    /// Closed without a choice
    Dismissed,
}

impl<T> DialogResolution<T> {
    /// The chosen value, if any
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Chosen { value, .. } => value,
            Self::Dismissed => None,
        }
    }
}

type OutcomeResult<T> = Result<DialogResolution<T>, DialogError>;

/// The pending result of a dialog
#[derive(Debug)]
pub struct DialogOutcome<T> {
    rx: oneshot::Receiver<OutcomeResult<T>>,
}

impl<T> DialogOutcome<T> {
    /// Wait for the dialog to settle
    ///
    /// # Errors
    ///
    /// Returns `DialogError::Dismissed` for a rejecting dismissal and
    /// `DialogError::Abandoned` if the dialog went away unsettled.
    pub async fn wait(self) -> OutcomeResult<T> {
        self.rx.await.unwrap_or(Err(DialogError::Abandoned))
    }

    /// Wait for the dialog and keep only the chosen value
    ///
    /// # Errors
    ///
    /// Same as [`wait`](Self::wait).
    pub async fn value(self) -> Result<Option<T>, DialogError> {
        self.wait().await.map(DialogResolution::into_value)
    }

    /// Take the outcome if the dialog has already settled
    ///
    /// Returns `None` while the dialog is open. The outcome can be taken
    /// only once; later calls report `Abandoned`.
    pub fn try_resolution(&mut self) -> Option<OutcomeResult<T>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(oneshot::error::TryRecvError::Empty) => None,
            Err(oneshot::error::TryRecvError::Closed) => Some(Err(DialogError::Abandoned)),
        }
    }
}

/// Content and callbacks of a dialog
pub struct DialogData<T> {
    /// Window title
    pub title: String,
    /// Body markup, inserted unescaped
    pub content: String,
    /// Choices
    pub buttons: ButtonSet<T>,
    /// Run after each render
    pub render: Option<DialogHook>,
    /// Run once when the dialog closes, on any path
    pub close: Option<DialogHook>,
}

impl<T> DialogData<T> {
    /// Data with no hooks
    pub fn new(title: impl Into<String>, content: impl Into<String>, buttons: ButtonSet<T>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            buttons,
            render: None,
            close: None,
        }
    }

    /// Set the render hook
    #[must_use]
    pub fn on_render(mut self, hook: impl Fn(&CallbackTarget) + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(hook));
        self
    }

    /// Set the close hook
    #[must_use]
    pub fn on_close(mut self, hook: impl Fn(&CallbackTarget) + Send + Sync + 'static) -> Self {
        self.close = Some(Arc::new(hook));
        self
    }
}

/// Dialog behaviour and window options
#[derive(Clone, Debug, PartialEq)]
pub struct DialogOptions {
    /// Body template path
    pub template: String,
    /// Window width
    pub width: u32,
    /// Settle a dismissal as `DialogError::Dismissed`
    pub reject_close: bool,
    /// Enter key behaviour without a default button
    pub enter_without_default: EnterFallback,
    /// Hand callbacks the rendered markup instead of an element reference
    pub markup_callbacks: bool,
    /// Extra application options merged over the dialog defaults
    pub application: serde_json::Value,
}

impl DialogOptions {
    /// Options from the `[dialog]` config section
    #[must_use]
    pub fn from_config(config: &DialogConfig) -> Self {
        Self {
            template: config.template.clone(),
            width: config.width,
            reject_close: config.reject_close,
            enter_without_default: config.enter_without_default,
            markup_callbacks: config.markup_callbacks,
            application: serde_json::Value::Null,
        }
    }

    /// Set the dismissal policy
    #[must_use]
    pub fn with_reject_close(mut self, reject_close: bool) -> Self {
        self.reject_close = reject_close;
        self
    }

    /// Set the Enter fallback
    #[must_use]
    pub fn with_enter_fallback(mut self, fallback: EnterFallback) -> Self {
        self.enter_without_default = fallback;
        self
    }

    /// Set extra application options
    #[must_use]
    pub fn with_application(mut self, overrides: serde_json::Value) -> Self {
        self.application = overrides;
        self
    }
}

impl Default for DialogOptions {
    fn default() -> Self {
        Self::from_config(&DialogConfig::default())
    }
}

/// A modal window awaiting one choice
pub struct Dialog<T> {
    app: Application,
    content: String,
    buttons: ButtonSet<T>,
    close_hook: Option<DialogHook>,
    options: DialogOptions,
    state: Mutex<DialogState>,
    outcome: Mutex<Option<oneshot::Sender<OutcomeResult<T>>>>,
    close_hook_ran: AtomicBool,
}

impl<T> fmt::Debug for Dialog<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dialog")
            .field("app", &self.app)
            .field("buttons", &self.buttons)
            .field("state", &*self.state.lock())
            .finish_non_exhaustive()
    }
}

impl<T: Send + 'static> Dialog<T> {
    /// Create a dialog and the handle its outcome arrives on
    ///
    /// # Errors
    ///
    /// Returns `DialogError::Application` if the application overrides in
    /// `options` do not merge.
    pub fn new(
        context: &UiContext,
        data: DialogData<T>,
        options: DialogOptions,
    ) -> Result<(Self, DialogOutcome<T>), DialogError> {
        let defaults = ApplicationOptions {
            width: Some(options.width),
            classes: vec!["dialog".to_string()],
            title: data.title,
            template: Some(options.template.clone()),
            ..ApplicationOptions::default()
        };
        let app = Application::with_defaults(context, &defaults, options.application.clone())?;

        if let Some(render) = data.render {
            let markup = options.markup_callbacks;
            let css_id = app.css_id();
            app.on_render(move |record, html| {
                render(&CallbackTarget::build(markup, record.id, &css_id, html));
            });
        }

        let (tx, rx) = oneshot::channel();
        tracing::debug!(
            window_id = %app.id(),
            buttons = data.buttons.len(),
            default = ?data.buttons.default_key(),
            "Dialog created"
        );

        let dialog = Self {
            app,
            content: data.content,
            buttons: data.buttons,
            close_hook: data.close,
            options,
            state: Mutex::new(DialogState::Open),
            outcome: Mutex::new(Some(tx)),
            close_hook_ran: AtomicBool::new(false),
        };
        Ok((dialog, DialogOutcome { rx }))
    }

    /// Underlying window
    #[must_use]
    pub fn application(&self) -> &Application {
        &self.app
    }

    /// Window identifier
    #[must_use]
    pub fn id(&self) -> WindowId {
        self.app.id()
    }

    /// Current choice state
    #[must_use]
    pub fn state(&self) -> DialogState {
        self.state.lock().clone()
    }

    /// Buttons in render order
    #[must_use]
    pub fn buttons(&self) -> &ButtonSet<T> {
        &self.buttons
    }

    /// Active options
    #[must_use]
    pub fn options(&self) -> &DialogOptions {
        &self.options
    }

    /// Render the dialog window
    ///
    /// A dialog that already settled is not drawn again.
    ///
    /// # Errors
    ///
    /// Propagates template and surface failures from the window.
    pub async fn render(&self, force: bool) -> Result<(), DialogError> {
        if self.state().is_terminal() {
            return Ok(());
        }

        let data = TemplateData::new()
            .with("title", self.app.title().to_string())
            .with("content", self.content.clone())
            .with("buttons", self.buttons.to_template_value());
        self.app.render(force, data).await?;
        Ok(())
    }

    /// Choose the button with `key`
    ///
    /// The first choice wins; later choices and unknown keys return
    /// `Ok(false)` without effect.
    ///
    /// # Errors
    ///
    /// Returns the window's error if closing after the choice fails. The
    /// choice still stands and a later [`close`](Self::close) retries.
    pub async fn choose(&self, key: &str) -> Result<bool, DialogError> {
        let Some(button) = self.buttons.get(key) else {
            tracing::warn!(window_id = %self.id(), button = %key, "Unknown dialog button ignored");
            return Ok(false);
        };

        {
            let mut state = self.state.lock();
            if state.is_terminal() {
                tracing::debug!(window_id = %self.id(), button = %key, state = ?*state, "Dialog already settled");
                return Ok(false);
            }
            *state = DialogState::Resolved(key.to_string());
        }

        let target = self.callback_target();
        let value = button.invoke(&target);
        tracing::info!(window_id = %self.id(), button = %key, "Dialog resolved");
        self.settle(Ok(DialogResolution::Chosen {
            button: key.to_string(),
            value,
        }));

        self.finish_close().await?;
        Ok(true)
    }

    /// Handle a key press
    ///
    /// Enter chooses the default button. Without one, the configured
    /// [`EnterFallback`] applies. Every other key is ignored.
    ///
    /// # Errors
    ///
    /// Same as [`choose`](Self::choose).
    pub async fn key_down(&self, key: &Key) -> Result<bool, DialogError> {
        if *key != Key::Enter {
            return Ok(false);
        }

        let target = match self.buttons.default_key() {
            Some(default) => Some(default.to_string()),
            None => match self.options.enter_without_default {
                EnterFallback::Ignore => None,
                EnterFallback::FirstButton => self.buttons.first().map(|b| b.key().to_string()),
            },
        };

        match target {
            Some(key) => self.choose(&key).await,
            None => {
                tracing::debug!(window_id = %self.id(), "Enter ignored, no default button");
                Ok(false)
            }
        }
    }

    /// Dispatch an event from the surface
    ///
    /// Returns whether the event changed the dialog's state.
    ///
    /// # Errors
    ///
    /// Same as [`choose`](Self::choose) and [`close`](Self::close).
    pub async fn handle_event(&self, event: UiEvent) -> Result<bool, DialogError> {
        match event {
            UiEvent::Click { button } => self.choose(&button).await,
            UiEvent::KeyDown { key } => self.key_down(&key).await,
            UiEvent::CloseRequested => {
                let was_open = !self.state().is_terminal();
                self.close().await?;
                Ok(was_open)
            }
        }
    }

    /// Close the dialog
    ///
    /// An open dialog is dismissed: its outcome settles as
    /// `DialogResolution::Dismissed`, or as `DialogError::Dismissed` when
    /// `reject_close` is set. Closing a settled dialog only retries the
    /// window close.
    ///
    /// # Errors
    ///
    /// Returns the window's error if it fails to close.
    pub async fn close(&self) -> Result<(), DialogError> {
        let dismissed = {
            let mut state = self.state.lock();
            if state.is_terminal() {
                false
            } else {
                *state = DialogState::Dismissed;
                true
            }
        };

        if dismissed {
            tracing::info!(
                window_id = %self.id(),
                reject = self.options.reject_close,
                "Dialog dismissed"
            );
            if self.options.reject_close {
                self.settle(Err(DialogError::Dismissed));
            } else {
                self.settle(Ok(DialogResolution::Dismissed));
            }
        }

        self.finish_close().await
    }

    fn settle(&self, result: OutcomeResult<T>) {
        if let Some(tx) = self.outcome.lock().take() {
            // A dropped receiver means nobody is waiting.
            let _ = tx.send(result);
        }
    }

    fn callback_target(&self) -> CallbackTarget {
        let html = self.app.element().unwrap_or_default();
        CallbackTarget::build(
            self.options.markup_callbacks,
            self.app.id(),
            &self.app.css_id(),
            &html,
        )
    }

    async fn finish_close(&self) -> Result<(), DialogError> {
        if !self.close_hook_ran.swap(true, Ordering::SeqCst) {
            if let Some(hook) = &self.close_hook {
                hook(&self.callback_target());
            }
        }
        self.app.close().await?;
        Ok(())
    }
}
