//! Ready-made dialogs: yes/no confirmation and single-button prompt
//!
//! Both factories build the dialog, render it, and return it with its
//! pending outcome.

use std::sync::Arc;

use super::{
    ButtonCallback, ButtonSet, CallbackTarget, Dialog, DialogButton, DialogData, DialogError,
    DialogHook, DialogOptions, DialogOutcome,
};
use crate::context::UiContext;

const CHECK_ICON: &str = r#"<i class="fas fa-check"></i>"#;
const TIMES_ICON: &str = r#"<i class="fas fa-times"></i>"#;

/// Settings for [`confirm`]
pub struct ConfirmConfig<T> {
    /// Window title
    pub title: String,
    /// Question markup
    pub content: String,
    /// Result on "yes"; defaults to `T::from(true)`
    pub yes: Option<ButtonCallback<T>>,
    /// Result on "no"; defaults to `T::from(false)`
    pub no: Option<ButtonCallback<T>>,
    /// Run after render
    pub render: Option<DialogHook>,
    /// Mark "yes" as the default button instead of "no"
    pub default_yes: bool,
    /// Dismissal policy; `None` uses the configured default
    pub reject_close: Option<bool>,
    /// Extra application options
    pub options: serde_json::Value,
}

impl<T> ConfirmConfig<T> {
    /// Confirmation with default callbacks, "yes" as default
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            yes: None,
            no: None,
            render: None,
            default_yes: true,
            reject_close: None,
            options: serde_json::Value::Null,
        }
    }

    /// Set the "yes" callback
    #[must_use]
    pub fn on_yes(mut self, callback: impl Fn(&CallbackTarget) -> T + Send + Sync + 'static) -> Self {
        self.yes = Some(Arc::new(callback));
        self
    }

    /// Set the "no" callback
    #[must_use]
    pub fn on_no(mut self, callback: impl Fn(&CallbackTarget) -> T + Send + Sync + 'static) -> Self {
        self.no = Some(Arc::new(callback));
        self
    }

    /// Set the render hook
    #[must_use]
    pub fn on_render(mut self, hook: impl Fn(&CallbackTarget) + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(hook));
        self
    }

    /// Choose which button Enter triggers
    #[must_use]
    pub fn default_yes(mut self, default_yes: bool) -> Self {
        self.default_yes = default_yes;
        self
    }

    /// Set the dismissal policy
    #[must_use]
    pub fn reject_close(mut self, reject_close: bool) -> Self {
        self.reject_close = Some(reject_close);
        self
    }

    /// Set extra application options
    #[must_use]
    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }
}

/// Settings for [`prompt`]
pub struct PromptConfig<T> {
    /// Window title
    pub title: String,
    /// Message markup
    pub content: String,
    /// Button label
    pub label: String,
    /// Result on click
    pub callback: Option<ButtonCallback<T>>,
    /// Run after render
    pub render: Option<DialogHook>,
    /// Dismissal policy
    pub reject_close: bool,
    /// Extra application options
    pub options: serde_json::Value,
}

impl<T> PromptConfig<T> {
    /// Prompt with an "OK" button that rejects on dismissal
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            label: "OK".to_string(),
            callback: None,
            render: None,
            reject_close: true,
            options: serde_json::Value::Null,
        }
    }

    /// Set the button label
    #[must_use]
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Set the button callback
    #[must_use]
    pub fn on_submit(mut self, callback: impl Fn(&CallbackTarget) -> T + Send + Sync + 'static) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Set the render hook
    #[must_use]
    pub fn on_render(mut self, hook: impl Fn(&CallbackTarget) + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(hook));
        self
    }

    /// Set the dismissal policy
    #[must_use]
    pub fn reject_close(mut self, reject_close: bool) -> Self {
        self.reject_close = reject_close;
        self
    }

    /// Set extra application options
    #[must_use]
    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = options;
        self
    }
}

/// Show a yes/no dialog
///
/// # Errors
///
/// Fails if the options do not merge or the dialog cannot render.
pub async fn confirm<T>(
    context: &UiContext,
    config: ConfirmConfig<T>,
) -> Result<(Dialog<T>, DialogOutcome<T>), DialogError>
where
    T: From<bool> + Send + 'static,
{
    let yes: ButtonCallback<T> = match config.yes {
        Some(callback) => callback,
        None => Arc::new(|_: &CallbackTarget| T::from(true)),
    };
    let no: ButtonCallback<T> = match config.no {
        Some(callback) => callback,
        None => Arc::new(|_: &CallbackTarget| T::from(false)),
    };

    let buttons = ButtonSet::new(
        vec![
            DialogButton::new("yes", "Yes")
                .with_icon(CHECK_ICON)
                .with_shared_callback(yes),
            DialogButton::new("no", "No")
                .with_icon(TIMES_ICON)
                .with_shared_callback(no),
        ],
        Some(if config.default_yes { "yes" } else { "no" }),
    )?;

    let mut options = DialogOptions::from_config(&context.config.dialog).with_application(config.options);
    if let Some(reject_close) = config.reject_close {
        options.reject_close = reject_close;
    }

    let mut data = DialogData::new(config.title, config.content, buttons);
    data.render = config.render;
    open(context, data, options).await
}

/// Show a single-button dialog
///
/// # Errors
///
/// Fails if the options do not merge or the dialog cannot render.
pub async fn prompt<T>(
    context: &UiContext,
    config: PromptConfig<T>,
) -> Result<(Dialog<T>, DialogOutcome<T>), DialogError>
where
    T: Send + 'static,
{
    let mut button = DialogButton::new("ok", config.label).with_icon(CHECK_ICON);
    if let Some(callback) = config.callback {
        button = button.with_shared_callback(callback);
    }
    let buttons = ButtonSet::new(vec![button], Some("ok"))?;

    let options = DialogOptions::from_config(&context.config.dialog)
        .with_application(config.options)
        .with_reject_close(config.reject_close);

    let mut data = DialogData::new(config.title, config.content, buttons);
    data.render = config.render;
    open(context, data, options).await
}

async fn open<T: Send + 'static>(
    context: &UiContext,
    data: DialogData<T>,
    options: DialogOptions,
) -> Result<(Dialog<T>, DialogOutcome<T>), DialogError> {
    let (dialog, outcome) = Dialog::new(context, data, options)?;
    dialog.render(true).await?;
    Ok((dialog, outcome))
}
