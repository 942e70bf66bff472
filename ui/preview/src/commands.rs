//! Subcommand implementations
//!
//! Each command returns the text to print so tests can check it directly.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde_json::Value;

use ui_core::{
    Application, ApplicationOptions, ConfirmConfig, DialogError, DialogResolution,
    FileTemplateSource, Key, TemplateData, UiConfig, UiContext, UiEvent,
};

use crate::Choice;

/// Headless context serving templates from the configured root
///
/// Built-in templates answer for paths missing on disk.
pub fn context(config: UiConfig) -> UiContext {
    let source = FileTemplateSource::new(config.templates.root.clone()).with_builtin_fallback(true);
    UiContext::headless(config, Arc::new(source)).0
}

/// Parse a `--data`/`--options` argument
fn parse_json(arg: Option<&str>, what: &str) -> Result<Value> {
    match arg {
        None => Ok(Value::Null),
        Some(text) => {
            let value: Value =
                serde_json::from_str(text).with_context(|| format!("Invalid {what} JSON"))?;
            if !value.is_object() {
                bail!("{what} must be a JSON object");
            }
            Ok(value)
        }
    }
}

fn template_data(arg: Option<&str>) -> Result<TemplateData> {
    Ok(match parse_json(arg, "data")? {
        Value::Null => TemplateData::new(),
        value => TemplateData::from(value),
    })
}

/// Render a single template
pub async fn render(context: &UiContext, path: &str, data: Option<&str>) -> Result<String> {
    let data = template_data(data)?;
    let html = context
        .templates
        .render_template(path, &data)
        .await
        .with_context(|| format!("Failed to render {path}"))?;
    Ok(html)
}

/// Render a window and report its markup and record
pub async fn window(
    context: &UiContext,
    template: &str,
    title: &str,
    data: Option<&str>,
    options: Option<&str>,
) -> Result<String> {
    let defaults = ApplicationOptions::default()
        .with_title(title)
        .with_template(template);
    let app = Application::with_defaults(context, &defaults, parse_json(options, "options")?)?;

    app.render(true, template_data(data)?).await?;

    let html = app.element().unwrap_or_default();
    let record = serde_json::to_string_pretty(&app.record())?;
    Ok(format!("{html}\n{record}"))
}

/// Drive a confirm dialog and describe how it settled
pub async fn confirm(
    context: &UiContext,
    title: String,
    content: String,
    default_yes: bool,
    reject_close: bool,
    choice: Choice,
) -> Result<String> {
    let config = ConfirmConfig::<bool>::new(title, content)
        .default_yes(default_yes)
        .reject_close(reject_close);
    let (dialog, outcome) = ui_core::confirm(context, config).await?;

    let event = match choice {
        Choice::Yes => UiEvent::click("yes"),
        Choice::No => UiEvent::click("no"),
        Choice::Enter => UiEvent::key(Key::Enter),
        Choice::Dismiss => UiEvent::CloseRequested,
    };
    dialog.handle_event(event).await?;

    Ok(match outcome.wait().await {
        Ok(DialogResolution::Chosen { button, value }) => {
            format!("chosen: {button} ({})", value.unwrap_or_default())
        }
        Ok(DialogResolution::Dismissed) => "dismissed".to_string(),
        Err(DialogError::Dismissed) => "rejected".to_string(),
        Err(e) => return Err(e.into()),
    })
}
