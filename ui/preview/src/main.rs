//! UI Preview - Headless Window and Dialog Renderer
//!
//! Renders templates, application windows and confirm dialogs without a
//! browser, using the headless surface from `ui-core`. Useful for checking
//! template changes and scripting dialog flows.
//!
//! # Usage
//!
//! ```bash
//! # Render a template with data
//! ui-preview render templates/hud/dialog.html --data '{"content": "<p>Hi</p>"}'
//!
//! # Render a full window around a content template
//! ui-preview --templates ./public window templates/sheet.html --title "Sheet"
//!
//! # Drive a confirm dialog and print its outcome
//! ui-preview confirm --title "Delete?" --content "<p>Sure?</p>" --choose enter
//!
//! # Verbose logging
//! RUST_LOG=debug ui-preview render templates/app-window.html
//! ```

mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use ui_core::{load_config, load_config_from_path, ConfigOverrides, ConfigSource, UiConfig};

/// UI Preview - render tabletop windows and dialogs headlessly
#[derive(Parser, Debug)]
#[command(name = "ui-preview")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "UI_PREVIEW_CONFIG", value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Directory template paths are resolved against
    #[arg(short = 't', long, value_name = "DIR", global = true)]
    templates: Option<PathBuf>,

    /// Let templates read inherited data properties
    #[arg(long, global = true)]
    allow_prototype_access: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "UI_PREVIEW_LOG_LEVEL", default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

/// Preview subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render one template to stdout
    Render {
        /// Template path
        path: String,
        /// Template data as a JSON object
        #[arg(short, long, value_name = "JSON")]
        data: Option<String>,
    },

    /// Render a window around a content template
    Window {
        /// Content template path
        template: String,
        /// Window title
        #[arg(long, default_value = "")]
        title: String,
        /// Content data as a JSON object
        #[arg(short, long, value_name = "JSON")]
        data: Option<String>,
        /// Application options as a JSON object
        #[arg(short, long, value_name = "JSON")]
        options: Option<String>,
    },

    /// Open a yes/no dialog and print how it settled
    Confirm {
        /// Dialog title
        #[arg(long)]
        title: String,
        /// Question markup
        #[arg(long, default_value = "")]
        content: String,
        /// Make "no" the default button
        #[arg(long)]
        default_no: bool,
        /// Reject the outcome when dismissed
        #[arg(long)]
        reject_close: bool,
        /// Input to feed the dialog
        #[arg(long, value_enum, default_value_t = Choice::Enter)]
        choose: Choice,
    },
}

/// Scripted dialog input
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Choice {
    /// Click "yes"
    Yes,
    /// Click "no"
    No,
    /// Press Enter
    Enter,
    /// Close the window
    Dismiss,
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("ui_preview={level},ui_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}

/// Resolve configuration from file, environment and flags
fn resolve_config(args: &Args) -> Result<(UiConfig, ConfigSource)> {
    let overrides = ConfigOverrides {
        template_root: args.templates.clone(),
        allow_prototype_access: args.allow_prototype_access.then_some(true),
        reject_close: None,
    };

    match &args.config {
        Some(path) => {
            let mut config = load_config_from_path(path)
                .with_context(|| format!("Failed to load config: {}", path.display()))?;
            config.apply_env();
            overrides.apply(&mut config);
            config.validate()?;
            Ok((config, ConfigSource::File(path.clone())))
        }
        None => load_config(&overrides).context("Failed to load config"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);

    let (config, source) = resolve_config(&args)?;
    info!(source = ?source, root = %config.templates.root.display(), "Configuration resolved");

    let context = commands::context(config);
    let output = match args.command {
        Command::Render { path, data } => commands::render(&context, &path, data.as_deref()).await?,
        Command::Window {
            template,
            title,
            data,
            options,
        } => {
            commands::window(
                &context,
                &template,
                &title,
                data.as_deref(),
                options.as_deref(),
            )
            .await?
        }
        Command::Confirm {
            title,
            content,
            default_no,
            reject_close,
            choose,
        } => commands::confirm(&context, title, content, !default_no, reject_close, choose).await?,
    };

    println!("{output}");
    Ok(())
}
