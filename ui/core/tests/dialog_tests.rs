//! Dialog Integration Tests
//!
//! Exercises dialogs through surface events the way a document bridge
//! would deliver them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use pretty_assertions::assert_eq;

use ui_core::{
    confirm, prompt, ButtonSet, CallbackTarget, ConfirmConfig, Dialog, DialogButton, DialogData,
    DialogError, DialogOptions, DialogResolution, DialogState, EnterFallback, Key,
    MemoryTemplateSource, PromptConfig, UiConfig, UiContext, UiEvent,
};

fn choice_dialog(
    ctx: &UiContext,
    calls: &Arc<Mutex<Vec<String>>>,
) -> (Dialog<String>, ui_core::DialogOutcome<String>) {
    let buttons = ["one", "two"]
        .into_iter()
        .map(|key| {
            let calls = calls.clone();
            DialogButton::new(key, format!("Option {key}")).with_callback(move |_: &CallbackTarget| {
                calls.lock().push(key.to_string());
                format!("chose {key}")
            })
        })
        .collect();
    let data = DialogData::new(
        "Test Dialog",
        "<p>You must choose either Option 1, or Option 2</p>",
        ButtonSet::new(buttons, Some("two")).unwrap(),
    );
    Dialog::new(ctx, data, DialogOptions::default()).unwrap()
}

#[tokio::test]
async fn test_click_one_then_two_only_runs_one() {
    let (ctx, surface) = UiContext::builtin_headless();
    let calls = Arc::new(Mutex::new(Vec::new()));
    let (dialog, outcome) = choice_dialog(&ctx, &calls);
    dialog.render(true).await.unwrap();
    assert!(surface.is_attached(dialog.id()));

    assert!(dialog.handle_event(UiEvent::click("one")).await.unwrap());
    assert!(!dialog.handle_event(UiEvent::click("two")).await.unwrap());
    assert!(!dialog.handle_event(UiEvent::key(Key::Enter)).await.unwrap());

    assert_eq!(*calls.lock(), vec!["one".to_string()]);
    assert_eq!(
        outcome.wait().await.unwrap(),
        DialogResolution::Chosen {
            button: "one".to_string(),
            value: Some("chose one".to_string()),
        }
    );
    assert!(!surface.is_attached(dialog.id()));
    assert!(ctx.registry.is_empty());
}

#[tokio::test]
async fn test_confirm_default_yes_on_enter() {
    let (ctx, _) = UiContext::builtin_headless();
    let yes = Arc::new(AtomicUsize::new(0));
    let no = Arc::new(AtomicUsize::new(0));
    let (yes_count, no_count) = (yes.clone(), no.clone());

    let config = ConfirmConfig::new("A Yes or No Question", "<p>Choose wisely.</p>")
        .on_yes(move |_| {
            yes_count.fetch_add(1, Ordering::SeqCst);
            Answer::Text("wisely")
        })
        .on_no(move |_| {
            no_count.fetch_add(1, Ordering::SeqCst);
            Answer::Text("poorly")
        });

    let (dialog, outcome) = confirm(&ctx, config).await.unwrap();
    dialog.handle_event(UiEvent::key(Key::Enter)).await.unwrap();

    assert_eq!(yes.load(Ordering::SeqCst), 1);
    assert_eq!(no.load(Ordering::SeqCst), 0);
    assert_eq!(outcome.value().await.unwrap(), Some(Answer::Text("wisely")));
}

#[tokio::test]
async fn test_dialogs_share_window_stacking() {
    let (ctx, _) = UiContext::builtin_headless();
    let (first, _first_outcome) = confirm::<bool>(&ctx, ConfirmConfig::new("First", ""))
        .await
        .unwrap();
    let (second, _second_outcome) = confirm::<bool>(&ctx, ConfirmConfig::new("Second", ""))
        .await
        .unwrap();

    assert_eq!(ctx.registry.front(), Some(second.id()));
    first.application().bring_to_top();
    assert_eq!(ctx.registry.front(), Some(first.id()));

    second.close().await.unwrap();
    first.close().await.unwrap();
    assert!(ctx.registry.is_empty());
}

#[tokio::test]
async fn test_dropped_dialog_frees_the_stack() {
    let (ctx, _) = UiContext::builtin_headless();
    let outcome = {
        let (_dialog, outcome) = confirm::<bool>(&ctx, ConfirmConfig::new("Abandon?", ""))
            .await
            .unwrap();
        assert_eq!(ctx.registry.len(), 1);
        outcome
    };
    assert!(ctx.registry.is_empty());
    assert!(matches!(outcome.wait().await, Err(DialogError::Abandoned)));

    let (next, _next_outcome) = confirm::<bool>(&ctx, ConfirmConfig::new("Next", ""))
        .await
        .unwrap();
    assert_eq!(
        next.application().record().z_index,
        Some(ui_core::registry::DEFAULT_Z_FLOOR)
    );
}

#[tokio::test]
async fn test_reject_close_from_config() {
    let config = UiConfig {
        dialog: ui_core::config::DialogConfig {
            reject_close: true,
            enter_without_default: EnterFallback::FirstButton,
            ..Default::default()
        },
        ..Default::default()
    };
    let (ctx, _) = UiContext::headless(config, Arc::new(MemoryTemplateSource::with_builtin()));

    let (dialog, outcome) = confirm::<bool>(&ctx, ConfirmConfig::new("Leave?", ""))
        .await
        .unwrap();
    assert!(dialog.options().reject_close);

    dialog.handle_event(UiEvent::CloseRequested).await.unwrap();
    assert_eq!(dialog.state(), DialogState::Dismissed);
    assert!(matches!(outcome.wait().await, Err(DialogError::Dismissed)));
}

#[tokio::test]
async fn test_prompt_render_hook_sees_markup() {
    let (ctx, _) = UiContext::builtin_headless();
    let rendered = Arc::new(Mutex::new(None::<String>));
    let slot = rendered.clone();

    let config = PromptConfig::new("Roll", "<p>Roll initiative</p>")
        .label("Roll")
        .on_submit(|target: &CallbackTarget| target.html().map_or(0, str::len))
        .on_render(move |target| *slot.lock() = target.html().map(str::to_string));
    let (dialog, outcome) = prompt(&ctx, config).await.unwrap();

    let markup = rendered.lock().clone().unwrap();
    assert!(markup.contains("Roll initiative"));

    dialog.key_down(&Key::Enter).await.unwrap();
    assert_eq!(outcome.value().await.unwrap(), Some(markup.len()));
}

// =============================================================================
// Helpers
// =============================================================================

/// Answer type for a confirm whose callbacks return text
#[derive(Clone, Debug, PartialEq, Eq)]
enum Answer {
    Bool(bool),
    Text(&'static str),
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
