//! Watch command implementation: a terminal version of the web page.

use anyhow::Result;
use sharepad_core::client::{DisplayState, Notice, SyncView, ViewConfig, ViewEvent};
use sharepad_core::config::DisplayMode;

use super::{Globals, ModeArg, WatchArgs};
use crate::ui::describe_image;

impl From<ModeArg> for DisplayMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Text => Self::Text,
            ModeArg::Image => Self::Image,
        }
    }
}

/// Run the watch command.
pub async fn run(args: WatchArgs, globals: &Globals) -> Result<()> {
    let mut config = ViewConfig::from(&globals.config);
    if let Some(interval) = args.interval {
        config.poll_interval = interval;
    }
    if let Some(mode) = args.mode {
        config.initial_mode = mode.into();
    }

    if globals.chatty() {
        println!();
        println!("  Watching {} (Ctrl+C to stop)", globals.server_url());
        println!("{}", "-".repeat(45));
    }

    let (view, mut events) = SyncView::mount(globals.client()?, config).await;
    let mut last_shown: Option<DisplayState> = None;
    let mut failing = false;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    ViewEvent::Refreshed(state) => {
                        if failing && globals.chatty() {
                            eprintln!("  Reconnected.");
                        }
                        failing = false;
                        if last_shown.as_ref() != Some(&state) {
                            show(&state, globals)?;
                            last_shown = Some(state);
                        }
                    }
                    ViewEvent::FetchFailed(e) => {
                        if !failing && !globals.quiet {
                            eprintln!("  Server unreachable: {}", e);
                        }
                        failing = true;
                    }
                    ViewEvent::Notice(Notice::Saved) => {}
                    ViewEvent::Notice(Notice::Failed(e)) => {
                        if !globals.quiet {
                            eprintln!("  Failed to save: {}", e);
                        }
                    }
                }
            }
        }
    }

    view.teardown();
    if globals.chatty() {
        println!();
        println!("  Stopped watching.");
    }
    Ok(())
}

fn show(state: &DisplayState, globals: &Globals) -> Result<()> {
    if globals.json {
        println!("{}", serde_json::to_string(state)?);
        return Ok(());
    }

    if globals.chatty() {
        println!();
    }
    match state.mode {
        DisplayMode::Text => println!("{}", state.text),
        DisplayMode::Image => match &state.image {
            Some(uri) => println!("[{}]", describe_image(uri)),
            None => println!("[no image]"),
        },
    }
    Ok(())
}
