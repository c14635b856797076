//! Put command implementation.

use std::io::Read;

use anyhow::{Context, Result};
use sharepad_core::PayloadPatch;

use super::{Globals, PutArgs};

/// Run the put command.
pub async fn run(args: PutArgs, globals: &Globals) -> Result<()> {
    let text = match args.text {
        Some(text) => text,
        None => read_stdin()?,
    };

    let payload = globals.client()?.update(&PayloadPatch::text(text)).await?;

    if globals.json {
        super::print_json(&serde_json::json!({
            "status": "saved",
            "text_len": payload.text.len(),
            "has_image": payload.image.is_some(),
        }))?;
    } else if !globals.quiet {
        println!("  Updated successfully ({} chars)", payload.text.chars().count());
    }

    Ok(())
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read stdin")?;
    Ok(text)
}
