//! Paste and copy commands: move content between the local clipboard and the pad.

use anyhow::{bail, Result};
use sharepad_core::clipboard::{create_clipboard, ClipboardContent};
use sharepad_core::datauri::check_image_size;
use sharepad_core::Error;

use super::{CopyArgs, Globals};

/// Run the paste command.
pub async fn run_paste(globals: &Globals) -> Result<()> {
    let mut clipboard = match create_clipboard() {
        Ok(c) => c,
        Err(e) => return report_error(globals, e),
    };

    let content = match clipboard.read() {
        Ok(Some(content)) => content,
        Ok(None) => return report_error(globals, Error::ClipboardEmpty),
        Err(e) => return report_error(globals, e),
    };

    if let ClipboardContent::Image { data, .. } = &content {
        check_image_size(data.len() as u64, globals.config.client.max_image_bytes)?;
    }

    globals.client()?.update(&content.to_patch()).await?;

    if globals.json {
        super::print_json(&serde_json::json!({
            "status": "saved",
            "content": {
                "preview": content.preview(50),
                "size": content.size(),
                "hash": format!("{:016x}", content.hash()),
            },
        }))?;
    } else if !globals.quiet {
        println!("  Shared clipboard: {}", content.preview(50));
    }

    Ok(())
}

/// Run the copy command.
pub async fn run_copy(args: CopyArgs, globals: &Globals) -> Result<()> {
    let payload = globals.client()?.fetch().await?;

    let Some(content) = ClipboardContent::from_payload(&payload, args.image)? else {
        let what = if args.image { "image" } else { "text" };
        bail!("The shared pad has no {what} to copy");
    };

    let mut clipboard = match create_clipboard() {
        Ok(c) => c,
        Err(e) => return report_error(globals, e),
    };
    if let Err(e) = clipboard.write(&content) {
        return report_error(globals, e);
    }

    if globals.json {
        super::print_json(&serde_json::json!({
            "status": "copied",
            "preview": content.preview(50),
        }))?;
    } else if !globals.quiet {
        println!("  Copied to clipboard: {}", content.preview(50));
    }

    Ok(())
}

/// Report a clipboard failure in JSON mode before handing it back.
fn report_error(globals: &Globals, err: Error) -> Result<()> {
    if globals.json {
        super::print_json(&serde_json::json!({
            "status": "error",
            "error": err.to_string(),
            "code": err.code(),
        }))?;
    }
    Err(err.into())
}
