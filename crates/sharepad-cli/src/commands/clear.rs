//! Clear command implementation.

use anyhow::Result;
use sharepad_core::PayloadPatch;

use super::{ClearArgs, Globals};

/// Run the clear command.
pub async fn run(args: ClearArgs, globals: &Globals) -> Result<()> {
    let patch = clear_patch(args.text, args.image);
    globals.client()?.update(&patch).await?;

    if globals.json {
        super::print_json(&serde_json::json!({
            "status": "cleared",
            "fields": patch.fields(),
        }))?;
    } else if !globals.quiet {
        println!("  Cleared {}", patch.fields().join(" and "));
    }

    Ok(())
}

/// With neither flag, clear both fields.
fn clear_patch(text: bool, image: bool) -> PayloadPatch {
    let both = !text && !image;
    PayloadPatch {
        text: (text || both).then_some(None),
        image: (image || both).then_some(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_patch() {
        assert_eq!(clear_patch(true, false), PayloadPatch::clear_text());
        assert_eq!(clear_patch(false, true), PayloadPatch::clear_image());
        assert_eq!(clear_patch(false, false).fields(), vec!["text", "image"]);
        assert_eq!(clear_patch(true, true).fields(), vec!["text", "image"]);
    }
}
