//! Get command implementation.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use sharepad_core::datauri::{file_extension_for_mime, DataUri};

use super::{GetArgs, Globals};
use crate::ui::describe_image;

/// Run the get command.
pub async fn run(args: GetArgs, globals: &Globals) -> Result<()> {
    let payload = globals.client()?.fetch().await?;

    let saved = match (&args.image_out, &payload.image) {
        (Some(out), Some(uri)) => Some(save_image(uri, out).await?),
        (Some(_), None) => bail!("The shared pad has no image"),
        _ => None,
    };

    if globals.json {
        let mut output = serde_json::to_value(&payload)?;
        if let Some(path) = &saved {
            output["saved_image"] = serde_json::json!(path.display().to_string());
        }
        super::print_json(&output)?;
        return Ok(());
    }

    if !payload.text.is_empty() {
        println!("{}", payload.text);
    }

    if !globals.quiet {
        if let Some(uri) = &payload.image {
            eprintln!("  [{}]", describe_image(uri));
        }
        if let Some(path) = &saved {
            eprintln!("  Image saved to {}", path.display());
        }
    }

    Ok(())
}

/// Decode a data URI into a file. A directory target gets a generated name.
async fn save_image(uri: &str, out: &Path) -> Result<PathBuf> {
    let parsed = DataUri::parse(uri)?;
    let bytes = parsed.decode()?;

    let path = if out.is_dir() {
        let ext = file_extension_for_mime(parsed.mime());
        out.join(format!("sharepad-image.{ext}"))
    } else {
        out.to_path_buf()
    };

    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sharepad_core::datauri::encode_data_uri;

    #[tokio::test]
    async fn test_save_image_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let uri = encode_data_uri(b"\x89PNG", "image/png");

        let path = save_image(&uri, dir.path()).await.unwrap();
        assert_eq!(path, dir.path().join("sharepad-image.png"));
        assert_eq!(std::fs::read(path).unwrap(), b"\x89PNG");
    }

    #[tokio::test]
    async fn test_save_image_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.gif");
        let uri = encode_data_uri(b"GIF89a", "image/gif");

        let path = save_image(&uri, &target).await.unwrap();
        assert_eq!(path, target);
    }

    #[tokio::test]
    async fn test_save_invalid_uri() {
        let dir = tempfile::tempdir().unwrap();
        assert!(save_image("nope", dir.path()).await.is_err());
    }
}
