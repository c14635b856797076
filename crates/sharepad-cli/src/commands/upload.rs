//! Upload command implementation.

use std::path::Path;

use anyhow::{bail, Context, Result};
use sharepad_core::datauri::{check_image_size, encode_data_uri, mime_for_path};
use sharepad_core::{format_size, PayloadPatch};

use super::{Globals, UploadArgs};

/// Run the upload command.
pub async fn run(args: UploadArgs, globals: &Globals) -> Result<()> {
    let limit = globals.config.client.max_image_bytes;
    let uri = read_image(&args.path, limit).await?;

    globals.client()?.update(&PayloadPatch::image(uri)).await?;

    if globals.json {
        super::print_json(&serde_json::json!({
            "status": "saved",
            "path": args.path.display().to_string(),
        }))?;
    } else if !globals.quiet {
        println!("  Image uploaded: {}", args.path.display());
    }

    Ok(())
}

/// Load an image file as a data URI, checking type and size first.
async fn read_image(path: &Path, limit: u64) -> Result<String> {
    let mime = mime_for_path(path);
    if !mime.starts_with("image/") {
        bail!("{} is not an image ({})", path.display(), mime);
    }

    let size = tokio::fs::metadata(path)
        .await
        .with_context(|| format!("Cannot read {}", path.display()))?
        .len();
    check_image_size(size, limit)
        .with_context(|| format!("Image must be less than {}", format_size(limit)))?;

    let data = tokio::fs::read(path).await?;
    Ok(encode_data_uri(&data, &mime))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_read_image_rejects_large_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.png");
        std::fs::write(&path, vec![0u8; 64]).unwrap();

        let err = read_image(&path, 32).await.unwrap_err();
        assert!(err.to_string().contains("less than"));
    }

    #[tokio::test]
    async fn test_read_image_rejects_non_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "hello").unwrap();

        assert!(read_image(&path, 1024).await.is_err());
    }

    #[tokio::test]
    async fn test_read_image_builds_data_uri() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pic.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let uri = read_image(&path, 1024).await.unwrap();
        assert_eq!(uri, "data:image/gif;base64,R0lGODlh");
    }
}
