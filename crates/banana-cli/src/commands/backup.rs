//! Export and import command handlers

use anyhow::Result;
use serde_json::json;

use banana_core::{ExportMode, ExportOutcome, ImportOutcome, SessionHandle};

use crate::output::Output;

/// Copy the store file into a directory or hand it to the system opener
pub async fn export(handle: &SessionHandle, mode: ExportMode, output: &Output) -> Result<()> {
    let outcome = handle
        .export(mode)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    match outcome {
        ExportOutcome::Written { path, bytes } => output.success_with(
            &format!("Exported {} bytes to {}", bytes, path.display()),
            json!({"mode": "directory", "path": path, "bytes": bytes}),
        ),
        ExportOutcome::Shared { path } => output.success_with(
            &format!("Shared {}", path.display()),
            json!({"mode": "share", "path": path}),
        ),
    }
    Ok(())
}

/// Replace every note and image with the contents of a backup file
pub async fn import(handle: &SessionHandle, output: &Output) -> Result<()> {
    let outcome = handle
        .import()
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    match outcome {
        ImportOutcome::Cancelled => output.message("Import cancelled. Nothing was changed."),
        ImportOutcome::Imported {
            source,
            bytes,
            imported_at,
        } => {
            let notes = handle.notes().await?.len();
            let images = handle.images().await?.len();
            output.success_with(
                &format!(
                    "Imported {} ({} bytes): {} note(s), {} image(s)",
                    source.display(),
                    bytes,
                    notes,
                    images
                ),
                json!({
                    "source": source,
                    "bytes": bytes,
                    "imported_at": imported_at.to_rfc3339(),
                    "notes": notes,
                    "images": images
                }),
            );
        }
    }
    Ok(())
}
