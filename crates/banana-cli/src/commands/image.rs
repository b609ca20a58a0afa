//! Image command handlers

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};

use banana_core::{Image, SessionHandle};

use crate::editor::confirm;
use crate::output::Output;

/// Add a photo through the capture surface
///
/// The file itself stays where it is; only its URI is recorded.
pub async fn add(handle: &SessionHandle, output: &Output) -> Result<()> {
    match handle.capture_image().await.context("Failed to add image")? {
        Some(image) => output.success(&format!("Added image {}: {}", image.id, image.uri)),
        None => output.message("Cancelled."),
    }
    Ok(())
}

/// List images, newest first
pub async fn list(handle: &SessionHandle, output: &Output) -> Result<()> {
    let images = handle.images().await?;
    if let Some(err) = images.load_error() {
        output.warn(&format!("Images could not be loaded: {}", err));
    }

    let shown: Vec<Image> = images.display().cloned().collect();
    output.print_images(&shown);
    Ok(())
}

/// Point an image record at a different file
pub async fn relink(handle: &SessionHandle, id: i64, path: PathBuf, output: &Output) -> Result<()> {
    let abs = path
        .canonicalize()
        .with_context(|| format!("Cannot use {}", path.display()))?;
    let uri = format!("file://{}", abs.display());

    if !handle.update_image(id, uri.clone()).await? {
        bail!("Image not found: {}", id);
    }

    output.success(&format!("Image {} now points to {}", id, uri));
    Ok(())
}

/// Delete an image record after confirmation
pub async fn delete(
    handle: &SessionHandle,
    id: i64,
    assume_yes: bool,
    output: &Output,
) -> Result<()> {
    let images = handle.images().await?;
    let image = images
        .get(id)
        .ok_or_else(|| anyhow!("Image not found: {}", id))?;

    if output.should_prompt() && !assume_yes {
        println!("Delete image {}: {}", image.id, image.uri);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if !handle.delete_image(id).await.context("Failed to delete image")? {
        bail!("Image not found: {}", id);
    }

    output.success(&format!("Deleted image {}", id));
    Ok(())
}
