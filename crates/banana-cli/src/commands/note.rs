//! Note command handlers

use anyhow::{anyhow, bail, Context, Result};

use banana_core::{Note, NoteText, SessionHandle};

use crate::editor::{confirm, edit_note};
use crate::output::Output;

/// Add a note, opening the editor when no text is given
pub async fn create(handle: &SessionHandle, text: Option<String>, output: &Output) -> Result<()> {
    let text = match text {
        Some(t) => t,
        None => edit_note("New note", "")?,
    };
    let text = NoteText::new(text).context("Note not saved")?;

    let note = handle.add_note(text).await.context("Failed to add note")?;

    output.success(&format!("Added note {}", note.id));
    Ok(())
}

/// List notes, newest first
pub async fn list(handle: &SessionHandle, output: &Output) -> Result<()> {
    let notes = handle.notes().await?;
    if let Some(err) = notes.load_error() {
        output.warn(&format!("Notes could not be loaded: {}", err));
    }

    let shown: Vec<Note> = notes.display().cloned().collect();
    output.print_notes(&shown);
    Ok(())
}

/// Show one note in full
pub async fn show(handle: &SessionHandle, id: i64, output: &Output) -> Result<()> {
    let note = find(handle, id).await?;
    output.print_note(&note);
    Ok(())
}

/// Replace a note's text, opening the editor on the current text when none is given
pub async fn edit(
    handle: &SessionHandle,
    id: i64,
    text: Option<String>,
    output: &Output,
) -> Result<()> {
    let current = find(handle, id).await?;

    let text = match text {
        Some(t) => t,
        None => edit_note(&format!("Editing note {}", id), &current.text)?,
    };
    let text = NoteText::new(text).context("Note not saved")?;

    if !handle.edit_note(id, text).await.context("Failed to edit note")? {
        bail!("Note not found: {}", id);
    }

    output.success(&format!("Updated note {}", id));
    Ok(())
}

/// Delete a note after confirmation
pub async fn delete(
    handle: &SessionHandle,
    id: i64,
    assume_yes: bool,
    output: &Output,
) -> Result<()> {
    let note = find(handle, id).await?;

    if output.should_prompt() && !assume_yes {
        let preview: String = note.text.chars().take(50).collect();
        println!("Delete note {}: {}", note.id, preview.replace('\n', " "));
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    if !handle.delete_note(id).await.context("Failed to delete note")? {
        bail!("Note not found: {}", id);
    }

    output.success(&format!("Deleted note {}", id));
    Ok(())
}

async fn find(handle: &SessionHandle, id: i64) -> Result<Note> {
    let notes = handle.notes().await?;
    notes
        .get(id)
        .cloned()
        .ok_or_else(|| anyhow!("Note not found: {}", id))
}
