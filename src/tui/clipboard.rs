//! Clipboard helper
//!
//! Uses `arboard` for cross-platform support. The clipboard is opened per
//! copy so nothing is held between keypresses.

use anyhow::{Context, Result};
use arboard::Clipboard;
use serde::Serialize;

/// Copy text to the system clipboard
///
/// Fails without a display server (headless Linux) or on permission errors.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to set clipboard text")?;
    Ok(())
}

/// Copy a record as pretty-printed JSON
pub fn copy_json<T: Serialize>(record: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(record).context("Failed to serialize record")?;
    copy_to_clipboard(&json)
}
