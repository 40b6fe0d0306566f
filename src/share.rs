//! Share the task list as text.
//!
//! A terminal has no share sheet, so sharing copies the formatted list to the
//! system clipboard, trying each known helper in turn. When no helper works
//! the text is left in a file under the data directory instead; the caller
//! reports either outcome to the user.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use color_eyre::{eyre::eyre, Result};
use tracing::debug;

/// Where the shared text ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
  /// Copied to the clipboard via the named helper.
  Clipboard(&'static str),
  /// No clipboard helper worked; written to this file.
  File(PathBuf),
}

/// Clipboard helpers in preference order, with their arguments.
const CLIPBOARD_TOOLS: &[&[&str]] = &[
  &["wl-copy"],
  &["xclip", "-selection", "clipboard"],
  &["xsel", "--clipboard", "--input"],
  &["pbcopy"],
];

/// Copy `text` to the clipboard, or fall back to `<data_dir>/share.txt`.
pub fn share(text: &str, data_dir: &Path) -> Result<ShareOutcome> {
  share_with_tools(CLIPBOARD_TOOLS, text, data_dir)
}

fn share_with_tools(
  tools: &[&'static [&'static str]],
  text: &str,
  data_dir: &Path,
) -> Result<ShareOutcome> {
  for tool in tools {
    match copy_with(tool, text) {
      Ok(()) => return Ok(ShareOutcome::Clipboard(tool[0])),
      Err(e) => debug!("clipboard helper {} failed: {}", tool[0], e),
    }
  }

  let path = data_dir.join("share.txt");
  std::fs::write(&path, text)
    .map_err(|e| eyre!("Failed to write share file {}: {}", path.display(), e))?;
  Ok(ShareOutcome::File(path))
}

/// Pipe `text` into one clipboard helper.
fn copy_with(cmd: &[&str], text: &str) -> Result<()> {
  let mut child = Command::new(cmd[0])
    .args(&cmd[1..])
    .stdin(Stdio::piped())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .map_err(|e| eyre!("{} unavailable: {}", cmd[0], e))?;

  child
    .stdin
    .take()
    .ok_or_else(|| eyre!("{} has no stdin", cmd[0]))?
    .write_all(text.as_bytes())
    .map_err(|e| eyre!("writing to {} failed: {}", cmd[0], e))?;

  let status = child
    .wait()
    .map_err(|e| eyre!("waiting for {} failed: {}", cmd[0], e))?;

  if !status.success() {
    return Err(eyre!("{} exited with {}", cmd[0], status));
  }
  Ok(())
}
