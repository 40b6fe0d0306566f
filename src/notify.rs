//! Desktop notification dispatch.
//!
//! Reminders surface through the platform notifier command. Whether a
//! notifier is usable is only discovered at fire time; when it is missing or
//! refuses, the caller logs the error and drops the notification. The in-app
//! alert overlay fires either way.

use std::path::Path;
use std::process::Command;

use color_eyre::{eyre::eyre, Result};

/// Notification body: the task's category.
pub fn body_for(category: &str) -> String {
  format!("Kategori: {}", category)
}

/// Send a desktop notification for a fired reminder. Title is the task text.
pub fn send(title: &str, category: &str, icon: Option<&Path>) -> Result<()> {
  let body = body_for(category);

  let status = command(title, &body, icon)
    .status()
    .map_err(|e| eyre!("notifier unavailable: {}", e))?;

  if !status.success() {
    return Err(eyre!("notifier exited with {}", status));
  }
  Ok(())
}

#[cfg(target_os = "macos")]
fn command(title: &str, body: &str, _icon: Option<&Path>) -> Command {
  let script = format!(
    "display notification \"{}\" with title \"{}\"",
    body.replace('"', "\\\""),
    title.replace('"', "\\\"")
  );
  let mut cmd = Command::new("osascript");
  cmd.arg("-e").arg(script);
  cmd
}

#[cfg(not(target_os = "macos"))]
fn command(title: &str, body: &str, icon: Option<&Path>) -> Command {
  let mut cmd = Command::new("notify-send");
  if let Some(icon) = icon {
    cmd.arg("--icon").arg(icon);
  }
  cmd.arg(title).arg(body);
  cmd
}
