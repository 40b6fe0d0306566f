use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// A single note/to-do item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
  /// Creation time in milliseconds. Unique within the list.
  pub id: i64,
  pub text: String,
  pub category: String,
  pub completed: bool,
  /// Localized creation timestamp, display-only.
  pub created_at: String,
  /// Wall-clock time at which a reminder should fire.
  #[serde(default)]
  pub remind_at: Option<DateTime<Local>>,
  /// Attached image as a data URI.
  #[serde(default)]
  pub image: Option<String>,
}

impl Task {
  /// One line of the shared export: `[category] text (✓) - created_at`.
  pub fn share_line(&self) -> String {
    if self.completed {
      format!("[{}] {} (✓) - {}", self.category, self.text, self.created_at)
    } else {
      format!("[{}] {} - {}", self.category, self.text, self.created_at)
    }
  }
}
