//! One-shot reminder timers keyed by task id.
//!
//! A reminder is a durable property of its task: `remind_at` persists with the
//! record, every future reminder is re-armed against wall-clock time at app
//! start, and deleting the task cancels its timer. Past-due reminders are not
//! fired retroactively.

use std::collections::HashMap;

use chrono::Local;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::event::Event;
use crate::tasks::Task;

/// Payload delivered when a reminder fires.
#[derive(Debug, Clone)]
pub struct ReminderFired {
  pub task_id: i64,
  pub text: String,
  pub category: String,
}

/// Arms and cancels one-shot timers that report back on the app event channel.
pub struct ReminderScheduler {
  tx: mpsc::UnboundedSender<Event>,
  pending: HashMap<i64, AbortHandle>,
}

impl ReminderScheduler {
  pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
    Self {
      tx,
      pending: HashMap::new(),
    }
  }

  /// Re-arm every future reminder. Called once at startup with the loaded list.
  pub fn schedule_all(&mut self, tasks: &[Task]) {
    for task in tasks {
      self.schedule(task);
    }
  }

  /// Arm a one-shot timer when the task's `remind_at` lies in the future.
  /// Returns `false` for tasks without a reminder or with a past-due one.
  pub fn schedule(&mut self, task: &Task) -> bool {
    let Some(remind_at) = task.remind_at else {
      return false;
    };

    let delay = match (remind_at - Local::now()).to_std() {
      Ok(delay) => delay,
      Err(_) => return false, // already past
    };

    debug!("arming reminder for task {} in {:?}", task.id, delay);

    let tx = self.tx.clone();
    let fired = ReminderFired {
      task_id: task.id,
      text: task.text.clone(),
      category: task.category.clone(),
    };
    let handle = tokio::spawn(async move {
      tokio::time::sleep(delay).await;
      let _ = tx.send(Event::Reminder(fired));
    });

    // A re-add under the same id replaces the previous timer.
    if let Some(old) = self.pending.insert(task.id, handle.abort_handle()) {
      old.abort();
    }
    true
  }

  /// Cancel the pending timer for a deleted task. No-op when none is armed.
  pub fn cancel(&mut self, task_id: i64) {
    if let Some(handle) = self.pending.remove(&task_id) {
      handle.abort();
      debug!("cancelled reminder for task {}", task_id);
    }
  }

  /// Drop the bookkeeping entry once a reminder has fired.
  pub fn mark_fired(&mut self, task_id: i64) {
    self.pending.remove(&task_id);
  }

  pub fn pending_count(&self) -> usize {
    self.pending.len()
  }
}
