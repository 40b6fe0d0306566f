//! In-memory task list mirrored to the key-value store.
//!
//! Every mutation re-serializes the full list and overwrites the stored
//! document. There is no incremental diffing; at this scale the whole-document
//! write is a single statement.

use chrono::{DateTime, Local, Utc};
use color_eyre::Result;
use tracing::warn;

use crate::db::{KvStore, TASKS_KEY};

use super::types::Task;

/// Task list state. Owns the in-memory list and a handle to its backing store.
pub struct TaskStore {
  tasks: Vec<Task>,
  kv: KvStore,
}

impl TaskStore {
  /// Load the saved list. An absent or unreadable document yields an empty
  /// list; persistence problems are never fatal at startup.
  pub fn load(kv: KvStore) -> Self {
    let tasks = match kv.get(TASKS_KEY) {
      Ok(Some(raw)) => match serde_json::from_str(&raw) {
        Ok(tasks) => tasks,
        Err(e) => {
          warn!("discarding unreadable task list: {}", e);
          Vec::new()
        }
      },
      Ok(None) => Vec::new(),
      Err(e) => {
        warn!("failed to read saved tasks: {}", e);
        Vec::new()
      }
    };

    Self { tasks, kv }
  }

  /// Append a task. Whitespace-only text is a silent no-op returning `None`.
  ///
  /// The id is the current time in milliseconds, bumped until unique so the
  /// list invariant holds even for back-to-back adds.
  pub fn add(
    &mut self,
    text: &str,
    category: &str,
    remind_at: Option<DateTime<Local>>,
    image: Option<String>,
  ) -> Result<Option<&Task>> {
    let text = text.trim();
    if text.is_empty() {
      return Ok(None);
    }

    let mut id = Utc::now().timestamp_millis();
    while self.tasks.iter().any(|t| t.id == id) {
      id += 1;
    }

    self.tasks.push(Task {
      id,
      text: text.to_string(),
      category: category.to_string(),
      completed: false,
      created_at: Local::now().format("%d.%m.%Y %H:%M").to_string(),
      remind_at,
      image,
    });
    self.persist()?;

    Ok(self.tasks.last())
  }

  /// Flip the completed flag. Returns `false` when the id is unknown.
  pub fn toggle(&mut self, id: i64) -> Result<bool> {
    match self.tasks.iter_mut().find(|t| t.id == id) {
      Some(task) => {
        task.completed = !task.completed;
        self.persist()?;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  /// Remove the matching record, keeping the rest in order. Returns `false`
  /// when the id is unknown.
  pub fn delete(&mut self, id: i64) -> Result<bool> {
    let before = self.tasks.len();
    self.tasks.retain(|t| t.id != id);
    if self.tasks.len() == before {
      return Ok(false);
    }
    self.persist()?;
    Ok(true)
  }

  /// Case-insensitive substring match on text or category. The empty term
  /// matches everything. Never mutates the underlying list.
  pub fn filter(&self, term: &str) -> Vec<&Task> {
    let term = term.to_lowercase();
    self
      .tasks
      .iter()
      .filter(|t| {
        t.text.to_lowercase().contains(&term) || t.category.to_lowercase().contains(&term)
      })
      .collect()
  }

  /// All tasks formatted for sharing, newline-joined.
  pub fn share_text(&self) -> String {
    self
      .tasks
      .iter()
      .map(Task::share_line)
      .collect::<Vec<_>>()
      .join("\n")
  }

  pub fn tasks(&self) -> &[Task] {
    &self.tasks
  }

  pub fn len(&self) -> usize {
    self.tasks.len()
  }

  pub fn is_empty(&self) -> bool {
    self.tasks.is_empty()
  }

  /// Serialize the entire list to its document key in one write.
  fn persist(&self) -> Result<()> {
    let raw = serde_json::to_string(&self.tasks)?;
    self.kv.set(TASKS_KEY, &raw)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store() -> TaskStore {
    TaskStore::load(KvStore::open_in_memory().unwrap())
  }

  #[test]
  fn test_add_appends_one_task() {
    let mut store = store();
    let id = store
      .add("süt al", "alışveriş", None, None)
      .unwrap()
      .unwrap()
      .id;
    assert_eq!(store.len(), 1);
    assert!(id > 0);
  }

  #[test]
  fn test_add_whitespace_is_noop() {
    let mut store = store();
    assert!(store.add("", "genel", None, None).unwrap().is_none());
    assert!(store.add("   \t", "genel", None, None).unwrap().is_none());
    assert!(store.is_empty());
  }

  #[test]
  fn test_add_trims_text() {
    let mut store = store();
    let task = store.add("  not  ", "genel", None, None).unwrap().unwrap();
    assert_eq!(task.text, "not");
  }

  #[test]
  fn test_ids_unique_for_rapid_adds() {
    let mut store = store();
    for i in 0..20 {
      store.add(&format!("görev {}", i), "genel", None, None).unwrap();
    }
    let mut ids: Vec<i64> = store.tasks().iter().map(|t| t.id).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 20);
  }

  #[test]
  fn test_toggle_twice_restores_state() {
    let mut store = store();
    let id = store.add("not", "genel", None, None).unwrap().unwrap().id;

    assert!(store.toggle(id).unwrap());
    assert!(store.tasks()[0].completed);

    assert!(store.toggle(id).unwrap());
    assert!(!store.tasks()[0].completed);
  }

  #[test]
  fn test_toggle_unknown_id_is_noop() {
    let mut store = store();
    store.add("not", "genel", None, None).unwrap();
    assert!(!store.toggle(999).unwrap());
    assert!(!store.tasks()[0].completed);
  }

  #[test]
  fn test_delete_removes_exactly_one_in_order() {
    let mut store = store();
    let a = store.add("a", "genel", None, None).unwrap().unwrap().id;
    let b = store.add("b", "iş", None, None).unwrap().unwrap().id;
    let c = store.add("c", "genel", None, None).unwrap().unwrap().id;

    assert!(store.delete(b).unwrap());
    let ids: Vec<i64> = store.tasks().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![a, c]);
  }

  #[test]
  fn test_delete_unknown_id_is_noop() {
    let mut store = store();
    store.add("a", "genel", None, None).unwrap();
    assert!(!store.delete(12345).unwrap());
    assert_eq!(store.len(), 1);
  }

  #[test]
  fn test_filter_matches_text_or_category_case_insensitive() {
    let mut store = store();
    store.add("Süt al", "alışveriş", None, None).unwrap();
    store.add("rapor yaz", "genel", None, None).unwrap();

    let by_text = store.filter("SÜT");
    assert_eq!(by_text.len(), 1);
    assert_eq!(by_text[0].text, "Süt al");

    let by_category = store.filter("GENEL");
    assert_eq!(by_category.len(), 1);
    assert_eq!(by_category[0].text, "rapor yaz");

    assert!(store.filter("yok böyle").is_empty());
  }

  #[test]
  fn test_filter_empty_term_returns_all() {
    let mut store = store();
    store.add("a", "genel", None, None).unwrap();
    store.add("b", "iş", None, None).unwrap();
    assert_eq!(store.filter("").len(), 2);
  }

  #[test]
  fn test_persist_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    {
      let kv = KvStore::open(dir.path()).unwrap();
      let mut store = TaskStore::load(kv);
      store.add("kalıcı not", "genel", None, None).unwrap();
      store
        .add("resimli", "iş", None, Some("data:image/png;base64,AAAA".to_string()))
        .unwrap();
      let id = store.tasks()[0].id;
      store.toggle(id).unwrap();
    }

    let kv = KvStore::open(dir.path()).unwrap();
    let store = TaskStore::load(kv);
    assert_eq!(store.len(), 2);
    assert_eq!(store.tasks()[0].text, "kalıcı not");
    assert!(store.tasks()[0].completed);
    assert_eq!(
      store.tasks()[1].image.as_deref(),
      Some("data:image/png;base64,AAAA")
    );
  }

  #[test]
  fn test_malformed_document_loads_as_empty() {
    let kv = KvStore::open_in_memory().unwrap();
    kv.set(TASKS_KEY, "definitely not json").unwrap();

    let store = TaskStore::load(kv);
    assert!(store.is_empty());
  }

  #[test]
  fn test_share_text_joins_all_lines() {
    let mut store = store();
    store.add("a", "genel", None, None).unwrap();
    store.add("b", "iş", None, None).unwrap();
    let id = store.tasks()[1].id;
    store.toggle(id).unwrap();

    let text = store.share_text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("[genel] a - "));
    assert!(lines[1].contains("(✓)"));
  }
}
