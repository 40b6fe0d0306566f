use crate::assets;
use crate::commands;
use crate::config::Config;
use crate::db::{KvStore, THEME_KEY};
use crate::event::{Event, EventHandler};
use crate::notify;
use crate::reminders::{ReminderFired, ReminderScheduler};
use crate::share::{self, ShareOutcome};
use crate::tasks::{Task, TaskStore};
use crate::theme::Theme;
use crate::ui;
use crate::ui::components::{InputResult, TextInput};
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use color_eyre::{eyre::eyre, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Insert,
  Search,
  Command,
}

/// Pending pieces of the next task: category choice, reminder, attachment.
/// Owned here rather than floating as ambient globals; consumed on submit.
#[derive(Debug, Clone, Default)]
pub struct Draft {
  pub category_idx: usize,
  pub remind_at: Option<DateTime<Local>>,
  pub image: Option<String>,
}

/// Main application state
pub struct App {
  /// Application configuration
  config: Config,

  /// Resolved data directory (database, icon, share fallback)
  data_dir: PathBuf,

  /// Key-value store handle for settings
  kv: KvStore,

  /// Task list state
  store: TaskStore,

  /// Pending reminder timers keyed by task id
  scheduler: ReminderScheduler,

  theme: Theme,

  /// Current input mode
  mode: Mode,

  /// Text being typed for a new task (insert mode)
  insert_input: TextInput,

  /// Command input buffer (after pressing :)
  command_input: String,

  /// Selected autocomplete suggestion index
  selected_suggestion: usize,

  /// Live search filter (after pressing /)
  filter: String,

  /// Draft state for the next task
  draft: Draft,

  /// Selected row within the filtered list
  selected: usize,

  /// Blocking modal alert; any key dismisses it
  alert: Option<String>,

  /// Where the materialized notification icon lands
  icon_path: PathBuf,

  /// Event sender for async tasks
  event_tx: mpsc::UnboundedSender<Event>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: Config) -> Result<Self> {
    let data_dir = config.data_dir()?;
    let kv = KvStore::open(&data_dir)?;
    let store = TaskStore::load(kv.clone());

    let theme = match kv.get(THEME_KEY)? {
      Some(name) => Theme::from_name(&name),
      None => config
        .default_theme
        .as_deref()
        .map(Theme::from_name)
        .unwrap_or_default(),
    };

    // Replaced with the real event channel in run()
    let (tx, _rx) = mpsc::unbounded_channel();
    let scheduler = ReminderScheduler::new(tx.clone());
    let icon_path = data_dir.join("icon-192.png");

    Ok(Self {
      config,
      data_dir,
      kv,
      store,
      scheduler,
      theme,
      mode: Mode::Normal,
      insert_input: TextInput::new(),
      command_input: String::new(),
      selected_suggestion: 0,
      filter: String::new(),
      draft: Draft::default(),
      selected: 0,
      alert: None,
      icon_path,
      event_tx: tx,
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    // Create event handler
    let mut events = EventHandler::new(Duration::from_millis(250));
    self.event_tx = events.sender();

    // Re-arm every saved reminder against the wall clock
    self.scheduler = ReminderScheduler::new(self.event_tx.clone());
    self.scheduler.schedule_all(self.store.tasks());

    self.spawn_asset_worker();

    // Main loop
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      if let Some(event) = events.next().await {
        self.handle_event(event)?;
      }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  /// Populate the asset cache in the background. Install failure leaves the
  /// app running without a cache; the UI never blocks on it.
  fn spawn_asset_worker(&self) {
    let data_dir = self.data_dir.clone();
    tokio::spawn(async move {
      match assets::install_and_materialize(&data_dir).await {
        Ok(path) => info!("asset cache ready, icon at {}", path.display()),
        Err(e) => warn!("asset cache install failed: {}", e),
      }
    });
  }

  fn handle_event(&mut self, event: Event) -> Result<()> {
    match event {
      Event::Key(key) => self.handle_key(key)?,
      Event::Tick => {} // UI refresh happens automatically
      Event::Reminder(fired) => self.handle_reminder(fired),
    }
    Ok(())
  }

  fn handle_reminder(&mut self, fired: ReminderFired) {
    self.scheduler.mark_fired(fired.task_id);

    let icon = self.icon_path.exists().then(|| self.icon_path.as_path());
    if let Err(e) = notify::send(&fired.text, &fired.category, icon) {
      warn!("desktop notification dropped: {}", e);
    }

    self.alert = Some(format!("⏰ {} ({})", fired.text, notify::body_for(&fired.category)));
  }

  fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
    // A visible alert blocks everything until dismissed
    if self.alert.is_some() {
      self.alert = None;
      return Ok(());
    }

    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key)?,
      Mode::Insert => self.handle_insert_mode_key(key)?,
      Mode::Search => self.handle_search_mode_key(key),
      Mode::Command => self.handle_command_mode_key(key)?,
    }
    Ok(())
  }

  fn handle_normal_mode_key(&mut self, key: KeyEvent) -> Result<()> {
    match key.code {
      // Quit
      KeyCode::Char('q') => self.should_quit = true,
      KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
        self.should_quit = true;
      }

      // Navigation
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),

      // Mutations
      KeyCode::Char(' ') => self.toggle_selected()?,
      KeyCode::Char('d') => self.delete_selected()?,

      // Mode switches
      KeyCode::Char('a') | KeyCode::Char('i') => {
        self.mode = Mode::Insert;
        self.insert_input.clear();
      }
      KeyCode::Char('/') => {
        self.mode = Mode::Search;
      }
      KeyCode::Char(':') => {
        self.mode = Mode::Command;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }

      KeyCode::Char('t') => self.toggle_theme()?,
      KeyCode::Char('s') => self.share_tasks()?,

      _ => {}
    }
    Ok(())
  }

  fn handle_insert_mode_key(&mut self, key: KeyEvent) -> Result<()> {
    // Tab cycles the draft category
    if key.code == KeyCode::Tab {
      let count = self.config.categories.len().max(1);
      self.draft.category_idx = (self.draft.category_idx + 1) % count;
      return Ok(());
    }

    match self.insert_input.handle_key(key) {
      InputResult::Submitted(text) => {
        self.submit_task(&text)?;
        self.insert_input.clear();
      }
      InputResult::Cancelled => {
        self.mode = Mode::Normal;
      }
      InputResult::Consumed | InputResult::NotHandled => {}
    }
    Ok(())
  }

  fn handle_search_mode_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.filter.clear();
        self.clamp_selection();
      }
      KeyCode::Enter => {
        // Keep the filter applied and return to normal mode
        self.mode = Mode::Normal;
      }
      KeyCode::Backspace => {
        self.filter.pop();
        self.clamp_selection();
      }
      KeyCode::Char(c) => {
        self.filter.push(c);
        self.clamp_selection();
      }
      _ => {}
    }
  }

  fn handle_command_mode_key(&mut self, key: KeyEvent) -> Result<()> {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command()?;
        self.mode = Mode::Normal;
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = (self.selected_suggestion + 1) % suggestions.len();
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = if self.selected_suggestion == 0 {
            suggestions.len() - 1
          } else {
            self.selected_suggestion - 1
          };
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0;
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0;
      }
      _ => {}
    }
    Ok(())
  }

  /// Add a task from insert-mode text, consuming the pending draft pieces.
  fn submit_task(&mut self, text: &str) -> Result<()> {
    if text.trim().is_empty() {
      // The store would refuse it anyway; keep the draft for the next try
      return Ok(());
    }

    let category = self.current_category().to_string();
    let remind_at = self.draft.remind_at.take();
    let image = self.draft.image.take();

    if let Some(task) = self.store.add(text, &category, remind_at, image)? {
      self.scheduler.schedule(task);
    }
    Ok(())
  }

  fn toggle_selected(&mut self) -> Result<()> {
    if let Some(id) = self.selected_task_id() {
      self.store.toggle(id)?;
    }
    Ok(())
  }

  fn delete_selected(&mut self) -> Result<()> {
    if let Some(id) = self.selected_task_id() {
      if self.store.delete(id)? {
        self.scheduler.cancel(id);
      }
      self.clamp_selection();
    }
    Ok(())
  }

  fn execute_command(&mut self) -> Result<()> {
    let input = self.command_input.trim().to_string();
    if input.is_empty() {
      return Ok(());
    }
    let (typed_name, args) = commands::split_input(&input);

    // Resolve through the selected suggestion, falling back to the raw input
    let suggestions = commands::get_suggestions(typed_name);
    let name = if !suggestions.is_empty() && self.selected_suggestion < suggestions.len() {
      suggestions[self.selected_suggestion].name
    } else {
      typed_name
    };

    match name {
      "attach" => self.attach_image(args),
      "remind" => self.set_reminder(args),
      "category" => self.set_category(args),
      "share" => self.share_tasks()?,
      "theme" => self.toggle_theme()?,
      "quit" => self.should_quit = true,
      _ => {
        self.alert = Some(format!("Unknown command: {}", typed_name));
      }
    }

    self.command_input.clear();
    Ok(())
  }

  fn attach_image(&mut self, path: &str) {
    if path.is_empty() {
      self.alert = Some("Usage: attach <path>".to_string());
      return;
    }

    match image_data_uri(Path::new(path)) {
      Ok(uri) => {
        self.draft.image = Some(uri);
        self.alert = Some("📎 Image attached to the next task".to_string());
      }
      Err(e) => self.alert = Some(format!("Attach failed: {}", e)),
    }
  }

  fn set_reminder(&mut self, args: &str) {
    if args.is_empty() {
      self.alert = Some("Usage: remind <YYYY-MM-DD HH:MM>".to_string());
      return;
    }

    match parse_remind_at(args) {
      Ok(when) if when > Local::now() => {
        self.alert = Some(format!("⏰ Reminder set for {}", when.format("%d.%m.%Y %H:%M")));
        self.draft.remind_at = Some(when);
      }
      Ok(_) => self.alert = Some("Reminder time is in the past".to_string()),
      Err(e) => self.alert = Some(format!("Unrecognized time: {}", e)),
    }
  }

  fn set_category(&mut self, name: &str) {
    if name.is_empty() {
      self.alert = Some("Usage: category <name>".to_string());
      return;
    }

    match self.config.categories.iter().position(|c| c == name) {
      Some(idx) => {
        self.draft.category_idx = idx;
      }
      None => {
        self.alert = Some(format!(
          "Unknown category: {} (configured: {})",
          name,
          self.config.categories.join(", ")
        ));
      }
    }
  }

  fn share_tasks(&mut self) -> Result<()> {
    if self.store.is_empty() {
      self.alert = Some("Nothing to share yet".to_string());
      return Ok(());
    }

    let text = self.store.share_text();
    match share::share(&text, &self.data_dir) {
      Ok(ShareOutcome::Clipboard(tool)) => {
        self.alert = Some(format!(
          "📋 Copied {} tasks to the clipboard ({})",
          self.store.len(),
          tool
        ));
      }
      Ok(ShareOutcome::File(path)) => {
        self.alert = Some(format!("Share text saved to {}", path.display()));
      }
      Err(e) => {
        self.alert = Some(format!("Sharing failed: {}", e));
      }
    }
    Ok(())
  }

  fn toggle_theme(&mut self) -> Result<()> {
    self.theme = self.theme.toggled();
    self.kv.set(THEME_KEY, self.theme.name())
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.filtered().len();
    if len > 0 {
      self.selected = (self.selected as i32 + delta).rem_euclid(len as i32) as usize;
    }
  }

  /// Keep the selection on a real row after deletions and filter edits.
  fn clamp_selection(&mut self) {
    let len = self.filtered().len();
    if len == 0 {
      self.selected = 0;
    } else if self.selected >= len {
      self.selected = len - 1;
    }
  }

  fn selected_task_id(&self) -> Option<i64> {
    self.filtered().get(self.selected).map(|t| t.id)
  }

  // Accessors for UI rendering
  pub fn filtered(&self) -> Vec<&Task> {
    self.store.filter(&self.filter)
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn theme(&self) -> Theme {
    self.theme
  }

  pub fn filter(&self) -> &str {
    &self.filter
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  pub fn alert(&self) -> Option<&str> {
    self.alert.as_deref()
  }

  pub fn insert_input(&self) -> &TextInput {
    &self.insert_input
  }

  pub fn command_input(&self) -> &str {
    &self.command_input
  }

  pub fn autocomplete_suggestions(&self) -> Vec<&'static commands::Command> {
    commands::get_suggestions(&self.command_input)
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }

  pub fn task_count(&self) -> usize {
    self.store.len()
  }

  pub fn pending_reminders(&self) -> usize {
    self.scheduler.pending_count()
  }

  pub fn current_category(&self) -> &str {
    self
      .config
      .categories
      .get(self.draft.category_idx)
      .map(String::as_str)
      .unwrap_or("genel")
  }

  /// Status-line summary of the pending draft.
  pub fn draft_status(&self) -> String {
    let mut parts = vec![format!("kategori: {}", self.current_category())];
    if let Some(when) = self.draft.remind_at {
      parts.push(format!("⏰ {}", when.format("%d.%m.%Y %H:%M")));
    }
    if self.draft.image.is_some() {
      parts.push("📎".to_string());
    }
    parts.join("  ")
  }
}

/// Read a file into a `data:` URI for storage inside the task record.
fn image_data_uri(path: &Path) -> Result<String> {
  use base64::engine::general_purpose::STANDARD as B64;
  use base64::Engine;

  let bytes =
    std::fs::read(path).map_err(|e| eyre!("cannot read {}: {}", path.display(), e))?;

  let extension = path
    .extension()
    .and_then(|e| e.to_str())
    .map(|e| e.to_ascii_lowercase());
  let mime = match extension.as_deref() {
    Some("png") => "image/png",
    Some("jpg") | Some("jpeg") => "image/jpeg",
    Some("gif") => "image/gif",
    Some("webp") => "image/webp",
    _ => "application/octet-stream",
  };

  Ok(format!("data:{};base64,{}", mime, B64.encode(bytes)))
}

/// Accepts `YYYY-MM-DD HH:MM` or `DD.MM.YYYY HH:MM`, interpreted as local time.
fn parse_remind_at(input: &str) -> Result<DateTime<Local>> {
  for format in ["%Y-%m-%d %H:%M", "%d.%m.%Y %H:%M"] {
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
      return Local
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| eyre!("ambiguous local time {}", input));
    }
  }
  Err(eyre!("expected YYYY-MM-DD HH:MM"))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn test_app(dir: &Path) -> App {
    let config = Config {
      data_dir: Some(dir.to_path_buf()),
      ..Config::default()
    };
    App::new(config).unwrap()
  }

  #[tokio::test]
  async fn test_submit_task_consumes_draft() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());

    app.draft.image = Some("data:image/png;base64,AAAA".to_string());
    app.submit_task("resimli not").unwrap();

    assert_eq!(app.task_count(), 1);
    assert!(app.draft.image.is_none());
    assert!(app.filtered()[0].image.is_some());
  }

  #[tokio::test]
  async fn test_submit_blank_keeps_draft() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());

    app.draft.image = Some("data:image/png;base64,AAAA".to_string());
    app.submit_task("   ").unwrap();

    assert_eq!(app.task_count(), 0);
    assert!(app.draft.image.is_some());
  }

  #[tokio::test]
  async fn test_delete_clamps_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());

    app.submit_task("bir").unwrap();
    app.submit_task("iki").unwrap();
    app.selected = 1;

    app.delete_selected().unwrap();
    assert_eq!(app.task_count(), 1);
    assert_eq!(app.selected, 0);
  }

  #[tokio::test]
  async fn test_unknown_command_alerts() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());

    app.command_input = "frobnicate".to_string();
    app.execute_command().unwrap();
    assert!(app.alert().unwrap().contains("frobnicate"));
  }

  #[tokio::test]
  async fn test_set_category_by_name() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = test_app(dir.path());

    app.set_category("kişisel");
    assert_eq!(app.current_category(), "kişisel");

    app.set_category("yok");
    assert!(app.alert().unwrap().contains("Unknown category"));
  }

  #[tokio::test]
  async fn test_theme_toggle_persists() {
    let dir = tempfile::tempdir().unwrap();
    {
      let mut app = test_app(dir.path());
      app.toggle_theme().unwrap();
      assert_eq!(app.theme(), Theme::Dark);
    }

    let app = test_app(dir.path());
    assert_eq!(app.theme(), Theme::Dark);
  }

  #[test]
  fn test_image_data_uri_detects_mime() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resim.PNG");
    std::fs::write(&path, b"\x89PNG").unwrap();

    let uri = image_data_uri(&path).unwrap();
    assert!(uri.starts_with("data:image/png;base64,"));
  }

  #[test]
  fn test_image_data_uri_missing_file_errors() {
    assert!(image_data_uri(Path::new("/no/such/resim.png")).is_err());
  }

  #[test]
  fn test_parse_remind_at_formats() {
    assert!(parse_remind_at("2026-08-07 09:30").is_ok());
    assert!(parse_remind_at("07.08.2026 09:30").is_ok());
    assert!(parse_remind_at("tomorrow").is_err());
  }
}
