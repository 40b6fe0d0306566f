//! Light/dark theme, persisted alongside the task list.

use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
  #[default]
  Light,
  Dark,
}

impl Theme {
  /// Parse a persisted theme name. Anything unknown falls back to light.
  pub fn from_name(name: &str) -> Self {
    match name {
      "dark" => Theme::Dark,
      _ => Theme::Light,
    }
  }

  /// Name stored in the key-value store.
  pub fn name(self) -> &'static str {
    match self {
      Theme::Light => "light",
      Theme::Dark => "dark",
    }
  }

  pub fn toggled(self) -> Self {
    match self {
      Theme::Light => Theme::Dark,
      Theme::Dark => Theme::Light,
    }
  }

  /// Indicator shown in the header, mirroring the toggle target.
  pub fn indicator(self) -> &'static str {
    match self {
      Theme::Light => "🌙",
      Theme::Dark => "☀️",
    }
  }

  pub fn text(self) -> Style {
    match self {
      Theme::Light => Style::default().fg(Color::Black),
      Theme::Dark => Style::default().fg(Color::White),
    }
  }

  pub fn muted(self) -> Style {
    Style::default().fg(Color::DarkGray)
  }

  pub fn border(self) -> Style {
    match self {
      Theme::Light => Style::default().fg(Color::Blue),
      Theme::Dark => Style::default().fg(Color::Cyan),
    }
  }

  pub fn accent(self) -> Style {
    match self {
      Theme::Light => Style::default().fg(Color::Magenta),
      Theme::Dark => Style::default().fg(Color::LightMagenta),
    }
  }

  pub fn highlight(self) -> Style {
    match self {
      Theme::Light => Style::default()
        .bg(Color::LightBlue)
        .add_modifier(Modifier::BOLD),
      Theme::Dark => Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    }
  }

  /// Completed tasks are struck through and dimmed.
  pub fn done(self) -> Style {
    self
      .muted()
      .add_modifier(Modifier::CROSSED_OUT)
  }
}
