pub mod components;
mod views;

use crate::app::{App, Mode};
use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(1),    // Task list
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  draw_header(frame, chunks[0], app);

  views::tasks::draw_task_list(
    frame,
    chunks[1],
    &app.filtered(),
    app.selected(),
    app.theme(),
    app.filter(),
  );

  draw_status_bar(frame, chunks[2], app);

  if *app.mode() == Mode::Command {
    draw_command_suggestions(frame, chunks[1], app);
  }

  // The alert overlay paints last so it blocks everything beneath it
  if let Some(alert) = app.alert() {
    let area = frame.area();
    draw_alert(frame, area, alert, app.theme());
  }
}

fn draw_header(frame: &mut Frame, area: Rect, app: &App) {
  let theme = app.theme();
  let mut spans = vec![
    Span::styled(" jotter ", theme.accent().add_modifier(Modifier::BOLD)),
    Span::styled(format!("{} notes", app.task_count()), theme.muted()),
  ];
  if app.pending_reminders() > 0 {
    spans.push(Span::styled(
      format!("  ⏰ {}", app.pending_reminders()),
      theme.muted(),
    ));
  }
  spans.push(Span::raw("  "));
  spans.push(Span::raw(theme.indicator()));
  frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let theme = app.theme();
  let (content, style) = match app.mode() {
    Mode::Normal => {
      let hint = " a:add  space:toggle  d:delete  /search  :command  t:theme  s:share  q:quit";
      (hint.to_string(), theme.muted())
    }
    Mode::Insert => {
      let input = app.insert_input();
      // Place the terminal cursor inside the input, after the "> " prefix
      let x = area.x + 2 + input.cursor_position() as u16;
      frame.set_cursor_position((x.min(area.right().saturating_sub(1)), area.y));
      (
        format!("> {}  [{}]", input.value(), app.draft_status()),
        theme.text(),
      )
    }
    Mode::Search => {
      let search = format!("/{}", app.filter());
      (search, Style::default().fg(Color::Cyan))
    }
    Mode::Command => {
      let cmd = format!(":{}", app.command_input());
      (cmd, Style::default().fg(Color::Yellow))
    }
  };

  let paragraph = Paragraph::new(content).style(style);
  frame.render_widget(paragraph, area);
}

/// Autocomplete popup anchored to the bottom of the list area.
fn draw_command_suggestions(frame: &mut Frame, area: Rect, app: &App) {
  let suggestions = app.autocomplete_suggestions();
  if suggestions.is_empty() {
    return;
  }

  let theme = app.theme();
  let height = (suggestions.len() as u16 + 2).min(8).min(area.height);
  let popup = Rect {
    x: area.x + 1,
    y: area.y + area.height.saturating_sub(height),
    width: area.width.saturating_sub(2).min(60),
    height,
  };

  let items: Vec<ListItem> = suggestions
    .iter()
    .map(|cmd| {
      let line = Line::from(vec![
        Span::styled(format!("{:<10}", cmd.name), theme.accent()),
        Span::styled(format!("{:<22}", cmd.usage), theme.muted()),
        Span::styled(cmd.description, theme.text()),
      ]);
      ListItem::new(line)
    })
    .collect();

  let list = List::new(items)
    .block(Block::default().borders(Borders::ALL).border_style(theme.border()))
    .highlight_style(theme.highlight());

  let mut state = ListState::default();
  state.select(Some(app.selected_suggestion()));

  frame.render_widget(Clear, popup);
  frame.render_stateful_widget(list, popup, &mut state);
}

/// Centered blocking alert. Any key dismisses it.
fn draw_alert(frame: &mut Frame, area: Rect, alert: &str, theme: Theme) {
  let width = (area.width * 3 / 5).clamp(20, 70).min(area.width);
  let height = 5.min(area.height);
  let popup = Rect {
    x: area.x + (area.width.saturating_sub(width)) / 2,
    y: area.y + (area.height.saturating_sub(height)) / 2,
    width,
    height,
  };

  let block = Block::default()
    .title(" Notice ")
    .borders(Borders::ALL)
    .border_style(theme.accent());

  let text = vec![
    Line::from(Span::styled(alert.to_string(), theme.text())),
    Line::from(""),
    Line::from(Span::styled("press any key", theme.muted())),
  ];

  let paragraph = Paragraph::new(text)
    .block(block)
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center);

  frame.render_widget(Clear, popup);
  frame.render_widget(paragraph, popup);
}
