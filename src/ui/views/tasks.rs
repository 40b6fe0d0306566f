use crate::tasks::Task;
use crate::theme::Theme;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

pub fn draw_task_list(
  frame: &mut Frame,
  area: Rect,
  tasks: &[&Task],
  selected: usize,
  theme: Theme,
  filter: &str,
) {
  let title = if filter.is_empty() {
    format!(" Notlar ({}) ", tasks.len())
  } else {
    format!(" Notlar ({}) /{} ", tasks.len(), filter)
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(theme.border());

  if tasks.is_empty() {
    let content = if filter.is_empty() {
      "No tasks yet. Press a to add one."
    } else {
      "No tasks match the filter."
    };
    let paragraph = Paragraph::new(content).block(block).style(theme.muted());
    frame.render_widget(paragraph, area);
    return;
  }

  let items: Vec<ListItem> = tasks
    .iter()
    .map(|task| {
      let checkbox = if task.completed { "✔" } else { "☐" };
      let text_style = if task.completed {
        theme.done()
      } else {
        theme.text()
      };

      let mut meta = vec![
        Span::styled(format!("  {}", task.category), theme.accent()),
        Span::styled(format!(" • {}", task.created_at), theme.muted()),
      ];
      if let Some(remind_at) = task.remind_at {
        meta.push(Span::styled(
          format!(" • ⏰ {}", remind_at.format("%d.%m.%Y %H:%M")),
          theme.muted(),
        ));
      }
      if task.image.is_some() {
        meta.push(Span::styled(" • 📎", theme.muted()));
      }

      let lines = vec![
        Line::from(vec![
          Span::styled(format!("{} ", checkbox), theme.text()),
          Span::styled(truncate(&task.text, 70), text_style),
        ]),
        Line::from(meta),
      ];
      ListItem::new(lines)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(theme.highlight())
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(selected));

  frame.render_stateful_widget(list, area, &mut state);
}

fn truncate(s: &str, max_chars: usize) -> String {
  if s.chars().count() <= max_chars {
    s.to_string()
  } else {
    let cut: String = s.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", cut)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_truncate_short_string_unchanged() {
    assert_eq!(truncate("kısa", 10), "kısa");
  }

  #[test]
  fn test_truncate_respects_char_boundaries() {
    let long = "çok uzun bir görev metni";
    let cut = truncate(long, 10);
    assert_eq!(cut.chars().count(), 10);
    assert!(cut.ends_with("..."));
  }
}
