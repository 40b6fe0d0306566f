/// Available commands and autocomplete logic

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  pub description: &'static str,
  /// Argument hint shown in the suggestion list
  pub usage: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "attach",
    aliases: &["a", "image"],
    description: "Attach an image to the next task",
    usage: "<path>",
  },
  Command {
    name: "remind",
    aliases: &["r"],
    description: "Set a reminder time for the next task",
    usage: "<YYYY-MM-DD HH:MM>",
  },
  Command {
    name: "category",
    aliases: &["c", "cat"],
    description: "Pick the category for the next task",
    usage: "<name>",
  },
  Command {
    name: "share",
    aliases: &["s"],
    description: "Share all tasks",
    usage: "",
  },
  Command {
    name: "theme",
    aliases: &["t"],
    description: "Toggle light/dark theme",
    usage: "",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit jotter",
    usage: "",
  },
];

/// Split a command line into its name token and the argument remainder.
pub fn split_input(input: &str) -> (&str, &str) {
  let input = input.trim_start();
  match input.split_once(char::is_whitespace) {
    Some((name, args)) => (name, args.trim()),
    None => (input, ""),
  }
}

/// Get autocomplete suggestions for a given input. Only the command name is
/// matched; any argument text is ignored.
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let (name, _) = split_input(input);
  let input_lower = name.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}
