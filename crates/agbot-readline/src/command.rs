/// Slash commands offered for completion and highlighting.
pub const COMMANDS: [&str; 4] = ["/recent", "/pick", "/close", "/help"];

/// One line of REPL input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Quit,
    Help,
    /// Show or hide the recent-searches panel.
    ToggleRecent,
    CloseRecent,
    /// 1-based position in the recent-searches panel.
    Pick(usize),
    /// A question for the assistant.
    Ask(String),
    Empty,
    Unknown(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if trimmed == "quit" || trimmed == "exit" {
            return Self::Quit;
        }
        if !trimmed.starts_with('/') {
            return Self::Ask(trimmed.to_string());
        }

        let mut parts = trimmed.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        match (name, arg) {
            ("/recent", None) => Self::ToggleRecent,
            ("/close", None) => Self::CloseRecent,
            ("/help", None) => Self::Help,
            ("/quit", None) => Self::Quit,
            ("/pick", Some(n)) => match n.parse::<usize>() {
                Ok(n) if n > 0 => Self::Pick(n),
                _ => Self::Unknown(trimmed.to_string()),
            },
            _ => Self::Unknown(trimmed.to_string()),
        }
    }
}
