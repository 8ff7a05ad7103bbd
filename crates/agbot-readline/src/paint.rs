//! Terminal drawing of rendered messages and panels.

use agbot_core::render::{Block, RenderedMessage, SenderIcon, Span};
use agbot_core::session::RecentSearches;
use colored::{ColoredString, Colorize};

const RULE_WIDTH: usize = 40;

/// Draws one chat bubble: a header line with label and time, then the body.
pub fn paint_message(message: &RenderedMessage) -> String {
    let label = match message.icon {
        SenderIcon::Bot => format!("⚡ {}", message.label).bright_blue().bold(),
        SenderIcon::User => format!("• {}", message.label).green().bold(),
    };

    let mut lines = vec![format!("{} {}", label, message.time.bright_black())];
    for block in &message.body {
        lines.extend(paint_block(block));
    }
    lines.join("\n")
}

/// Draws the recent-searches panel, numbered from 1.
pub fn paint_recent_searches(recent: &RecentSearches) -> String {
    let mut lines = vec!["Recent Searches".bold().to_string()];
    if recent.is_empty() {
        lines.push("  No recent searches".bright_black().to_string());
    }
    for (index, entry) in recent.iter().enumerate() {
        lines.push(format!("  {}. {}", index + 1, entry));
    }
    lines.push("  /pick <n> to reuse, /close to hide".bright_black().to_string());
    lines.join("\n")
}

fn paint_block(block: &Block) -> Vec<String> {
    match block {
        Block::Heading { spans, .. } => vec![paint_spans(spans).bold().underline().to_string()],
        Block::Paragraph { spans } => paint_spans(spans).lines().map(str::to_string).collect(),
        Block::CodeBlock { code, .. } => code
            .lines()
            .map(|line| format!("    {}", line.cyan()))
            .collect(),
        Block::ListItem {
            depth,
            marker,
            spans,
        } => {
            let indent = "  ".repeat(*depth);
            let marker = match marker {
                Some(marker) => format!("{marker} "),
                None => "  ".to_string(),
            };
            vec![format!("{indent}{marker}{}", paint_spans(spans))]
        }
        Block::Rule => vec!["─".repeat(RULE_WIDTH).bright_black().to_string()],
    }
}

fn paint_spans(spans: &[Span]) -> String {
    spans.iter().map(|span| paint_span(span).to_string()).collect()
}

fn paint_span(span: &Span) -> ColoredString {
    let mut text = ColoredString::from(span.text.as_str());
    if span.style.code {
        text = text.cyan();
    }
    if span.style.strong {
        text = text.bold();
    }
    if span.style.emphasis {
        text = text.italic();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use agbot_core::render::{RenderOptions, render};
    use agbot_core::session::{ChatMessage, Sender};

    fn plain(message: &RenderedMessage) -> String {
        colored::control::set_override(false);
        paint_message(message)
    }

    #[test]
    fn test_paint_bot_markdown() {
        let message = ChatMessage::new(
            Sender::Bot,
            "# Breakers\n\n1. Turn **off** power\n2. Verify with `tester`\n\n---",
        );
        let rendered = render(&message, &RenderOptions::utc());

        let painted = plain(&rendered);
        let lines: Vec<&str> = painted.lines().collect();

        assert!(lines[0].starts_with("⚡ AG TECH "));
        assert_eq!(lines[1], "Breakers");
        assert_eq!(lines[2], "1. Turn off power");
        assert_eq!(lines[3], "2. Verify with tester");
        assert_eq!(lines[4], "─".repeat(RULE_WIDTH));
    }

    #[test]
    fn test_paint_user_header() {
        let rendered = render(&ChatMessage::user("hi"), &RenderOptions::utc());

        let painted = plain(&rendered);

        assert!(painted.starts_with("• You "));
        assert!(painted.ends_with("\nhi"));
    }

    #[test]
    fn test_empty_recent_searches_panel() {
        colored::control::set_override(false);

        let painted = paint_recent_searches(&RecentSearches::new());

        assert!(painted.contains("No recent searches"));
    }
}
