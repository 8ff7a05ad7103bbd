//! Markdown to rich-text blocks, built on pulldown-cmark.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::Serialize;

/// Inline style flags. Nested emphasis combines flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SpanStyle {
    pub strong: bool,
    pub emphasis: bool,
    pub code: bool,
}

/// A run of text sharing one style.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Span {
    pub text: String,
    pub style: SpanStyle,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: SpanStyle::default(),
        }
    }
}

/// A block of rich text, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading {
        level: u8,
        spans: Vec<Span>,
    },
    Paragraph {
        spans: Vec<Span>,
    },
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    /// One list entry. `depth` is 0 for top-level lists. `marker` is `-` for
    /// bullets, `N.` for ordered lists and `None` for continuation paragraphs
    /// of the same item.
    ListItem {
        depth: usize,
        marker: Option<String>,
        spans: Vec<Span>,
    },
    Rule,
}

impl Block {
    /// Text content without styling.
    pub fn plain_text(&self) -> String {
        match self {
            Block::Heading { spans, .. }
            | Block::Paragraph { spans }
            | Block::ListItem { spans, .. } => spans.iter().map(|s| s.text.as_str()).collect(),
            Block::CodeBlock { code, .. } => code.clone(),
            Block::Rule => String::new(),
        }
    }
}

/// Converts markdown into blocks.
pub fn markdown_to_blocks(source: &str) -> Vec<Block> {
    let mut builder = BlockBuilder::default();
    for event in Parser::new(source) {
        builder.handle(event);
    }
    builder.finish()
}

/// Treats `source` as plain text: one paragraph per blank-line-separated
/// chunk, with no markup interpreted.
pub fn literal_blocks(source: &str) -> Vec<Block> {
    source
        .split("\n\n")
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| Block::Paragraph {
            spans: vec![Span::plain(chunk)],
        })
        .collect()
}

fn heading_level_to_u8(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

struct ItemContext {
    depth: usize,
    marker: Option<String>,
}

#[derive(Default)]
struct BlockBuilder {
    blocks: Vec<Block>,
    spans: Vec<Span>,
    strong: usize,
    emphasis: usize,
    heading: Option<u8>,
    code: Option<(Option<String>, String)>,
    // Next ordinal per open list; `None` for bullet lists.
    lists: Vec<Option<u64>>,
    items: Vec<ItemContext>,
    // Destination and text length at the start of each open link.
    links: Vec<(String, usize)>,
}

impl BlockBuilder {
    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                self.flush();
                self.heading = Some(heading_level_to_u8(level));
            }
            Event::End(TagEnd::Heading(_)) => {
                self.flush();
                self.heading = None;
            }
            Event::End(TagEnd::Paragraph)
            | Event::End(TagEnd::BlockQuote(_))
            | Event::End(TagEnd::HtmlBlock) => self.flush(),
            Event::Start(Tag::CodeBlock(kind)) => {
                self.flush();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string),
                    CodeBlockKind::Indented => None,
                };
                self.code = Some((language, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, code)) = self.code.take() {
                    self.blocks.push(Block::CodeBlock {
                        language,
                        code: code.trim_end_matches('\n').to_string(),
                    });
                }
            }
            Event::Start(Tag::List(start)) => {
                self.flush();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.lists.pop();
            }
            Event::Start(Tag::Item) => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = format!("{next}.");
                        *next += 1;
                        marker
                    }
                    _ => "-".to_string(),
                };
                self.items.push(ItemContext {
                    depth,
                    marker: Some(marker),
                });
            }
            Event::End(TagEnd::Item) => {
                self.flush();
                self.items.pop();
            }
            Event::Start(Tag::Link { dest_url, .. }) => {
                let start = self.text_len();
                self.links.push((dest_url.to_string(), start));
            }
            Event::End(TagEnd::Link) => {
                if let Some((url, start)) = self.links.pop() {
                    let label = self.text_since(start);
                    if !url.is_empty() && label != url.trim_start_matches("mailto:") {
                        self.push_text(&format!(" ({url})"), false);
                    }
                }
            }
            Event::Start(Tag::Strong) => self.strong += 1,
            Event::End(TagEnd::Strong) => self.strong = self.strong.saturating_sub(1),
            Event::Start(Tag::Emphasis) => self.emphasis += 1,
            Event::End(TagEnd::Emphasis) => self.emphasis = self.emphasis.saturating_sub(1),
            Event::Text(text) => match self.code.as_mut() {
                Some((_, code)) => code.push_str(&text),
                None => self.push_text(&text, false),
            },
            Event::Code(code) => self.push_text(&code, true),
            Event::Html(html) | Event::InlineHtml(html) => self.push_text(&html, false),
            Event::SoftBreak => self.push_text(" ", false),
            Event::HardBreak => self.push_text("\n", false),
            Event::TaskListMarker(checked) => {
                self.push_text(if checked { "[x] " } else { "[ ] " }, false)
            }
            Event::Rule => {
                self.flush();
                self.blocks.push(Block::Rule);
            }
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str, code: bool) {
        let style = SpanStyle {
            strong: self.strong > 0,
            emphasis: self.emphasis > 0,
            code,
        };
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(text),
            _ => self.spans.push(Span {
                text: text.to_string(),
                style,
            }),
        }
    }

    fn text_len(&self) -> usize {
        self.spans.iter().map(|span| span.text.len()).sum()
    }

    fn text_since(&self, start: usize) -> String {
        let text: String = self.spans.iter().map(|span| span.text.as_str()).collect();
        text.get(start..).unwrap_or_default().to_string()
    }

    fn flush(&mut self) {
        if self.spans.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.spans);

        let block = if let Some(level) = self.heading {
            Block::Heading { level, spans }
        } else if let Some(item) = self.items.last_mut() {
            Block::ListItem {
                depth: item.depth,
                marker: item.marker.take(),
                spans,
            }
        } else {
            Block::Paragraph { spans }
        };
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(text: &str, strong: bool, emphasis: bool, code: bool) -> Span {
        Span {
            text: text.to_string(),
            style: SpanStyle {
                strong,
                emphasis,
                code,
            },
        }
    }

    #[test]
    fn test_heading_and_paragraph() {
        let blocks = markdown_to_blocks("## Wire sizing\n\nUse copper.");

        assert_eq!(
            blocks,
            vec![
                Block::Heading {
                    level: 2,
                    spans: vec![Span::plain("Wire sizing")],
                },
                Block::Paragraph {
                    spans: vec![Span::plain("Use copper.")],
                },
            ]
        );
    }

    #[test]
    fn test_inline_styles() {
        let blocks = markdown_to_blocks("Use **12 AWG** for *20A*, see `NEC 310.16`.");

        let Block::Paragraph { spans } = &blocks[0] else {
            panic!("expected paragraph, got {:?}", blocks[0]);
        };
        assert_eq!(
            spans,
            &vec![
                Span::plain("Use "),
                styled("12 AWG", true, false, false),
                Span::plain(" for "),
                styled("20A", false, true, false),
                Span::plain(", see "),
                styled("NEC 310.16", false, false, true),
                Span::plain("."),
            ]
        );
    }

    #[test]
    fn test_soft_breaks_join_into_one_span() {
        let blocks = markdown_to_blocks("line one\nline two");

        assert_eq!(
            blocks,
            vec![Block::Paragraph {
                spans: vec![Span::plain("line one line two")],
            }]
        );
    }

    #[test]
    fn test_lists_get_markers_and_depth() {
        let blocks =
            markdown_to_blocks("1. Turn off the breaker\n2. Test for voltage\n   - use a tester\n");

        let summary: Vec<(usize, Option<String>, String)> = blocks
            .iter()
            .map(|block| match block {
                Block::ListItem {
                    depth,
                    marker,
                    spans,
                } => (
                    *depth,
                    marker.clone(),
                    spans.iter().map(|s| s.text.as_str()).collect(),
                ),
                other => panic!("unexpected block {other:?}"),
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                (0, Some("1.".to_string()), "Turn off the breaker".to_string()),
                (0, Some("2.".to_string()), "Test for voltage".to_string()),
                (1, Some("-".to_string()), "use a tester".to_string()),
            ]
        );
    }

    #[test]
    fn test_fenced_code_block_keeps_language() {
        let blocks = markdown_to_blocks("```text\nL1 -> breaker\nN -> bar\n```");

        assert_eq!(
            blocks,
            vec![Block::CodeBlock {
                language: Some("text".to_string()),
                code: "L1 -> breaker\nN -> bar".to_string(),
            }]
        );
    }

    #[test]
    fn test_link_keeps_destination() {
        let blocks = markdown_to_blocks("See [NEC 210.8](https://example.org/nec) for GFCI.");

        assert_eq!(
            blocks[0].plain_text(),
            "See NEC 210.8 (https://example.org/nec) for GFCI."
        );
    }

    #[test]
    fn test_autolink_is_not_repeated() {
        let blocks = markdown_to_blocks("<https://example.org/nec>");

        assert_eq!(blocks[0].plain_text(), "https://example.org/nec");
    }

    #[test]
    fn test_rule_and_empty_input() {
        assert_eq!(markdown_to_blocks("---"), vec![Block::Rule]);
        assert!(markdown_to_blocks("").is_empty());
    }

    #[test]
    fn test_literal_blocks_do_not_interpret_markup() {
        let blocks = literal_blocks("**not bold**\n\n# not a heading");

        assert_eq!(
            blocks,
            vec![
                Block::Paragraph {
                    spans: vec![Span::plain("**not bold**")],
                },
                Block::Paragraph {
                    spans: vec![Span::plain("# not a heading")],
                },
            ]
        );
    }
}
