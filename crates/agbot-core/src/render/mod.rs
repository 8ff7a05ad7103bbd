//! Message renderer.
//!
//! Turns a [`ChatMessage`] into a [`RenderedMessage`]: sender label and icon,
//! time of day, and the body converted from markdown into [`Block`]s. Host
//! shells decide how blocks look; nothing here knows about colours or
//! layout.
//!
//! [`render`] is pure. The only environment-dependent input, the local UTC
//! offset, is captured once in [`RenderOptions::default`].

mod markdown;

use chrono::{FixedOffset, Local, Offset, Utc};
use serde::Serialize;

use crate::session::{ChatMessage, Sender};

pub use markdown::{Block, Span, SpanStyle, literal_blocks, markdown_to_blocks};

/// Display name of the assistant.
pub const BOT_LABEL: &str = "AG TECH";
/// Display name of the person chatting.
pub const USER_LABEL: &str = "You";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum ClockFormat {
    /// `14:05`
    #[default]
    TwentyFourHour,
    /// `02:05 PM`
    TwelveHour,
}

/// How user-authored text is interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum UserTextMode {
    /// Same markdown path as bot replies.
    #[default]
    Markdown,
    /// Shown verbatim; markup the user typed stays literal.
    Literal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Offset used to display timestamps.
    pub offset: FixedOffset,
    pub clock: ClockFormat,
    pub user_text: UserTextMode,
}

impl RenderOptions {
    /// Options that display times in UTC.
    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
            clock: ClockFormat::default(),
            user_text: UserTextMode::default(),
        }
    }

    pub fn with_clock(mut self, clock: ClockFormat) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_user_text(mut self, mode: UserTextMode) -> Self {
        self.user_text = mode;
        self
    }
}

impl Default for RenderOptions {
    /// Uses the host's current local offset.
    fn default() -> Self {
        Self {
            offset: *Local::now().offset(),
            ..Self::utc()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SenderIcon {
    Bot,
    User,
}

/// Display-ready form of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedMessage {
    pub sender: Sender,
    pub icon: SenderIcon,
    pub label: &'static str,
    /// Hour and minute only.
    pub time: String,
    pub body: Vec<Block>,
}

impl RenderedMessage {
    /// Body text without styling, one block per line.
    pub fn plain_text(&self) -> String {
        self.body
            .iter()
            .map(Block::plain_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Renders one message.
pub fn render(message: &ChatMessage, options: &RenderOptions) -> RenderedMessage {
    let (icon, label) = match message.sender() {
        Sender::Bot => (SenderIcon::Bot, BOT_LABEL),
        Sender::User => (SenderIcon::User, USER_LABEL),
    };

    let body = match (message.sender(), options.user_text) {
        (Sender::User, UserTextMode::Literal) => literal_blocks(message.text()),
        _ => markdown_to_blocks(message.text()),
    };

    RenderedMessage {
        sender: message.sender(),
        icon,
        label,
        time: format_time(message, options),
        body,
    }
}

fn format_time(message: &ChatMessage, options: &RenderOptions) -> String {
    let local = message.timestamp().with_timezone(&options.offset);
    let pattern = match options.clock {
        ClockFormat::TwentyFourHour => "%H:%M",
        ClockFormat::TwelveHour => "%I:%M %p",
    };
    local.format(pattern).to_string()
}
