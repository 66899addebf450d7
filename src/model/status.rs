//! Display payloads derived from a `ServerState`.

/// Fixed color palette for status embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
    Blue,
    Orange,
}

impl StatusColor {
    /// RGB value as used by Discord embeds.
    pub fn rgb(self) -> u32 {
        match self {
            StatusColor::Green => 0x57F287,
            StatusColor::Yellow => 0xFEE75C,
            StatusColor::Red => 0xED4245,
            StatusColor::Blue => 0x5865F2,
            StatusColor::Orange => 0xE67E22,
        }
    }
}

/// A single labelled field of an embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl StatusField {
    pub fn new(name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            inline,
        }
    }
}

/// Rendered live status.
///
/// A pure function of a `ServerState`. Two values compare equal field by field when
/// nothing visible changed, which is what the live status updater relies on to skip
/// pushes. The embed timestamp is added when posting and is not part of this value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStatus {
    pub title: String,
    pub description: String,
    pub fields: Vec<StatusField>,
    pub color: StatusColor,
    pub footer: String,
    pub presence_text: String,
}

impl RenderedStatus {
    /// The embed part of the status, without the presence text.
    pub fn to_panel(&self) -> Panel {
        Panel {
            title: self.title.clone(),
            description: Some(self.description.clone()),
            fields: self.fields.clone(),
            color: self.color,
            footer: Some(self.footer.clone()),
        }
    }
}

/// Generic embed payload used for command replies and notifications.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    pub title: String,
    pub description: Option<String>,
    pub fields: Vec<StatusField>,
    pub color: StatusColor,
    pub footer: Option<String>,
}

impl Panel {
    pub fn new(title: impl Into<String>, color: StatusColor) -> Self {
        Self {
            title: title.into(),
            description: None,
            fields: Vec::new(),
            color,
            footer: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(StatusField::new(name, value, inline));
        self
    }

    pub fn footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }
}

/// Kind of activity shown next to the bot's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityKind {
    Playing,
    Listening,
    Watching,
}

/// Online status shown on the bot's avatar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    Online,
    Idle,
    DoNotDisturb,
}

/// The bot's presence as derived from a `ServerState`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    pub activity: ActivityKind,
    pub text: String,
    pub status: Availability,
}
