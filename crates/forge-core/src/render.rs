//! Pure projections of chat state into displayable regions
//!
//! Nothing here touches the network or a terminal. A front end draws a
//! [`Transcript`] and the visible [`Panels`] as-is.

use crate::state::{ChatHistoryEntry, ChatType, ImageResult, RequestId};

pub const DESIGN_SUCCESS_CAPTION: &str = "Here are your logo and banner designs!";
pub const WEBSITE_SUCCESS_CAPTION: &str = "Here is your website mockup!";
pub const FAILURE_CAPTION: &str =
    "Sorry, something went wrong while generating images. Please try again.";

/// One chat bubble on screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranscriptEntry {
    User(String),
    AiSuccess(ChatType),
    AiFailure,
    /// Transient placeholder while a request is in flight
    Loading { request: RequestId, chat_type: ChatType },
}

impl TranscriptEntry {
    pub fn is_user(&self) -> bool {
        matches!(self, TranscriptEntry::User(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, TranscriptEntry::Loading { .. })
    }

    /// Text of the bubble. Loading text is the static part; front ends animate it.
    pub fn text(&self) -> &str {
        match self {
            TranscriptEntry::User(text) => text.as_str(),
            TranscriptEntry::AiSuccess(chat_type) => success_caption(*chat_type),
            TranscriptEntry::AiFailure => FAILURE_CAPTION,
            TranscriptEntry::Loading { chat_type: ChatType::Design, .. } => {
                "Generating logo and banner"
            }
            TranscriptEntry::Loading { chat_type: ChatType::Website, .. } => {
                "Generating website mockup"
            }
        }
    }
}

pub fn success_caption(chat_type: ChatType) -> &'static str {
    match chat_type {
        ChatType::Design => DESIGN_SUCCESS_CAPTION,
        ChatType::Website => WEBSITE_SUCCESS_CAPTION,
    }
}

/// Ordered bubbles currently shown for the active chat type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// Drop the placeholder for `request`; returns whether one was present
    pub fn remove_loading(&mut self, request: RequestId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| {
            !matches!(e, TranscriptEntry::Loading { request: r, .. } if *r == request)
        });
        self.entries.len() != before
    }
}

/// Rebuild the transcript for a chat type from its stored history.
/// Each entry becomes a user bubble followed by a success caption.
pub fn replay_transcript(history: &[ChatHistoryEntry], chat_type: ChatType) -> Transcript {
    let mut transcript = Transcript::new();
    for entry in history {
        transcript.push(TranscriptEntry::User(entry.user_message.clone()));
        transcript.push(TranscriptEntry::AiSuccess(chat_type));
    }
    transcript
}

/// Logo slot plus the banner row of the images slot
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DesignPanel {
    pub logo: Vec<ImageResult>,
    pub banners: Vec<ImageResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WebsitePanel {
    pub mockup: Option<ImageResult>,
}

/// Logo images go to the logo slot, banners to the banner row; other tags are dropped.
pub fn render_design(images: &[ImageResult]) -> DesignPanel {
    let mut panel = DesignPanel::default();
    for image in images {
        match image.kind.as_str() {
            "logo" => panel.logo.push(image.clone()),
            "banner" => panel.banners.push(image.clone()),
            other => tracing::debug!(tag = other, "dropping image with unrecognized tag"),
        }
    }
    panel
}

/// Only the first image is shown.
pub fn render_website(images: &[ImageResult]) -> WebsitePanel {
    WebsitePanel {
        mockup: images.first().cloned(),
    }
}

/// The two display panels; exactly one is visible at a time
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Panels {
    pub design: DesignPanel,
    pub website: WebsitePanel,
    visible: ChatType,
}

impl Panels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self, chat_type: ChatType) -> bool {
        self.visible == chat_type
    }

    pub fn show(&mut self, chat_type: ChatType) {
        self.visible = chat_type;
    }

    /// Replace the contents of `chat_type`'s panel with a fresh rendering
    pub fn render_images(&mut self, images: &[ImageResult], chat_type: ChatType) {
        match chat_type {
            ChatType::Design => self.design = render_design(images),
            ChatType::Website => self.website = render_website(images),
        }
    }
}
