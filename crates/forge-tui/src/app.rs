use std::sync::Arc;
use std::time::Instant;

use forge_core::{
    render::TranscriptEntry, ChatController, ChatOutcome, ChatType, Config, ForgeApi, StatsBoard,
    StatsPoller, StatsSnapshot,
};
use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use crate::tui::AppEvent;

pub struct App {
    // Core state
    pub should_quit: bool,
    pub config: Config,

    // Input line
    pub input: String,
    pub input_cursor: usize, // cursor position in chars

    // Chat and stats
    pub chat: ChatController,
    pub stats: StatsBoard,
    pub poller: StatsPoller,
    pub api: Arc<dyn ForgeApi>,

    // Transcript scrolling
    pub transcript_scroll: u16,
    pub transcript_height: u16, // Height of transcript area for scroll calculations
    pub transcript_width: u16,  // Width of transcript area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation
    tick_count: u8,

    // Tab areas for mouse hit-testing (updated during render)
    pub tab_areas: Vec<(ChatType, Rect)>,
    pub transcript_area: Option<Rect>,

    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: Config, api: Arc<dyn ForgeApi>, events: UnboundedSender<AppEvent>) -> Self {
        let stats = StatsBoard::new(config.volume_unit);
        let poller = StatsPoller::new(Arc::clone(&api));

        Self {
            should_quit: false,
            config,

            input: String::new(),
            input_cursor: 0,

            chat: ChatController::new(),
            stats,
            poller,
            api,

            transcript_scroll: 0,
            transcript_height: 0,
            transcript_width: 0,

            animation_frame: 0,
            tick_count: 0,

            tab_areas: Vec::new(),
            transcript_area: None,

            events,
        }
    }

    /// Start the stats ticker and show the default tab
    pub fn init(&mut self) {
        let tx = self.events.clone();
        self.poller.start(self.config.stats_interval(), move |snapshot| {
            let _ = tx.send(AppEvent::Stats(snapshot));
        });
        self.chat.switch_tab(self.chat.active());
    }

    /// Stop polling and cancel outstanding requests
    pub fn dispose(&mut self) {
        self.poller.stop();
        self.chat.dispose();
    }

    pub fn switch_tab(&mut self, chat_type: ChatType) {
        self.chat.switch_tab(chat_type);
        self.scroll_transcript_to_bottom();
    }

    pub fn toggle_tab(&mut self) {
        self.switch_tab(self.chat.active().toggled());
    }

    /// Send the input line. Blank input leaves everything as it was.
    pub fn submit(&mut self) {
        let Some(pending) = self.chat.begin_send(&self.input) else {
            return;
        };

        self.input.clear();
        self.input_cursor = 0;

        let tx = self.events.clone();
        pending.spawn(Arc::clone(&self.api), move |outcome| {
            let _ = tx.send(AppEvent::Chat(outcome));
        });

        self.scroll_transcript_to_bottom();
    }

    pub fn apply_outcome(&mut self, outcome: ChatOutcome) {
        if self.chat.complete_send(outcome) {
            self.scroll_transcript_to_bottom();
        }
    }

    pub fn apply_stats(&mut self, snapshot: StatsSnapshot) {
        self.stats.render_stats(snapshot, Instant::now());
    }

    /// Advance animations (called by Tick event)
    pub fn tick(&mut self) {
        self.stats.tick(Instant::now());

        // Ellipsis steps every third tick
        self.tick_count = self.tick_count.wrapping_add(1);
        if self.chat.is_loading() && self.tick_count % 3 == 0 {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn scroll_up(&mut self) {
        self.transcript_scroll = self.transcript_scroll.saturating_sub(1);
    }

    pub fn scroll_down(&mut self) {
        let max_scroll = self.transcript_lines().saturating_sub(self.visible_height());
        if self.transcript_scroll < max_scroll {
            self.transcript_scroll += 1;
        }
    }

    /// Scroll so the newest bubble is visible
    pub fn scroll_transcript_to_bottom(&mut self) {
        let total_lines = self.transcript_lines();
        let visible_height = self.visible_height();

        self.transcript_scroll = total_lines.saturating_sub(visible_height);
    }

    fn visible_height(&self) -> u16 {
        if self.transcript_height > 0 {
            self.transcript_height
        } else {
            20
        }
    }

    /// Lines the transcript occupies once wrapped: role line, body, blank line
    fn transcript_lines(&self) -> u16 {
        // Use actual transcript width for wrap calculation, default to 50 if not set
        let wrap_width = if self.transcript_width > 0 {
            self.transcript_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;
        for entry in self.chat.transcript().entries() {
            total_lines = total_lines.saturating_add(1);
            // Character count, not byte length, for UTF-8 text
            let char_count = entry.text().chars().count() + 3;
            total_lines = total_lines.saturating_add(((char_count / wrap_width) + 1) as u16);
            total_lines = total_lines.saturating_add(1);
        }
        total_lines
    }

    pub fn loading_text(&self, entry: &TranscriptEntry) -> String {
        let dots = ".".repeat((self.animation_frame as usize) + 1);
        format!("{}{}", entry.text(), dots)
    }

    pub fn tab_at(&self, column: u16, row: u16) -> Option<ChatType> {
        self.tab_areas
            .iter()
            .find(|(_, area)| contains(area, column, row))
            .map(|(chat_type, _)| *chat_type)
    }

    /// Whether a point is over the transcript; true before the first draw
    pub fn over_transcript(&self, column: u16, row: u16) -> bool {
        self.transcript_area
            .map_or(true, |area| contains(&area, column, row))
    }
}

fn contains(area: &Rect, column: u16, row: u16) -> bool {
    column >= area.x
        && column < area.x + area.width
        && row >= area.y
        && row < area.y + area.height
}
