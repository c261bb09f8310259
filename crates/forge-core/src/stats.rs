//! Stats ticker: periodic fetch of aggregate metrics plus counter animation

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::api::ForgeApi;
use crate::format::{ease_out_cubic, format_number, format_volume, VolumeUnit};
use crate::state::StatsSnapshot;

/// How long a counter takes to reach a new value
pub const COUNTER_ANIMATION: Duration = Duration::from_millis(1000);

pub const TOKENS_LABEL: &str = "Tokens Created";
pub const VOLUME_LABEL: &str = "Trading Volume";
pub const USERS_LABEL: &str = "Active Users";

/// Fetch the current snapshot, falling back to all zeros on any failure
pub async fn fetch_stats(api: &dyn ForgeApi) -> StatsSnapshot {
    match api.stats().await {
        Ok(snapshot) => {
            tracing::debug!(?snapshot, "stats fetched");
            snapshot
        }
        Err(e) => {
            tracing::warn!(error = %e, "stats fetch failed, showing zeros");
            StatsSnapshot::zeroed()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CounterAnimation {
    from: u64,
    to: u64,
    started: Instant,
    duration: Duration,
}

impl CounterAnimation {
    fn value_at(&self, now: Instant) -> u64 {
        let elapsed = now.saturating_duration_since(self.started);
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.to;
        }
        let progress = ease_out_cubic(elapsed.as_secs_f64() / self.duration.as_secs_f64());
        let from = self.from as f64;
        let to = self.to as f64;
        (from + (to - from) * progress).round() as u64
    }

    fn is_done(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started) >= self.duration
    }
}

/// One counter region: a numeric display and its label
#[derive(Debug, Clone, PartialEq)]
pub struct CounterSlot {
    pub label: String,
    pub display: String,
    value: u64,
    animation: Option<CounterAnimation>,
}

impl CounterSlot {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            display: "0".to_string(),
            value: 0,
            animation: None,
        }
    }

    /// Integer currently on screen
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    fn animate_to(&mut self, target: u64, now: Instant, duration: Duration) {
        self.advance(now);
        self.animation = Some(CounterAnimation {
            from: self.value,
            to: target,
            started: now,
            duration,
        });
        self.advance(now);
    }

    fn set_text(&mut self, text: String) {
        self.animation = None;
        self.display = text;
    }

    fn advance(&mut self, now: Instant) {
        if let Some(animation) = self.animation {
            self.value = animation.value_at(now);
            self.display = format_number(self.value);
            if animation.is_done(now) {
                self.animation = None;
            }
        }
    }
}

/// The three counters of the ticker. Slot order is tokens, volume, users.
#[derive(Debug, Clone)]
pub struct StatsBoard {
    slots: Vec<CounterSlot>,
    unit: VolumeUnit,
    duration: Duration,
    last: Option<StatsSnapshot>,
}

impl StatsBoard {
    pub fn new(unit: VolumeUnit) -> Self {
        Self::with_slots(
            vec![
                CounterSlot::new(TOKENS_LABEL),
                CounterSlot::new(VOLUME_LABEL),
                CounterSlot::new(USERS_LABEL),
            ],
            unit,
        )
    }

    pub fn with_slots(slots: Vec<CounterSlot>, unit: VolumeUnit) -> Self {
        Self {
            slots,
            unit,
            duration: COUNTER_ANIMATION,
            last: None,
        }
    }

    pub fn slots(&self) -> &[CounterSlot] {
        &self.slots
    }

    pub fn last_snapshot(&self) -> Option<StatsSnapshot> {
        self.last
    }

    pub fn is_animating(&self) -> bool {
        self.slots.iter().any(|s| s.is_animating())
    }

    /// Point the counters at `snapshot`. With fewer than three slots nothing
    /// is rendered at all.
    pub fn render_stats(&mut self, snapshot: StatsSnapshot, now: Instant) -> bool {
        if self.slots.len() < 3 {
            tracing::warn!(slots = self.slots.len(), "stats board needs three counter slots");
            return false;
        }

        let duration = self.duration;
        self.slots[0].animate_to(snapshot.token_created, now, duration);
        self.slots[1].set_text(format_volume(snapshot.trading_volume, self.unit));
        self.slots[2].animate_to(snapshot.active_users, now, duration);
        self.last = Some(snapshot);
        true
    }

    /// Step running animations to `now`
    pub fn tick(&mut self, now: Instant) {
        for slot in &mut self.slots {
            slot.advance(now);
        }
    }
}

/// Repeating stats fetch. Idle until [`StatsPoller::start`], back to idle on
/// [`StatsPoller::stop`] or drop.
pub struct StatsPoller {
    api: Arc<dyn ForgeApi>,
    token: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

impl StatsPoller {
    pub fn new(api: Arc<dyn ForgeApi>) -> Self {
        Self {
            api,
            token: None,
            handle: None,
        }
    }

    pub fn is_polling(&self) -> bool {
        self.token.is_some()
    }

    /// Fetch now and then every `interval`, handing each snapshot to
    /// `on_snapshot`. A running timer is cancelled first.
    pub fn start<F>(&mut self, interval: Duration, on_snapshot: F)
    where
        F: Fn(StatsSnapshot) + Send + Sync + 'static,
    {
        self.stop();

        let interval = interval.max(Duration::from_millis(1));
        let token = CancellationToken::new();
        let api = Arc::clone(&self.api);
        let on_snapshot = Arc::new(on_snapshot);
        let timer_token = token.clone();

        tracing::info!(interval_ms = interval.as_millis() as u64, "stats polling started");

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = timer_token.cancelled() => break,
                    _ = ticker.tick() => {
                        // Fetches may overlap; whichever resolves last wins
                        let api = Arc::clone(&api);
                        let on_snapshot = Arc::clone(&on_snapshot);
                        let fetch_token = timer_token.child_token();
                        tokio::spawn(async move {
                            tokio::select! {
                                biased;
                                _ = fetch_token.cancelled() => {}
                                snapshot = fetch_stats(api.as_ref()) => (*on_snapshot)(snapshot),
                            }
                        });
                    }
                }
            }
        });

        self.token = Some(token);
        self.handle = Some(handle);
    }

    /// Cancel the timer and any fetch it still has in flight
    pub fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
            tracing::info!("stats polling stopped");
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for StatsPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
