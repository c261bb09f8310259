//! Chat controller: tab state, message history and the generate-images cycle
//!
//! Sending is split around the await point so a UI loop never holds the
//! controller across network I/O:
//!
//! 1. [`ChatController::begin_send`] validates, appends the user bubble and a
//!    loading placeholder, and hands back a [`PendingRequest`].
//! 2. [`PendingRequest::run`] (or [`PendingRequest::spawn`]) performs the POST.
//! 3. [`ChatController::complete_send`] applies the [`ChatOutcome`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::api::{ForgeApi, GenerateRequest, GenerateResponse};
use crate::error::{ForgeError, Result};
use crate::render::{replay_transcript, Panels, Transcript, TranscriptEntry};
use crate::state::{ChatHistory, ChatHistoryEntry, ChatType, RequestId};

/// A validated message waiting to be sent
#[derive(Debug)]
pub struct PendingRequest {
    pub id: RequestId,
    pub chat_type: ChatType,
    pub prompt: String,
    token: CancellationToken,
}

/// Result of one generate-images call, tagged with the request it belongs to
#[derive(Debug)]
pub struct ChatOutcome {
    pub id: RequestId,
    pub chat_type: ChatType,
    pub prompt: String,
    pub result: Result<GenerateResponse>,
}

impl PendingRequest {
    /// Issue the POST. Resolves early with `Cancelled` if the controller is
    /// disposed first.
    pub async fn run(self, api: &dyn ForgeApi) -> ChatOutcome {
        let request = GenerateRequest {
            user_prompt: self.prompt.clone(),
            chat_type: self.chat_type,
        };

        tracing::info!(request = %self.id, chat_type = self.chat_type.as_str(), "sending generate-images request");

        let result = tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(ForgeError::Cancelled),
            response = api.generate_images(&request) => response,
        };

        ChatOutcome {
            id: self.id,
            chat_type: self.chat_type,
            prompt: self.prompt,
            result,
        }
    }

    /// Run on the tokio runtime and hand the outcome to `deliver`
    pub fn spawn<F>(self, api: Arc<dyn ForgeApi>, deliver: F) -> JoinHandle<()>
    where
        F: FnOnce(ChatOutcome) + Send + 'static,
    {
        tokio::spawn(async move {
            let outcome = self.run(api.as_ref()).await;
            deliver(outcome);
        })
    }
}

struct InFlight {
    chat_type: ChatType,
    prompt: String,
    token: CancellationToken,
}

pub struct ChatController {
    active: ChatType,
    history: ChatHistory,
    transcript: Transcript,
    panels: Panels,
    in_flight: HashMap<RequestId, InFlight>,
    next_id: u64,
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatController {
    pub fn new() -> Self {
        Self::with_active(ChatType::default())
    }

    pub fn with_active(active: ChatType) -> Self {
        let mut panels = Panels::new();
        panels.show(active);
        Self {
            active,
            history: ChatHistory::new(),
            transcript: Transcript::new(),
            panels,
            in_flight: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn active(&self) -> ChatType {
        self.active
    }

    pub fn history(&self) -> &ChatHistory {
        &self.history
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn panels(&self) -> &Panels {
        &self.panels
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.values().any(|f| f.chat_type == self.active)
    }

    /// Make `chat_type` active and rebuild the transcript from its history
    pub fn switch_tab(&mut self, chat_type: ChatType) {
        self.active = chat_type;
        self.panels.show(chat_type);

        let entries = self.history.entries(chat_type);
        self.transcript = replay_transcript(entries, chat_type);
        for entry in entries {
            self.panels.render_images(&entry.images, chat_type);
        }

        // Requests still running for this tab keep their bubble and placeholder
        let mut pending: Vec<(RequestId, &str)> = self
            .in_flight
            .iter()
            .filter(|(_, f)| f.chat_type == chat_type)
            .map(|(id, f)| (*id, f.prompt.as_str()))
            .collect();
        pending.sort();
        for (request, prompt) in pending {
            self.transcript.push(TranscriptEntry::User(prompt.to_string()));
            self.transcript.push(TranscriptEntry::Loading { request, chat_type });
        }
    }

    /// Validate `text` and stage a request. Blank input is ignored without
    /// touching the transcript.
    pub fn begin_send(&mut self, text: &str) -> Option<PendingRequest> {
        let prompt = text.trim();
        if prompt.is_empty() {
            return None;
        }

        let id = RequestId(self.next_id);
        self.next_id += 1;
        let chat_type = self.active;

        self.transcript.push(TranscriptEntry::User(prompt.to_string()));
        self.transcript.push(TranscriptEntry::Loading { request: id, chat_type });

        let token = CancellationToken::new();
        self.in_flight.insert(
            id,
            InFlight {
                chat_type,
                prompt: prompt.to_string(),
                token: token.clone(),
            },
        );

        Some(PendingRequest {
            id,
            chat_type,
            prompt: prompt.to_string(),
            token,
        })
    }

    /// Apply a finished request. Returns false when the outcome was discarded
    /// (cancelled or unknown request).
    pub fn complete_send(&mut self, outcome: ChatOutcome) -> bool {
        if self.in_flight.remove(&outcome.id).is_none() {
            tracing::debug!(request = %outcome.id, "discarding outcome for unknown request");
            return false;
        }

        let visible = outcome.chat_type == self.active;
        if visible {
            self.transcript.remove_loading(outcome.id);
        }

        match outcome.result {
            Ok(response) => {
                tracing::info!(
                    request = %outcome.id,
                    images = response.images.len(),
                    "images generated"
                );
                self.panels.render_images(&response.images, outcome.chat_type);
                if visible {
                    self.transcript.push(TranscriptEntry::AiSuccess(outcome.chat_type));
                }
                self.history.push(
                    outcome.chat_type,
                    ChatHistoryEntry {
                        user_message: outcome.prompt,
                        images: response.images,
                    },
                );
                true
            }
            Err(ForgeError::Cancelled) => {
                tracing::debug!(request = %outcome.id, "request cancelled");
                false
            }
            Err(e) => {
                tracing::warn!(request = %outcome.id, error = %e, "image generation failed");
                if visible {
                    self.transcript.push(TranscriptEntry::AiFailure);
                }
                true
            }
        }
    }

    /// Stage, send and apply in one go
    pub async fn send_message(&mut self, api: &dyn ForgeApi, text: &str) -> bool {
        match self.begin_send(text) {
            Some(pending) => {
                let outcome = pending.run(api).await;
                self.complete_send(outcome)
            }
            None => false,
        }
    }

    /// Cancel every outstanding request
    pub fn dispose(&mut self) {
        for (id, flight) in self.in_flight.drain() {
            tracing::debug!(request = %id, "cancelling in-flight request");
            flight.token.cancel();
        }
        let active = self.active;
        self.transcript = replay_transcript(self.history.entries(active), active);
    }
}

impl Drop for ChatController {
    fn drop(&mut self) {
        for flight in self.in_flight.values() {
            flight.token.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::HealthStatus;
    use crate::render::FAILURE_CAPTION;
    use crate::state::{ImageResult, StatsSnapshot};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Answers generate-images from a script and counts calls
    #[derive(Default)]
    struct FakeApi {
        calls: AtomicUsize,
        fail: bool,
        images: Mutex<Vec<ImageResult>>,
    }

    impl FakeApi {
        fn returning(images: Vec<ImageResult>) -> Self {
            Self {
                images: Mutex::new(images),
                ..Default::default()
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ForgeApi for FakeApi {
        async fn health(&self) -> Result<HealthStatus> {
            Ok(HealthStatus::default())
        }

        async fn stats(&self) -> Result<StatsSnapshot> {
            Ok(StatsSnapshot::zeroed())
        }

        async fn generate_images(&self, request: &GenerateRequest) -> Result<GenerateResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ForgeError::Status(500));
            }
            Ok(GenerateResponse {
                images: self.images.lock().unwrap().clone(),
                kind: request.chat_type.as_str().to_string(),
            })
        }
    }

    fn design_images() -> Vec<ImageResult> {
        vec![
            ImageResult::new("logo", "a"),
            ImageResult::new("banner", "b"),
            ImageResult::new("other", "c"),
        ]
    }

    #[test]
    fn test_starts_on_website_tab() {
        let chat = ChatController::new();
        assert_eq!(chat.active(), ChatType::Website);
        assert!(chat.panels().is_visible(ChatType::Website));
        assert!(chat.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_blank_input_is_ignored() {
        let api = FakeApi::returning(vec![]);
        let mut chat = ChatController::new();

        for text in ["", "   ", "\n\t "] {
            assert!(!chat.send_message(&api, text).await);
        }

        assert!(chat.transcript().is_empty());
        assert!(chat.history().is_empty());
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test]
    async fn test_success_appends_user_and_caption_and_history() {
        let api = FakeApi::returning(vec![ImageResult::new("website", "w1")]);
        let mut chat = ChatController::new();

        assert!(chat.send_message(&api, "  landing page for a bakery ").await);

        assert_eq!(
            chat.transcript().entries(),
            &[
                TranscriptEntry::User("landing page for a bakery".to_string()),
                TranscriptEntry::AiSuccess(ChatType::Website),
            ]
        );
        assert_eq!(chat.history().len(ChatType::Website), 1);
        assert_eq!(
            chat.history().entries(ChatType::Website)[0].user_message,
            "landing page for a bakery"
        );
        assert_eq!(chat.panels().website.mockup.as_ref().unwrap().url, "w1");
        assert_eq!(api.calls(), 1);
        assert_eq!(chat.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_failure_appends_caption_without_history() {
        let api = FakeApi::failing();
        let mut chat = ChatController::new();

        assert!(chat.send_message(&api, "anything").await);

        let entries = chat.transcript().entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].is_user());
        assert_eq!(entries[1], TranscriptEntry::AiFailure);
        assert_eq!(entries[1].text(), FAILURE_CAPTION);
        assert!(chat.history().is_empty());
    }

    #[tokio::test]
    async fn test_controller_keeps_working_after_failure() {
        let mut chat = ChatController::new();
        chat.send_message(&FakeApi::failing(), "first").await;
        chat.send_message(&FakeApi::returning(vec![ImageResult::new("website", "w")]), "second")
            .await;

        assert_eq!(chat.transcript().len(), 4);
        assert_eq!(chat.history().len(ChatType::Website), 1);
    }

    #[test]
    fn test_begin_send_shows_placeholder_before_request() {
        let mut chat = ChatController::new();
        let pending = chat.begin_send("hero section").unwrap();

        assert_eq!(pending.prompt, "hero section");
        assert_eq!(pending.chat_type, ChatType::Website);
        assert_eq!(
            chat.transcript().entries().last(),
            Some(&TranscriptEntry::Loading {
                request: pending.id,
                chat_type: ChatType::Website
            })
        );
        assert!(chat.is_loading());
    }

    #[tokio::test]
    async fn test_design_response_fills_slots() {
        let api = FakeApi::returning(design_images());
        let mut chat = ChatController::new();
        chat.switch_tab(ChatType::Design);

        chat.send_message(&api, "coffee brand").await;

        let design = &chat.panels().design;
        assert_eq!(design.logo.len(), 1);
        assert_eq!(design.banners.len(), 1);
        assert_eq!(design.logo[0].url, "a");
        assert_eq!(design.banners[0].url, "b");
        // History keeps the full response, unknown tags included
        assert_eq!(chat.history().entries(ChatType::Design)[0].images.len(), 3);
    }

    #[tokio::test]
    async fn test_switch_tab_replays_history() {
        let mut chat = ChatController::new();
        chat.switch_tab(ChatType::Design);
        chat.send_message(&FakeApi::returning(design_images()), "one").await;
        chat.send_message(&FakeApi::failing(), "two").await;
        chat.send_message(&FakeApi::returning(design_images()), "three").await;

        chat.switch_tab(ChatType::Website);
        assert!(chat.transcript().is_empty());
        assert!(chat.panels().is_visible(ChatType::Website));

        chat.switch_tab(ChatType::Design);
        // Failures are not part of history, so the replay only holds successes
        assert_eq!(
            chat.transcript().entries(),
            &[
                TranscriptEntry::User("one".to_string()),
                TranscriptEntry::AiSuccess(ChatType::Design),
                TranscriptEntry::User("three".to_string()),
                TranscriptEntry::AiSuccess(ChatType::Design),
            ]
        );
        assert_eq!(chat.panels().design.logo.len(), 1);
    }

    #[tokio::test]
    async fn test_switch_tab_is_idempotent() {
        let mut chat = ChatController::new();
        chat.send_message(&FakeApi::returning(vec![ImageResult::new("website", "w")]), "site")
            .await;

        chat.switch_tab(ChatType::Website);
        let transcript = chat.transcript().clone();
        let panels = chat.panels().clone();

        chat.switch_tab(ChatType::Website);
        assert_eq!(chat.transcript(), &transcript);
        assert_eq!(chat.panels(), &panels);
    }

    #[tokio::test]
    async fn test_overlapping_sends_apply_in_completion_order() {
        let api = FakeApi::returning(vec![ImageResult::new("website", "w")]);
        let mut chat = ChatController::new();

        let first = chat.begin_send("first").unwrap();
        let second = chat.begin_send("second").unwrap();
        assert_eq!(chat.in_flight(), 2);

        let second_outcome = second.run(&api).await;
        let first_outcome = first.run(&api).await;
        chat.complete_send(second_outcome);
        chat.complete_send(first_outcome);

        let history = chat.history().entries(ChatType::Website);
        assert_eq!(history[0].user_message, "second");
        assert_eq!(history[1].user_message, "first");
        assert!(!chat.transcript().entries().iter().any(|e| e.is_loading()));
    }

    #[tokio::test]
    async fn test_outcome_after_tab_switch_lands_in_its_own_history() {
        let api = FakeApi::returning(design_images());
        let mut chat = ChatController::new();
        chat.switch_tab(ChatType::Design);

        let pending = chat.begin_send("late logo").unwrap();
        chat.switch_tab(ChatType::Website);
        let outcome = pending.run(&api).await;
        chat.complete_send(outcome);

        // Website transcript is untouched
        assert!(chat.transcript().is_empty());
        assert_eq!(chat.history().len(ChatType::Design), 1);

        chat.switch_tab(ChatType::Design);
        assert_eq!(chat.transcript().len(), 2);
        assert_eq!(chat.panels().design.logo.len(), 1);
    }

    #[test]
    fn test_switch_back_restores_pending_bubble_and_placeholder() {
        let mut chat = ChatController::new();
        let pending = chat.begin_send("slow one").unwrap();

        chat.switch_tab(ChatType::Design);
        chat.switch_tab(ChatType::Website);

        assert_eq!(
            chat.transcript().entries(),
            &[
                TranscriptEntry::User("slow one".to_string()),
                TranscriptEntry::Loading {
                    request: pending.id,
                    chat_type: ChatType::Website
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_live_transcript_matches_replay_after_round_trip() {
        let api = FakeApi::returning(vec![ImageResult::new("website", "w")]);
        let mut chat = ChatController::new();
        let pending = chat.begin_send("slow one").unwrap();

        chat.switch_tab(ChatType::Design);
        chat.switch_tab(ChatType::Website);
        let outcome = pending.run(&api).await;
        assert!(chat.complete_send(outcome));

        let live = chat.transcript().clone();
        chat.switch_tab(ChatType::Website);
        assert_eq!(chat.transcript(), &live);
        assert_eq!(
            live.entries(),
            &[
                TranscriptEntry::User("slow one".to_string()),
                TranscriptEntry::AiSuccess(ChatType::Website),
            ]
        );
    }

    #[tokio::test]
    async fn test_dispose_cancels_in_flight() {
        let api = FakeApi::returning(vec![]);
        let mut chat = ChatController::new();
        let pending = chat.begin_send("never lands").unwrap();

        chat.dispose();
        let outcome = pending.run(&api).await;

        assert!(matches!(outcome.result, Err(ForgeError::Cancelled)));
        assert!(!chat.complete_send(outcome));
        assert_eq!(api.calls(), 0);
        assert!(chat.transcript().is_empty());
        assert!(chat.history().is_empty());
    }

    #[tokio::test]
    async fn test_spawned_request_delivers_outcome() {
        let api: Arc<dyn ForgeApi> = Arc::new(FakeApi::returning(vec![ImageResult::new("website", "w")]));
        let mut chat = ChatController::new();
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        let pending = chat.begin_send("spawned").unwrap();
        pending
            .spawn(api, move |outcome| {
                let _ = tx.send(outcome);
            })
            .await
            .unwrap();

        let outcome = rx.recv().await.unwrap();
        assert!(chat.complete_send(outcome));
        assert_eq!(chat.history().len(ChatType::Website), 1);
    }
}
