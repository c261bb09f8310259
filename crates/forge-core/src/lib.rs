pub mod api;
pub mod chat;
pub mod config;
pub mod error;
pub mod format;
pub mod render;
pub mod state;
pub mod stats;

// Re-export main types for convenience
pub use api::{ForgeApi, ForgeClient, HealthStatus};
pub use chat::{ChatController, ChatOutcome, PendingRequest};
pub use config::Config;
pub use error::{ForgeError, Result};
pub use format::{format_number, format_volume, VolumeUnit};
pub use state::{ChatHistory, ChatHistoryEntry, ChatType, ImageResult, RequestId, StatsSnapshot};
pub use stats::{StatsBoard, StatsPoller};
