use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct VoiceCommandRequest {
    /// Speech-to-text output for a single utterance.
    pub transcript: String,
    #[serde(default)]
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VoiceIntent {
    Book,
    Cancel,
    Reschedule,
    Unknown,
}

impl VoiceIntent {
    /// Keyword match on the lowercased transcript.
    pub fn classify(transcript: &str) -> Self {
        let text = transcript.to_lowercase();
        if text.contains("reschedule") || text.contains("move my") {
            VoiceIntent::Reschedule
        } else if text.contains("cancel") {
            VoiceIntent::Cancel
        } else if text.contains("book") || text.contains("appointment") {
            VoiceIntent::Book
        } else {
            VoiceIntent::Unknown
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VoiceCommandResponse {
    pub accepted: bool,
    pub intent: VoiceIntent,
    pub transcript: String,
}
