//! Conversation transcript consumed by the evaluation pipeline.
//!
//! The persistence layer hands the core an ordered, read-only sequence of
//! turns. The core uses it for prompt turn-framing and for the evidence
//! heuristics of the default evaluation.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Timestamp;

/// Who spoke a turn in the role-play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpeakerRole {
    /// The human salesperson being trained.
    Trainee,
    /// The simulated customer (the model).
    Customer,
}

impl SpeakerRole {
    /// Chinese display label used when rendering the transcript.
    pub fn label(&self) -> &'static str {
        match self {
            SpeakerRole::Trainee => "销售",
            SpeakerRole::Customer => "客户",
        }
    }
}

/// One turn of the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptTurn {
    pub role: SpeakerRole,
    pub message: String,
    pub timestamp: Timestamp,
}

impl TranscriptTurn {
    /// Creates a new turn stamped now.
    pub fn new(role: SpeakerRole, message: impl Into<String>) -> Self {
        Self {
            role,
            message: message.into(),
            timestamp: Timestamp::now(),
        }
    }

    /// Creates a trainee turn.
    pub fn trainee(message: impl Into<String>) -> Self {
        Self::new(SpeakerRole::Trainee, message)
    }

    /// Creates a customer turn.
    pub fn customer(message: impl Into<String>) -> Self {
        Self::new(SpeakerRole::Customer, message)
    }
}

/// Ordered, read-only conversation history for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<TranscriptTurn>);

impl Transcript {
    /// Creates a transcript from ordered turns.
    pub fn new(turns: Vec<TranscriptTurn>) -> Self {
        Self(turns)
    }

    /// All turns in order.
    pub fn turns(&self) -> &[TranscriptTurn] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Trainee turns only, in order. Evidence heuristics search these.
    pub fn trainee_turns(&self) -> impl Iterator<Item = &TranscriptTurn> {
        self.0.iter().filter(|t| t.role == SpeakerRole::Trainee)
    }

    /// Renders the transcript as labelled dialogue text, one turn per line.
    pub fn render_dialogue(&self) -> String {
        self.0
            .iter()
            .map(|t| format!("{}: {}", t.role.label(), t.message))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl FromIterator<TranscriptTurn> for Transcript {
    fn from_iter<I: IntoIterator<Item = TranscriptTurn>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Transcript {
        Transcript::new(vec![
            TranscriptTurn::trainee("您好,我是销售顾问小王。"),
            TranscriptTurn::customer("你好,有什么事吗?"),
            TranscriptTurn::trainee("想向您介绍一下我们的新产品。"),
        ])
    }

    #[test]
    fn trainee_turns_filters_by_role() {
        let transcript = sample();
        let trainee: Vec<_> = transcript.trainee_turns().collect();
        assert_eq!(trainee.len(), 2);
        assert!(trainee.iter().all(|t| t.role == SpeakerRole::Trainee));
    }

    #[test]
    fn render_dialogue_labels_turns() {
        let rendered = sample().render_dialogue();
        assert!(rendered.starts_with("销售: 您好"));
        assert!(rendered.contains("客户: 你好"));
        assert_eq!(rendered.lines().count(), 3);
    }

    #[test]
    fn speaker_role_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&SpeakerRole::Trainee).unwrap(),
            "\"trainee\""
        );
        assert_eq!(
            serde_json::to_string(&SpeakerRole::Customer).unwrap(),
            "\"customer\""
        );
    }

    #[test]
    fn transcript_serializes_as_plain_array() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.starts_with('['));
        let back: Transcript = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 3);
    }
}
