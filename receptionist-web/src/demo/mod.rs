//! Hand-authored sales demos: a scripted chat and a segmented call recording.
//!
//! Both replay static data embedded in the binary; nothing here talks to the
//! receptionist API.

pub mod audio;
pub mod conversation;

#[cfg(test)]
mod proptests;

pub use audio::{AudioSample, AudioSegment, AudioSequencer, PlaybackState, Speaker};
pub use conversation::{ChatOption, ConversationScript, ConversationWalker, MessageNode, Turn};

use thiserror::Error;

const CONVERSATION_JSON: &str = include_str!("../../demo/conversation.json");
const AUDIO_SAMPLES_JSON: &str = include_str!("../../demo/audio_samples.json");

#[derive(Debug, Error)]
pub enum DemoError {
    #[error("demo data is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("root message '{0}' does not exist")]
    MissingRoot(String),

    #[error("message '{from}' points to missing message '{to}'")]
    DanglingTransition { from: String, to: String },

    #[error("message stored under '{key}' has id '{id}'")]
    KeyMismatch { key: String, id: String },

    #[error("unknown message '{0}'")]
    UnknownMessage(String),

    #[error("message '{node}' has no option {index}")]
    InvalidChoice { node: String, index: usize },

    #[error("message '{0}' needs a choice before continuing")]
    ChoiceRequired(String),

    #[error("the conversation has ended at '{0}'")]
    ConversationOver(String),

    #[error("audio sample '{0}' has no segments")]
    EmptySample(String),

    #[error("audio sample '{0}' is defined more than once")]
    DuplicateSample(String),

    #[error("segment {index} of audio sample '{sample}' starts before the previous one")]
    SegmentOutOfOrder { sample: String, index: usize },

    #[error("audio sample '{sample}' has no segment {index}")]
    SegmentOutOfRange { sample: String, index: usize },
}

/// Validated demo content shared by the demo routes.
#[derive(Debug, Clone)]
pub struct DemoLibrary {
    conversation: ConversationScript,
    samples: Vec<AudioSample>,
}

impl DemoLibrary {
    /// Parse and validate the demo data shipped with the binary.
    pub fn load() -> Result<Self, DemoError> {
        Self::from_sources(CONVERSATION_JSON, AUDIO_SAMPLES_JSON)
    }

    pub fn from_sources(conversation: &str, samples: &str) -> Result<Self, DemoError> {
        let conversation = ConversationScript::from_json(conversation)?;
        let samples = audio::samples_from_json(samples)?;
        Ok(Self {
            conversation,
            samples,
        })
    }

    pub fn conversation(&self) -> &ConversationScript {
        &self.conversation
    }

    pub fn samples(&self) -> &[AudioSample] {
        &self.samples
    }

    pub fn sample(&self, id: &str) -> Option<&AudioSample> {
        self.samples.iter().find(|sample| sample.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_demo_data_is_valid() {
        let library = DemoLibrary::load().unwrap();
        assert!(!library.samples().is_empty());
        assert!(library.sample("status-check").is_some());
        assert!(library.sample("missing").is_none());
    }

    #[test]
    fn every_shipped_message_is_reachable() {
        let library = DemoLibrary::load().unwrap();
        let script = library.conversation();
        assert_eq!(script.reachable_from_root().len(), script.len());
    }
}
