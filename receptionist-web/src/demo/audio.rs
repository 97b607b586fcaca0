use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::DemoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Caller,
    Receptionist,
}

impl Speaker {
    pub fn label(&self) -> &'static str {
        match self {
            Speaker::Caller => "Caller",
            Speaker::Receptionist => "AI receptionist",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSegment {
    pub speaker: Speaker,
    /// Path of the recording under `/static`.
    pub src: String,
    pub text: String,
    pub start_ms: u32,
    pub duration_ms: u32,
}

/// A recorded demo call split into per-turn audio files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioSample {
    pub id: String,
    pub title: String,
    pub scenario: String,
    pub segments: Vec<AudioSegment>,
}

impl AudioSample {
    pub fn total_duration_ms(&self) -> u32 {
        self.segments
            .last()
            .map(|last| last.start_ms + last.duration_ms)
            .unwrap_or(0)
    }

    pub fn segment(&self, index: usize) -> Result<&AudioSegment, DemoError> {
        self.segments
            .get(index)
            .ok_or_else(|| DemoError::SegmentOutOfRange {
                sample: self.id.clone(),
                index,
            })
    }

    fn validate(&self) -> Result<(), DemoError> {
        if self.segments.is_empty() {
            return Err(DemoError::EmptySample(self.id.clone()));
        }
        for (index, pair) in self.segments.windows(2).enumerate() {
            if pair[1].start_ms < pair[0].start_ms {
                return Err(DemoError::SegmentOutOfOrder {
                    sample: self.id.clone(),
                    index: index + 1,
                });
            }
        }
        Ok(())
    }
}

pub fn samples_from_json(json: &str) -> Result<Vec<AudioSample>, DemoError> {
    let samples: Vec<AudioSample> = serde_json::from_str(json)?;
    validate_samples(&samples)?;
    Ok(samples)
}

pub fn validate_samples(samples: &[AudioSample]) -> Result<(), DemoError> {
    let mut ids = HashSet::new();
    for sample in samples {
        if !ids.insert(sample.id.as_str()) {
            return Err(DemoError::DuplicateSample(sample.id.clone()));
        }
        sample.validate()?;
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing(usize),
    Finished,
}

/// Plays a sample's segments one after another. After the last segment ends
/// playback stops; it never wraps around.
#[derive(Debug, Clone)]
pub struct AudioSequencer<'a> {
    sample: &'a AudioSample,
    state: PlaybackState,
}

impl<'a> AudioSequencer<'a> {
    pub fn new(sample: &'a AudioSample) -> Self {
        Self {
            sample,
            state: PlaybackState::Idle,
        }
    }

    /// A sequencer already playing segment `index`.
    pub fn resume_at(sample: &'a AudioSample, index: usize) -> Result<Self, DemoError> {
        sample.segment(index)?;
        Ok(Self {
            sample,
            state: PlaybackState::Playing(index),
        })
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn sample(&self) -> &'a AudioSample {
        self.sample
    }

    /// Start from the first segment. Does nothing while already playing.
    pub fn play(&mut self) -> Option<&'a AudioSegment> {
        if let PlaybackState::Idle | PlaybackState::Finished = self.state {
            self.state = if self.sample.segments.is_empty() {
                PlaybackState::Finished
            } else {
                PlaybackState::Playing(0)
            };
        }
        self.current()
    }

    /// The current segment finished; move to the next one, if any.
    pub fn on_ended(&mut self) -> Option<&'a AudioSegment> {
        if let PlaybackState::Playing(index) = self.state {
            let next = index + 1;
            self.state = if next < self.sample.segments.len() {
                PlaybackState::Playing(next)
            } else {
                PlaybackState::Finished
            };
        }
        self.current()
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Idle;
    }

    pub fn current(&self) -> Option<&'a AudioSegment> {
        match self.state {
            PlaybackState::Playing(index) => self.sample.segments.get(index),
            PlaybackState::Idle | PlaybackState::Finished => None,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            PlaybackState::Playing(index) => Some(index),
            PlaybackState::Idle | PlaybackState::Finished => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == PlaybackState::Finished
    }

    /// Share of segments already completed, 0.0..=1.0.
    pub fn progress(&self) -> f64 {
        let total = self.sample.segments.len();
        match self.state {
            PlaybackState::Idle => 0.0,
            PlaybackState::Finished => 1.0,
            PlaybackState::Playing(_) if total == 0 => 0.0,
            PlaybackState::Playing(index) => index as f64 / total as f64,
        }
    }
}
