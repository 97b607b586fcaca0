//! Interactive sales demos on the marketing site.
//!
//! The walker and sequencer are rebuilt on every request from the position
//! carried in the URL, so no demo state lives on the server.

use anyhow::anyhow;
use askama::Template;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::Deserialize;
use service_core::error::AppError;

use super::NoticeTemplate;
use crate::demo::{
    AudioSample, AudioSequencer, ConversationWalker, DemoError, PlaybackState, Speaker, Turn,
};
use crate::utils::htmx;
use crate::AppState;

const CHAT_NOTICE_TARGET: &str = "#chat-notice";

pub struct SampleCard {
    pub id: String,
    pub title: String,
    pub scenario: String,
    pub length: String,
    pub segment_count: usize,
    pub player: PlayerTemplate,
}

#[derive(Template)]
#[template(path = "demo/index.html")]
pub struct DemoPageTemplate {
    pub samples: Vec<SampleCard>,
}

pub struct TurnView {
    pub caller: bool,
    pub text: String,
}

pub struct OptionView {
    pub index: usize,
    pub text: String,
}

/// New chat bubbles plus the out-of-band reply controls.
#[derive(Template)]
#[template(path = "demo/chat_turns.html")]
pub struct ChatTurnsTemplate {
    pub turns: Vec<TurnView>,
    pub node_id: String,
    pub options: Vec<OptionView>,
    pub can_continue: bool,
    pub finished: bool,
}

impl ChatTurnsTemplate {
    /// Render `turns` of `walker`'s transcript with controls for where it stands.
    fn new(walker: &ConversationWalker<'_>, turns: &[Turn]) -> Self {
        let current = walker.current();
        Self {
            turns: turns
                .iter()
                .map(|turn| TurnView {
                    caller: turn.is_caller(),
                    text: turn.text().to_string(),
                })
                .collect(),
            node_id: current.id.clone(),
            options: current
                .options
                .iter()
                .enumerate()
                .map(|(index, option)| OptionView {
                    index,
                    text: option.text.clone(),
                })
                .collect(),
            can_continue: !current.has_options() && current.next_message_id.is_some(),
            finished: walker.is_finished(),
        }
    }
}

pub struct SegmentView {
    pub speaker: &'static str,
    pub speaker_class: &'static str,
    pub text: String,
    pub src: String,
}

/// One sample's player in whatever state its sequencer is in.
#[derive(Template)]
#[template(path = "demo/player.html")]
pub struct PlayerTemplate {
    pub sample_id: String,
    pub title: String,
    pub scenario: String,
    pub state: &'static str,
    pub index: usize,
    pub total: usize,
    pub progress: u32,
    pub current: Option<SegmentView>,
    pub heard: Vec<SegmentView>,
}

fn segment_view(segment: &crate::demo::AudioSegment) -> SegmentView {
    SegmentView {
        speaker: segment.speaker.label(),
        speaker_class: match segment.speaker {
            Speaker::Caller => "speaker-caller",
            Speaker::Receptionist => "speaker-ai",
        },
        text: segment.text.clone(),
        src: segment.src.clone(),
    }
}

impl PlayerTemplate {
    fn new(sequencer: &AudioSequencer<'_>) -> Self {
        let sample = sequencer.sample();
        let (state, heard_until) = match sequencer.state() {
            PlaybackState::Idle => ("idle", 0),
            PlaybackState::Playing(index) => ("playing", index),
            PlaybackState::Finished => ("finished", sample.segments.len()),
        };

        Self {
            sample_id: sample.id.clone(),
            title: sample.title.clone(),
            scenario: sample.scenario.clone(),
            state,
            index: sequencer.current_index().unwrap_or(0),
            total: sample.segments.len(),
            progress: (sequencer.progress() * 100.0).round() as u32,
            current: sequencer.current().map(segment_view),
            heard: sample.segments[..heard_until].iter().map(segment_view).collect(),
        }
    }
}

#[derive(Deserialize)]
pub struct ChoiceForm {
    pub option: usize,
}

fn format_length(ms: u32) -> String {
    let seconds = (ms + 500) / 1000;
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub async fn demo_page(State(state): State<AppState>) -> impl IntoResponse {
    DemoPageTemplate {
        samples: state
            .demo
            .samples()
            .iter()
            .map(|sample| SampleCard {
                id: sample.id.clone(),
                title: sample.title.clone(),
                scenario: sample.scenario.clone(),
                length: format_length(sample.total_duration_ms()),
                segment_count: sample.segments.len(),
                player: PlayerTemplate::new(&AudioSequencer::new(sample)),
            })
            .collect(),
    }
}

/// Opening message of the chat demo.
pub async fn chat_start(State(state): State<AppState>) -> impl IntoResponse {
    let walker = ConversationWalker::new(state.demo.conversation());
    ChatTurnsTemplate::new(&walker, walker.transcript())
}

fn chat_error(error: DemoError) -> Response {
    match error {
        DemoError::UnknownMessage(id) => {
            AppError::NotFound(anyhow!("Unknown demo message: {id}")).into_response()
        }
        other => {
            tracing::debug!(error = %other, "Rejected demo chat step");
            htmx::retarget(
                NoticeTemplate::error(other.to_string()).into_response(),
                CHAT_NOTICE_TARGET,
            )
        }
    }
}

/// Reply with option `option` at message `node`.
pub async fn chat_choose(
    State(state): State<AppState>,
    Path(node): Path<String>,
    Form(form): Form<ChoiceForm>,
) -> Response {
    let mut walker = match ConversationWalker::resume_at(state.demo.conversation(), &node) {
        Ok(walker) => walker,
        Err(e) => return chat_error(e),
    };
    if let Err(e) = walker.choose(form.option) {
        return chat_error(e);
    }
    // The first turn is the message the visitor is already looking at.
    ChatTurnsTemplate::new(&walker, &walker.transcript()[1..]).into_response()
}

pub async fn chat_continue(State(state): State<AppState>, Path(node): Path<String>) -> Response {
    let mut walker = match ConversationWalker::resume_at(state.demo.conversation(), &node) {
        Ok(walker) => walker,
        Err(e) => return chat_error(e),
    };
    if let Err(e) = walker.advance() {
        return chat_error(e);
    }
    ChatTurnsTemplate::new(&walker, &walker.transcript()[1..]).into_response()
}

fn find_sample<'a>(state: &'a AppState, id: &str) -> Result<&'a AudioSample, AppError> {
    state
        .demo
        .sample(id)
        .ok_or_else(|| AppError::NotFound(anyhow!("Unknown demo sample: {id}")))
}

fn sequencer_at<'a>(sample: &'a AudioSample, index: usize) -> Result<AudioSequencer<'a>, AppError> {
    AudioSequencer::resume_at(sample, index).map_err(|e| AppError::NotFound(anyhow!(e)))
}

/// Playlist for a sample, for clients that drive playback themselves.
pub async fn audio_sample(
    State(state): State<AppState>,
    Path(sample_id): Path<String>,
) -> Result<Json<AudioSample>, AppError> {
    Ok(Json(find_sample(&state, &sample_id)?.clone()))
}

/// Player stopped, back at the start.
pub async fn audio_player(
    State(state): State<AppState>,
    Path(sample_id): Path<String>,
) -> Result<PlayerTemplate, AppError> {
    let sample = find_sample(&state, &sample_id)?;
    let mut sequencer = AudioSequencer::new(sample);
    sequencer.stop();
    Ok(PlayerTemplate::new(&sequencer))
}

pub async fn audio_segment(
    State(state): State<AppState>,
    Path((sample_id, index)): Path<(String, usize)>,
) -> Result<PlayerTemplate, AppError> {
    let sample = find_sample(&state, &sample_id)?;
    Ok(PlayerTemplate::new(&sequencer_at(sample, index)?))
}

/// Segment `index` finished playing: next segment, or the finished player.
pub async fn audio_segment_ended(
    State(state): State<AppState>,
    Path((sample_id, index)): Path<(String, usize)>,
) -> Result<PlayerTemplate, AppError> {
    let sample = find_sample(&state, &sample_id)?;
    let mut sequencer = sequencer_at(sample, index)?;
    sequencer.on_ended();
    Ok(PlayerTemplate::new(&sequencer))
}
