//! Property tests for the demo walkers against the shipped demo data.

use super::*;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum ChatStep {
    Choose(usize),
    Advance,
    Reset,
}

fn arb_chat_step() -> impl Strategy<Value = ChatStep> {
    prop_oneof![
        4 => (0usize..6).prop_map(ChatStep::Choose),
        2 => Just(ChatStep::Advance),
        1 => Just(ChatStep::Reset),
    ]
}

#[derive(Debug, Clone, Copy)]
enum PlayerEvent {
    Play,
    Ended,
    Stop,
}

fn arb_player_event() -> impl Strategy<Value = PlayerEvent> {
    prop_oneof![
        1 => Just(PlayerEvent::Play),
        5 => Just(PlayerEvent::Ended),
        1 => Just(PlayerEvent::Stop),
    ]
}

proptest! {
    /// Whatever the visitor clicks, the walker sits on a real node and a
    /// rejected step changes nothing.
    #[test]
    fn walker_never_leaves_the_script(steps in prop::collection::vec(arb_chat_step(), 0..40)) {
        let library = DemoLibrary::load().unwrap();
        let script = library.conversation();
        let mut walker = ConversationWalker::new(script);

        for step in steps {
            let before_id = walker.current().id.clone();
            let before_len = walker.transcript().len();

            let result = match step {
                ChatStep::Choose(index) => walker.choose(index).map(|_| ()),
                ChatStep::Advance => walker.advance().map(|_| ()),
                ChatStep::Reset => {
                    walker.reset();
                    Ok(())
                }
            };

            prop_assert!(script.node(&walker.current().id).is_some());
            if result.is_err() {
                prop_assert_eq!(&walker.current().id, &before_id);
                prop_assert_eq!(walker.transcript().len(), before_len);
            }
        }

        let last = walker.transcript().last().unwrap();
        prop_assert!(!last.is_caller());
    }

    /// Segment indices seen during one playback run go up by exactly one and
    /// the run ends in `Finished`, never back at the start.
    #[test]
    fn sequencer_follows_transcript_order(
        sample_index in 0usize..2,
        events in prop::collection::vec(arb_player_event(), 0..60),
    ) {
        let library = DemoLibrary::load().unwrap();
        let sample = &library.samples()[sample_index % library.samples().len()];
        let mut sequencer = AudioSequencer::new(sample);

        for event in events {
            let before = sequencer.state();
            match event {
                PlayerEvent::Play => {
                    sequencer.play();
                    match before {
                        PlaybackState::Playing(_) => prop_assert_eq!(sequencer.state(), before),
                        _ => prop_assert_eq!(sequencer.state(), PlaybackState::Playing(0)),
                    }
                }
                PlayerEvent::Ended => {
                    sequencer.on_ended();
                    match (before, sequencer.state()) {
                        (PlaybackState::Playing(i), PlaybackState::Playing(j)) => {
                            prop_assert_eq!(j, i + 1)
                        }
                        (PlaybackState::Playing(i), PlaybackState::Finished) => {
                            prop_assert_eq!(i + 1, sample.segments.len())
                        }
                        (PlaybackState::Playing(_), PlaybackState::Idle) => {
                            prop_assert!(false, "ended event stopped playback")
                        }
                        (other, after) => prop_assert_eq!(after, other),
                    }
                }
                PlayerEvent::Stop => {
                    sequencer.stop();
                    prop_assert_eq!(sequencer.state(), PlaybackState::Idle);
                }
            }

            let progress = sequencer.progress();
            prop_assert!((0.0..=1.0).contains(&progress));
        }
    }

    /// Playing straight through visits every segment once.
    #[test]
    fn uninterrupted_playback_visits_each_segment(sample_index in 0usize..2) {
        let library = DemoLibrary::load().unwrap();
        let sample = &library.samples()[sample_index % library.samples().len()];
        let mut sequencer = AudioSequencer::new(sample);

        let mut heard = Vec::new();
        let mut segment = sequencer.play();
        while let Some(current) = segment {
            heard.push(current.clone());
            segment = sequencer.on_ended();
        }

        prop_assert_eq!(&heard, &sample.segments);
        prop_assert!(sequencer.is_finished());
        prop_assert_eq!(sequencer.on_ended(), None);
    }
}
