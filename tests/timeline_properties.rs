//! Timeline interpretation properties
//!
//! Drives the engine over whole marker sets the way the event loop does and
//! checks the display invariants observers rely on.

use livehud::marker::parser::{PANIC_ENTRY_NAME, PANIC_EXIT_NAME};
use livehud::timeline::snapshot::{END_LABEL, LOOP_LABEL, NO_REMAINING_MUSICAL, WAITING_TITLE};
use livehud::{Marker, MarkerLabel, MusicalTime, TimelineEngine, TimelineSnapshot};

fn markers(entries: &[(&str, f64)]) -> Vec<Marker<()>> {
    entries
        .iter()
        .map(|(name, time)| Marker::new(*name, *time, ()))
        .collect()
}

fn set_list() -> Vec<Marker<()>> {
    markers(&[
        ("#1 -> Intro", 0.0),
        ("#2 -> Opening Song (feat. Guest)", 16.0),
        ("#3 -> Ballad", 80.0),
    ])
}

/// Feed positions one after another, like the sequencer would
fn play(engine: &TimelineEngine, markers: &[Marker<()>], positions: &[f64]) -> Vec<TimelineSnapshot> {
    let mut snapshot = TimelineSnapshot::initial();
    positions
        .iter()
        .map(|&position| {
            snapshot = engine.on_position(&snapshot, markers, position);
            snapshot.clone()
        })
        .collect()
}

#[test]
fn test_tolerance_resolves_marker_just_ahead() {
    let engine = TimelineEngine::default();
    let markers = set_list();

    let [before, jitter, after]: [TimelineSnapshot; 3] = play(&engine, &markers, &[15.8, 15.95, 16.0])
        .try_into()
        .unwrap();

    assert_eq!(before.segment_title, "Intro");
    assert_eq!(jitter.segment_title, "Opening Song");
    assert_eq!(jitter.segment_feature, "feat. Guest");
    assert_eq!(after.segment_order, "2");
    // Slightly before the marker: clamped, not negative
    assert_eq!(jitter.progress, 0.0);
    assert_eq!(jitter.elapsed, "00:00");
}

#[test]
fn test_progress_is_monotonic_within_a_segment() {
    let engine = TimelineEngine::default();
    let markers = set_list();
    let positions: Vec<f64> = (0..=64).map(|step| 16.0 + step as f64).collect();

    let snapshots = play(&engine, &markers, &positions[..64]);
    for pair in snapshots.windows(2) {
        assert!(pair[1].progress >= pair[0].progress);
        assert!((0.0..=1.0).contains(&pair[1].progress));
    }
    assert!(snapshots.iter().all(|s| s.segment_title == "Opening Song"));
    assert_eq!(snapshots.last().unwrap().remaining, "00:00");
}

#[test]
fn test_remaining_and_elapsed_use_fixed_divisor() {
    let engine = TimelineEngine::default();
    let markers = markers(&[("A", 0.0), ("B", 240.0)]);

    let snapshot = engine.on_position(&TimelineSnapshot::initial(), &markers, 130.0);
    // 130 beats / 2 = 65 s, 110 beats / 2 = 55 s
    assert_eq!(snapshot.elapsed, "01:05");
    assert_eq!(snapshot.remaining, "00:55");
    assert_eq!(snapshot.remaining_musical, "27 : 3 : 1");
}

#[test]
fn test_musical_time_of_fractional_beats() {
    assert_eq!(MusicalTime::from_beats(6.25).to_string(), "1 : 3 : 2");
    assert_eq!(MusicalTime::from_beats(0.0).to_string(), "0 : 1 : 1");
}

#[test]
fn test_last_marker_ends_the_set() {
    let engine = TimelineEngine::default();
    let markers = set_list();

    let snapshots = play(&engine, &markers, &[79.0, 81.0, 200.0]);
    let last = &snapshots[2];

    assert_eq!(last.segment_title, "Ballad");
    assert_eq!(last.next_title, END_LABEL);
    assert_eq!(last.remaining, "00:00");
    assert_eq!(last.remaining_musical, NO_REMAINING_MUSICAL);
    assert_eq!(last.progress, 0.0);
    // Elapsed is whatever the previous segment left behind
    assert_eq!(last.elapsed, snapshots[0].elapsed);
}

#[test]
fn test_silence_loop_markers() {
    let engine = TimelineEngine::default();
    let markers = markers(&[("Song", 0.0), (PANIC_ENTRY_NAME, 32.0), (PANIC_EXIT_NAME, 40.0)]);

    let in_song = engine.on_position(&TimelineSnapshot::initial(), &markers, 30.0);
    assert_eq!(in_song.next_title, "PANIC SILENCE");

    let in_loop = engine.on_position(&in_song, &markers, 36.0);
    assert_eq!(in_loop.segment(), MarkerLabel::panic());
    assert_eq!(in_loop.next_title, "PANIC SILENCE");

    let entry_only = &markers[..2];
    let at_entry = engine.on_position(&in_song, entry_only, 33.0);
    assert_eq!(at_entry.next_title, LOOP_LABEL);

    let past_exit = engine.on_position(&in_loop, &markers, 41.0);
    assert_eq!(past_exit.next_title, END_LABEL);
}

#[test]
fn test_before_first_marker_only_beat_moves() {
    let engine = TimelineEngine::default();
    let markers = markers(&[("A", 8.0), ("B", 16.0)]);

    let snapshots = play(&engine, &markers, &[0.0, 1.0, 2.5, 3.0, 4.0]);
    let beats: Vec<u8> = snapshots.iter().map(|s| s.beat).collect();

    assert_eq!(beats, vec![1, 2, 3, 4, 1]);
    assert!(snapshots.iter().all(|s| s.segment_title == WAITING_TITLE));
    assert!(snapshots.iter().all(|s| s.progress == 0.0));
}

#[test]
fn test_flags_survive_position_updates() {
    let engine = TimelineEngine::default();
    let markers = set_list();
    let previous = TimelineSnapshot::initial()
        .with_playing(true)
        .with_metronome(true)
        .with_visible_marker_names(vec!["#1 -> Intro".into()]);

    let snapshot = engine.on_position(&previous, &markers, 20.0);
    assert!(snapshot.is_playing);
    assert!(snapshot.metronome_on);
    assert_eq!(snapshot.visible_marker_names, vec!["#1 -> Intro"]);
}

#[test]
fn test_marker_name_grammar() {
    let cases = [
        ("#12 -> Song Title (feat. X)", ("12", "Song Title", "feat. X")),
        ("#3->Plain", ("3", "Plain", "")),
        ("Song #4 -> Late Header", ("4", "Late Header", "")),
        ("#5 -> Nested (a (b))", ("5", "Nested", "a (b)")),
        ("#6 -> Open (paren", ("6", "Open (paren", "")),
        ("No header", ("", "No header", "")),
        ("#x -> Not digits", ("", "#x -> Not digits", "")),
    ];

    for (name, (order, title, feature)) in cases {
        let label = MarkerLabel::parse(name);
        assert_eq!(
            (label.order.as_str(), label.title.as_str(), label.feature.as_str()),
            (order, title, feature),
            "parsing {:?}",
            name
        );
    }
}
