/*!
 * Tests for caption timing and WebVTT rendering
 */

use anyhow::Result;
use rand::Rng;
use std::time::Duration;
use vttcast::app_config::ChunkDuration;
use vttcast::captions::{self, Transcript, format_duration, format_seconds};

fn chunk(secs: f64) -> ChunkDuration {
    ChunkDuration::from_secs_f64(secs).expect("valid chunk duration")
}

/// Split a rendered document into its cue blocks, skipping the header
fn cue_blocks(document: &str) -> Vec<Vec<&str>> {
    let body = document
        .strip_prefix("WEBVTT\n\n")
        .expect("document should start with the WebVTT header");

    body.split_terminator("\n\n")
        .map(|block| block.lines().collect())
        .collect()
}

/// Parse one `start --> end` line into its two timestamps
fn split_timing(line: &str) -> (&str, &str) {
    line.split_once(" --> ").expect("timing line")
}

#[test]
fn test_render_withWorkedExample_shouldMatchExactly() {
    let document = captions::render_lines(&["Hello world", "Second line"], chunk(2.0));

    let expected = String::from("WEBVTT\n\n")
        + "1\n00:00:00.000 --> 00:00:02.000\nHello world\n\n"
        + "2\n00:00:02.000 --> 00:00:04.000\nSecond line\n\n";
    assert_eq!(document, expected);
}

#[test]
fn test_render_withEmptyTranscript_shouldBeHeaderOnly() {
    let document = captions::render(&Transcript::default(), chunk(2.0));
    assert_eq!(document, "WEBVTT\n\n");
    assert!(cue_blocks(&document).is_empty());
}

#[test]
fn test_render_withBlankLines_shouldNotShiftIndices() {
    let with_blanks = captions::render(&Transcript::parse("a\n\n \nb\n\t\nc"), chunk(2.0));
    let without = captions::render(&Transcript::parse("a\nb\nc"), chunk(2.0));

    assert_eq!(with_blanks, without);
    let blocks = cue_blocks(&with_blanks);
    assert_eq!(blocks[1], ["2", "00:00:02.000 --> 00:00:04.000", "b"]);
}

#[test]
fn test_render_withSameInput_shouldBeByteIdentical() {
    let transcript = Transcript::parse("one\ntwo\nthree\nfour");
    let first = captions::render(&transcript, chunk(1.5));
    let second = captions::render(&transcript, chunk(1.5));
    assert_eq!(first, second);
}

#[test]
fn test_render_withRepeatedLines_shouldKeepEveryCue() {
    let document = captions::render_lines(&["same", "same"], chunk(2.0));
    assert_eq!(cue_blocks(&document).len(), 2);
}

#[test]
fn test_render_withManyLines_shouldEndWithBlankLine() {
    let lines: Vec<String> = (0..50).map(|i| format!("caption {}", i)).collect();
    let document = captions::render_lines(&lines, chunk(2.0));

    assert!(document.ends_with("caption 49\n\n"));
    assert!(!document.ends_with("\n\n\n"));
}

#[test]
fn test_render_pastOneHundredHours_shouldWidenHourField() {
    // 2 seconds * 180_000 lines = 100 hours
    let lines: Vec<String> = (0..180_001).map(|i| i.to_string()).collect();
    let document = captions::render_lines(&lines, chunk(2.0));

    assert!(document.ends_with("180001\n100:00:00.000 --> 100:00:02.000\n180000\n\n"));
}

#[test]
fn test_cues_withAnyChunk_shouldBeContiguousMultiples() {
    let lines: Vec<String> = (0..25).map(|i| format!("line {}", i)).collect();
    let chunk = chunk(0.75);

    for (i, cue) in captions::cues(&lines, chunk).enumerate() {
        assert_eq!(cue.index, i + 1);
        assert_eq!(cue.start_nanos, 750_000_000 * i as u128);
        assert_eq!(cue.end_nanos, cue.start_nanos + u128::from(chunk.as_nanos()));
    }
}

/// Sweep random durations and line counts: every cue must start at exactly
/// d*(i-1), end at d*i, and share its end string with the next cue's start
#[test]
fn test_render_withRandomDurations_shouldNotDrift() {
    let mut rng = rand::rng();

    for _ in 0..200 {
        // Whole milliseconds so the expected values are exact
        let millis: u64 = rng.random_range(1..=10_000);
        let count: usize = rng.random_range(0..400);
        let secs = millis as f64 / 1000.0;

        let lines: Vec<String> = (0..count).map(|i| format!("line {}", i)).collect();
        let document = captions::render_lines(&lines, chunk(secs));
        let blocks = cue_blocks(&document);
        assert_eq!(blocks.len(), count, "chunk {}s", secs);

        for (i, block) in blocks.iter().enumerate() {
            let (start, end) = split_timing(block[1]);
            assert_eq!(block[0], (i + 1).to_string());
            assert_eq!(start, format_duration(Duration::from_millis(millis * i as u64)));
            assert_eq!(end, format_duration(Duration::from_millis(millis * (i as u64 + 1))));
            assert_eq!(block[2], format!("line {}", i));

            if let Some(next) = blocks.get(i + 1) {
                assert_eq!(end, split_timing(next[1]).0);
            }
        }
    }
}

#[test]
fn test_formatSeconds_withBoundaryValues_shouldMatchExpected() {
    assert_eq!(format_seconds(3600.0), "01:00:00.000");
    assert_eq!(format_seconds(0.0), "00:00:00.000");
    assert_eq!(format_seconds(59.999), "00:00:59.999");
    assert_eq!(format_seconds(60.0), "00:01:00.000");
    assert_eq!(format_seconds(3599.999), "00:59:59.999");
}

#[test]
fn test_writeCaptions_withMissingTranscript_shouldReportSourceRead() {
    let dir = tempfile::tempdir().unwrap();
    let result = captions::write_captions(dir.path().join("missing.txt"), dir.path().join("out.vtt"), chunk(2.0));

    let err = result.unwrap_err();
    assert_eq!(err.phase(), "transcript");
    assert!(!dir.path().join("out.vtt").exists());
}

#[test]
fn test_writeCaptions_withInvalidUtf8_shouldReportSourceRead() {
    let dir = tempfile::tempdir().unwrap();
    let transcript = dir.path().join("binary.txt");
    std::fs::write(&transcript, [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let err = captions::write_captions(&transcript, dir.path().join("out.vtt"), chunk(2.0)).unwrap_err();
    assert!(matches!(err, vttcast::AppError::SourceRead { .. }));
}

#[test]
fn test_writeCaptions_withUnwritableDestination_shouldReportSinkWrite() {
    let dir = tempfile::tempdir().unwrap();
    let transcript = dir.path().join("text.txt");
    std::fs::write(&transcript, "line\n").unwrap();

    // The destination is an existing directory
    let output = dir.path().join("out.vtt");
    std::fs::create_dir(&output).unwrap();
    let err = captions::write_captions(&transcript, &output, chunk(2.0)).unwrap_err();
    assert!(matches!(err, vttcast::AppError::SinkWrite { .. }));
}

#[test]
fn test_writeCaptions_withMissingOutputDir_shouldCreateIt() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let transcript = dir.path().join("text.txt");
    std::fs::write(&transcript, "only line\n")?;

    let output = dir.path().join("tmp").join("hls").join("subtitles.vtt");
    let count = captions::write_captions(&transcript, &output, chunk(2.0))?;

    assert_eq!(count, 1);
    assert_eq!(
        std::fs::read_to_string(&output)?,
        "WEBVTT\n\n1\n00:00:00.000 --> 00:00:02.000\nonly line\n\n"
    );
    Ok(())
}
