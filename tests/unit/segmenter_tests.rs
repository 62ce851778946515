/*!
 * Tests for the ffmpeg segmenter adapter
 */

use std::path::{Path, PathBuf};
use vttcast::app_config::{ChunkDuration, Config};
use vttcast::errors::AppError;
use vttcast::segmenter::{FfmpegSegmenter, SegmentedStream, Segmenter};
use crate::common;

fn two_seconds() -> ChunkDuration {
    ChunkDuration::from_secs_f64(2.0).unwrap()
}

#[test]
fn test_segment_withMissingSource_shouldFailBeforeLaunching() {
    let temp_dir = common::create_temp_dir().unwrap();
    let segmenter = FfmpegSegmenter::new("ffmpeg", "playlist.m3u8");

    let result = tokio_test::block_on(segmenter.segment(
        &temp_dir.path().join("missing.mp3"),
        temp_dir.path(),
        two_seconds(),
    ));

    match result {
        Err(AppError::Segmentation(message)) => assert!(message.contains("missing.mp3")),
        other => panic!("expected segmentation error, got {:?}", other),
    }
}

#[test]
fn test_segment_withDirectoryAsSource_shouldFailBeforeLaunching() {
    let temp_dir = common::create_temp_dir().unwrap();
    let source = temp_dir.path().join("audio.mp3");
    std::fs::create_dir(&source).unwrap();
    // A launch would fail with "failed to launch" instead
    let segmenter = FfmpegSegmenter::new("vttcast-no-such-binary", "playlist.m3u8");

    let result = tokio_test::block_on(segmenter.segment(&source, temp_dir.path(), two_seconds()));

    match result {
        Err(AppError::Segmentation(message)) => assert!(message.contains("does not exist")),
        other => panic!("expected segmentation error, got {:?}", other),
    }
}

#[test]
fn test_segment_withUnknownBinary_shouldReportLaunchFailure() {
    let temp_dir = common::create_temp_dir().unwrap();
    let source = common::create_test_file(temp_dir.path(), "audio.mp3", "not really audio").unwrap();
    let segmenter = FfmpegSegmenter::new("vttcast-no-such-binary", "playlist.m3u8");

    let result = tokio_test::block_on(segmenter.segment(&source, temp_dir.path(), two_seconds()));

    let err = result.unwrap_err();
    assert_eq!(err.phase(), "segmentation");
    assert!(err.to_string().contains("failed to launch"));
}

#[test]
fn test_fromConfig_shouldUseConfiguredPlaylistName() {
    let mut config = Config::default();
    config.paths.playlist_name = "stream.m3u8".to_string();
    let segmenter = FfmpegSegmenter::from_config(&config);

    let args = segmenter.build_args(Path::new("a.mp3"), Path::new("out"), two_seconds());
    assert_eq!(PathBuf::from(args.last().unwrap()), Path::new("out").join("stream.m3u8"));
}

#[test]
fn test_buildArgs_withFractionalChunk_shouldPassExactDuration() {
    let segmenter = FfmpegSegmenter::new("ffmpeg", "playlist.m3u8");
    let chunk = ChunkDuration::from_secs_f64(1.5).unwrap();
    let args = segmenter.build_args(Path::new("a.mp3"), Path::new("out"), chunk);

    let position = args.iter().position(|a| a == "-hls_time").unwrap();
    assert_eq!(args[position + 1], "1.5");
}

#[test]
fn test_fromPlaylist_withMissingFile_shouldFail() {
    let temp_dir = common::create_temp_dir().unwrap();
    let result = SegmentedStream::from_playlist(temp_dir.path().join("none.m3u8"));
    assert!(matches!(result, Err(AppError::Segmentation(_))));
}

#[cfg(unix)]
mod fake_ffmpeg {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn write_script(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-ffmpeg.sh");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    #[test]
    fn test_segment_withSuccessfulTool_shouldReadBackPlaylist() {
        let temp_dir = common::create_temp_dir().unwrap();
        let source = common::create_test_file(temp_dir.path(), "audio.mp3", "x").unwrap();
        let out = temp_dir.path().join("hls");
        fs::create_dir(&out).unwrap();

        // The playlist path is the last argument
        let script = write_script(
            temp_dir.path(),
            r#"for last; do :; done
dir=$(dirname "$last")
printf '#EXTM3U\n#EXTINF:2.000000,\nplaylist0.ts\n#EXTINF:1.250000,\nplaylist1.ts\n#EXT-X-ENDLIST\n' > "$last"
: > "$dir/playlist0.ts"
: > "$dir/playlist1.ts""#,
        );

        let segmenter = FfmpegSegmenter::new(script.to_string_lossy(), "playlist.m3u8");
        let stream = tokio_test::block_on(segmenter.segment(&source, &out, two_seconds())).unwrap();

        assert_eq!(stream.playlist, out.join("playlist.m3u8"));
        assert_eq!(stream.segments.len(), 2);
        assert_eq!(stream.segments[1].path, out.join("playlist1.ts"));
        assert!((stream.total_duration_secs() - 3.25).abs() < 1e-9);
    }

    #[test]
    fn test_segment_withNonZeroExit_shouldReportSegmentationError() {
        let temp_dir = common::create_temp_dir().unwrap();
        let source = common::create_test_file(temp_dir.path(), "audio.mp3", "x").unwrap();
        let script = write_script(temp_dir.path(), "exit 3");

        let segmenter = FfmpegSegmenter::new(script.to_string_lossy(), "playlist.m3u8");
        let result = tokio_test::block_on(segmenter.segment(&source, temp_dir.path(), two_seconds()));

        match result {
            Err(AppError::Segmentation(message)) => assert!(message.contains("exited with")),
            other => panic!("expected segmentation error, got {:?}", other),
        }
    }
}
