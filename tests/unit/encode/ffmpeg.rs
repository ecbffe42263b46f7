use super::*;
use crate::encode::sink::AudioInputConfig;
use crate::foundation::core::Fps;

fn cfg(width: u32, height: u32, audio: Option<AudioInputConfig>) -> SinkConfig {
    SinkConfig {
        width,
        height,
        fps: Fps::new(30, 1).unwrap(),
        audio,
    }
}

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

#[test]
fn flatten_premul_alpha_0_returns_bg() {
    let src = vec![0u8, 0, 0, 0];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, vec![10, 20, 30, 255]);
}

#[test]
fn flatten_premul_alpha_255_is_identity() {
    let src = vec![1u8, 2, 3, 255];
    let mut dst = vec![0u8; 4];
    flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &src, [10, 20, 30, 255]).unwrap();
    assert_eq!(dst, src);
}

#[test]
fn flatten_rejects_mismatched_buffers() {
    let mut dst = vec![0u8; 8];
    assert!(flatten_premul_over_bg_to_opaque_rgba8(&mut dst, &[0u8; 4], [0; 4]).is_err());
}

#[test]
fn odd_dimensions_are_rejected_before_spawning() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("out/x.mp4"));
    let err = sink.begin(cfg(1081, 1920, None)).unwrap_err();
    assert!(err.to_string().contains("even"));
}

#[test]
fn zero_rate_audio_is_rejected() {
    let audio = AudioInputConfig {
        path: "a.f32le".into(),
        sample_rate: 0,
        channels: 2,
    };
    assert!(validate_sink_config(&cfg(1080, 1920, Some(audio))).is_err());
}

#[test]
fn push_before_begin_fails() {
    let mut sink = FfmpegSink::new(FfmpegSinkOpts::new("out/x.mp4"));
    let frame = FrameRGBA {
        width: 2,
        height: 2,
        data: vec![0; 16],
        premultiplied: true,
    };
    assert!(sink.push_frame(FrameIndex(0), &frame).is_err());
}

#[test]
fn video_only_args_drop_audio() {
    let opts = FfmpegSinkOpts::new("out/video.mp4");
    let args = strings(&ffmpeg_args(&opts, &cfg(1080, 1920, None)));
    assert_eq!(args[0], "-y");
    assert!(args.windows(2).any(|w| w == ["-s", "1080x1920"]));
    assert!(args.windows(2).any(|w| w == ["-r", "30/1"]));
    assert!(args.windows(2).any(|w| w == ["-c:v", "libx264"]));
    assert!(args.contains(&"-an".to_string()));
    assert_eq!(args.last().map(String::as_str), Some("out/video.mp4"));
}

#[test]
fn audio_args_mux_f32le_and_cut_to_shortest() {
    let opts = FfmpegSinkOpts::new("v.mp4").with_codec("libx265");
    let audio = AudioInputConfig {
        path: "mix.f32le".into(),
        sample_rate: 48_000,
        channels: 2,
    };
    let args = strings(&ffmpeg_args(&opts, &cfg(1080, 1920, Some(audio))));
    assert!(args.windows(2).any(|w| w == ["-f", "f32le"]));
    assert!(args.windows(2).any(|w| w == ["-ar", "48000"]));
    assert!(args.windows(2).any(|w| w == ["-i", "mix.f32le"]));
    assert!(args.windows(2).any(|w| w == ["-c:v", "libx265"]));
    assert!(args.windows(2).any(|w| w == ["-c:a", "aac"]));
    assert!(args.contains(&"-shortest".to_string()));
    assert!(!args.contains(&"-an".to_string()));
}

#[test]
fn parent_dir_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("a").join("b").join("v.mp4");
    ensure_parent_dir(&out).unwrap();
    assert!(out.parent().unwrap().is_dir());
}
