use super::*;

fn wav(sample_rate: u32, channels: u16, frames: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    let mut w = hound::WavWriter::new(&mut cursor, spec).unwrap();
    for _ in 0..frames * u32::from(channels) {
        w.write_sample(0i16).unwrap();
    }
    w.finalize().unwrap();
    cursor.into_inner()
}

#[test]
fn wav_duration_from_header() {
    let bytes = wav(24_000, 1, 48_000);
    assert!((wav_duration_secs(&bytes).unwrap() - 2.0).abs() < 1e-9);
}

#[test]
fn wav_duration_counts_frames_not_samples() {
    let bytes = wav(48_000, 2, 24_000);
    assert!((wav_duration_secs(&bytes).unwrap() - 0.5).abs() < 1e-9);
}

#[test]
fn header_only_wav_is_zero_seconds() {
    assert_eq!(wav_duration_secs(&wav(24_000, 1, 0)).unwrap(), 0.0);
}

#[test]
fn wav_duration_rejects_non_wav() {
    assert!(matches!(
        wav_duration_secs(b"ID3\x03 not a wav"),
        Err(ShortsError::Media(_))
    ));
    assert!(wav_duration_secs(&[]).is_err());
}

#[test]
fn pcm_frame_math() {
    let pcm = AudioPcm::silence(48_000, 24_000);
    assert_eq!(pcm.frames(), 24_000);
    assert!((pcm.duration_secs() - 0.5).abs() < 1e-12);
}

#[test]
fn capabilities_are_stable_across_calls() {
    assert_eq!(Capabilities::get(), Capabilities::get());
}

#[test]
fn decode_missing_file_is_media_error() {
    let err = decode_audio_f32_stereo(Path::new("/no/such/narration.wav"), MIX_SAMPLE_RATE)
        .unwrap_err();
    assert!(matches!(err, ShortsError::Media(_)));
}
