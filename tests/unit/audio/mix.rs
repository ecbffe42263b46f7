use super::*;

const SR: u32 = 100;

/// Stereo ramp whose left sample encodes the frame index.
fn ramp(frames: usize) -> AudioPcm {
    let mut data = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        let v = i as f32 / 10_000.0;
        data.push(v);
        data.push(-v);
    }
    AudioPcm {
        sample_rate: SR,
        channels: 2,
        interleaved_f32: data,
    }
}

fn mixer(bgm_path: Option<PathBuf>, lead_in_sec: f64) -> AudioMixer {
    AudioMixer {
        sample_rate: SR,
        narration_gain: 1.0,
        bgm: BgmConfig {
            path: bgm_path,
            volume: 1.0,
            boost: 1.0,
            lead_in_sec,
        },
    }
}

#[test]
fn short_bgm_is_looped_to_exact_length() {
    // 2s source covering 10s
    let src = ramp(2 * SR as usize);
    let bed = fit_bgm(&src, 0.0, SR, total_frames(10.0, SR)).unwrap();
    assert_eq!(bed.len(), 10 * SR as usize * 2);
    for frame in [0usize, 199, 200, 201, 999] {
        assert_eq!(bed[frame * 2], src.interleaved_f32[(frame % 200) * 2]);
    }
}

#[test]
fn long_bgm_is_truncated_to_exact_length() {
    let src = ramp(30 * SR as usize);
    let bed = fit_bgm(&src, 0.0, SR, total_frames(10.0, SR)).unwrap();
    assert_eq!(bed.len(), 10 * SR as usize * 2);
    assert_eq!(bed[999 * 2], src.interleaved_f32[999 * 2]);
}

#[test]
fn lead_in_is_skipped_before_looping() {
    // 5s source, 3s lead-in -> 2s loop body starting at frame 300
    let src = ramp(5 * SR as usize);
    let bed = fit_bgm(&src, 3.0, SR, total_frames(10.0, SR)).unwrap();
    assert_eq!(bed.len(), 2000);
    assert_eq!(bed[0], src.interleaved_f32[300 * 2]);
    assert_eq!(bed[200 * 2], src.interleaved_f32[300 * 2]);
}

#[test]
fn lead_in_longer_than_source_uses_whole_source() {
    let src = ramp(SR as usize);
    let bed = fit_bgm(&src, 3.0, SR, 250).unwrap();
    assert_eq!(bed.len(), 500);
    assert_eq!(bed[100 * 2], src.interleaved_f32[0]);
}

#[test]
fn empty_bgm_source_yields_none() {
    let empty = AudioPcm::silence(SR, 0);
    assert!(fit_bgm(&empty, 0.0, SR, 100).is_none());
}

#[test]
fn missing_bgm_file_mixes_narration_only_at_full_length() {
    let m = mixer(Some(PathBuf::from("/no/such/bgm.mp3")), 3.0);
    let narration = AudioTrack::new(
        AudioPcm {
            sample_rate: SR,
            channels: 2,
            interleaved_f32: vec![0.5; 100 * 2],
        },
        2.0,
    );
    let out = m.mix(&[narration], 10.0);
    assert_eq!(out.frames(), 1000);
    assert_eq!(out.interleaved_f32[199 * 2], 0.0);
    assert_eq!(out.interleaved_f32[200 * 2], 0.5);
    assert_eq!(out.interleaved_f32[299 * 2 + 1], 0.5);
    assert_eq!(out.interleaved_f32[300 * 2], 0.0);
}

#[test]
fn gains_multiply_and_result_is_clamped() {
    let mut m = mixer(None, 0.0);
    m.narration_gain = 1.3;
    m.bgm.volume = 0.5;
    m.bgm.boost = 2.0;
    assert_eq!(m.bgm.gain(), 1.0);

    let mut track = AudioTrack::new(
        AudioPcm {
            sample_rate: SR,
            channels: 2,
            interleaved_f32: vec![0.5; 10 * 2],
        },
        0.0,
    );
    track.gain = 1.0;
    let bgm = AudioPcm {
        sample_rate: SR,
        channels: 2,
        interleaved_f32: vec![0.1; 20 * 2],
    };
    let out = m.mix_loaded(&[track.clone()], Some(&bgm), 0.2);
    assert_eq!(out.frames(), 20);
    assert!((out.interleaved_f32[0] - (0.5 * 1.3 + 0.1)).abs() < 1e-6);
    assert!((out.interleaved_f32[15 * 2] - 0.1).abs() < 1e-6);

    track.gain = 4.0;
    let out = m.mix_loaded(&[track], None, 0.2);
    assert_eq!(out.interleaved_f32[0], 1.0);
}

#[test]
fn mono_source_is_spread_to_both_channels() {
    let m = mixer(None, 0.0);
    let track = AudioTrack::new(
        AudioPcm {
            sample_rate: SR,
            channels: 1,
            interleaved_f32: vec![0.25; 10],
        },
        0.0,
    );
    let out = m.mix_loaded(&[track], None, 0.1);
    assert_eq!(out.interleaved_f32, vec![0.25; 20]);
}

#[test]
fn writes_little_endian_f32() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/mix.f32le");
    write_mix_to_f32le_file(&[1.0, -0.5], &path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 8);
    assert_eq!(f32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), -0.5);
}
