use serde_json::json;

use super::*;

fn scales(speed: f64) -> VoiceScales {
    VoiceScales {
        speed,
        pitch: 1.0,
        volume: 1.0,
        intonation: 1.0,
    }
}

#[test]
fn only_non_default_scales_override_the_query() {
    let mut query = json!({ "speedScale": 1.0, "pitchScale": 0.0, "accent_phrases": [] });
    scales(1.2).apply(&mut query);
    assert_eq!(query["speedScale"], json!(1.2));
    assert_eq!(query["pitchScale"], json!(0.0));
    assert!(query.get("volumeScale").is_none());
}

#[test]
fn non_object_query_is_left_alone() {
    let mut query = json!([1, 2]);
    scales(2.0).apply(&mut query);
    assert_eq!(query, json!([1, 2]));
}

#[test]
fn base_url_comes_from_host_and_port() {
    let s = VoicevoxSynthesizer::new(&VoicevoxConfig::default()).unwrap();
    assert_eq!(s.base_url(), "http://127.0.0.1:50021");
}

#[test]
fn empty_text_is_rejected_without_network() {
    let s = VoicevoxSynthesizer::new(&VoicevoxConfig::default()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let err = s.synthesize("  \n", &dir.path().join("a.wav")).unwrap_err();
    assert!(matches!(err, ShortsError::Validation(_)));
}

#[test]
fn unreachable_engine_is_a_service_error() {
    let cfg = VoicevoxConfig {
        port: 9,
        ..VoicevoxConfig::default()
    };
    let s = VoicevoxSynthesizer::new(&cfg).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("a.wav");
    assert!(matches!(
        s.synthesize("こんにちは", &dest),
        Err(ShortsError::Service(_))
    ));
    assert!(!dest.exists());
}
