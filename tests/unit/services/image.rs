use super::*;

fn prediction(json: &str) -> ReplicatePrediction {
    serde_json::from_str(json).unwrap()
}

#[test]
fn prompt_gets_portrait_suffix() {
    let p = enhance_prompt("a cat on a sofa");
    assert!(p.starts_with("a cat on a sofa, vertical orientation"));
    assert!(p.contains("9:16 aspect ratio"));
}

#[test]
fn provider_names() {
    assert_eq!(FluxProvider::from_name("fal.ai").unwrap(), FluxProvider::Fal);
    assert_eq!(
        FluxProvider::from_name("replicate").unwrap(),
        FluxProvider::Replicate
    );
    assert!(FluxProvider::from_name("midjourney").is_err());
}

#[test]
fn generator_requires_a_key() {
    assert!(FluxImageGenerator::new(&FluxConfig::default()).is_err());
    let cfg = FluxConfig {
        api_key: "k".into(),
        provider: "replicate".into(),
        ..FluxConfig::default()
    };
    let g = FluxImageGenerator::new(&cfg).unwrap();
    assert_eq!(g.provider(), FluxProvider::Replicate);
    assert_eq!(g.model(), "flux-dev");

    let cfg = FluxConfig {
        model: "flux-schnell".into(),
        ..cfg
    };
    assert_eq!(FluxImageGenerator::new(&cfg).unwrap().model(), "flux-schnell");
}

#[test]
fn replicate_poll_states() {
    assert_eq!(
        prediction(r#"{"status":"processing"}"#).outcome().unwrap(),
        None
    );
    assert_eq!(
        prediction(r#"{"status":"succeeded","output":["https://x/y.png"]}"#)
            .outcome()
            .unwrap(),
        Some("https://x/y.png".to_string())
    );
    let err = prediction(r#"{"status":"failed","error":"nsfw"}"#)
        .outcome()
        .unwrap_err();
    assert!(err.to_string().contains("nsfw"));
    assert!(prediction(r#"{"status":"succeeded","output":[]}"#).outcome().is_err());
    assert!(prediction(r#"{"status":"weird"}"#).outcome().is_err());
}

#[test]
fn placeholder_writes_black_png_at_size() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested").join("p.png");
    PlaceholderImage {
        width: 12,
        height: 20,
    }
    .generate("ignored", &dest)
    .unwrap();

    let img = ::image::open(&dest).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (12, 20));
    assert_eq!(img.get_pixel(5, 5).0, [0, 0, 0]);
}
