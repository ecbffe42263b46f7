use super::*;

#[test]
fn short_metadata_uses_script_stem_and_totals() {
    let meta = VideoMetadata::for_short("story", 4, 23.456, &YoutubeConfig::default());
    assert_eq!(meta.title, "AI Generated Short: story");
    assert!(meta.description.contains("4ページ"));
    assert!(meta.description.contains("23.5秒"));
    assert_eq!(meta.privacy_status, "private");
    assert_eq!(meta.category_id, "22");
}

#[test]
fn request_body_has_snippet_and_status() {
    let meta = VideoMetadata::for_short("s", 1, 3.0, &YoutubeConfig::default());
    let body = meta.request_body();
    assert_eq!(body["snippet"]["title"], "AI Generated Short: s");
    assert_eq!(body["snippet"]["tags"][0], "shorts");
    assert_eq!(body["status"]["privacyStatus"], "private");
}

#[test]
fn uploader_requires_a_token() {
    assert!(matches!(
        YoutubeUploader::new(&YoutubeConfig::default()),
        Err(ShortsError::Validation(_))
    ));
}

#[test]
fn missing_video_fails_before_any_request() {
    let cfg = YoutubeConfig {
        access_token: "t".into(),
        ..YoutubeConfig::default()
    };
    let up = YoutubeUploader::new(&cfg)
        .unwrap()
        .with_endpoint("http://127.0.0.1:9/upload");
    let meta = VideoMetadata::for_short("s", 1, 3.0, &cfg);
    let err = up.upload(Path::new("/nonexistent/v.mp4"), &meta).unwrap_err();
    assert!(err.to_string().contains("open video"));
}

#[test]
fn watch_url_format() {
    assert_eq!(watch_url("abc"), "https://www.youtube.com/watch?v=abc");
}
