use super::*;

#[test]
fn blocks_separated_by_blank_lines_become_pages() {
    let pages = parse_pages("\n  表紙の##タイトル##  \n\n一行目\n二行目\n\n\n\n最後\n").unwrap();
    assert_eq!(pages, vec!["表紙の##タイトル##", "一行目\n二行目", "最後"]);
}

#[test]
fn crlf_is_normalised() {
    let pages = parse_pages("a\r\nb\r\n\r\nc").unwrap();
    assert_eq!(pages, vec!["a\nb", "c"]);
}

#[test]
fn empty_script_is_rejected() {
    assert!(matches!(
        parse_pages(" \n\n \n"),
        Err(ShortsError::Validation(_))
    ));
}

#[test]
fn stem_comes_from_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("my_story.txt");
    std::fs::write(&path, "one\n\ntwo").unwrap();
    let script = Script::from_path(&path).unwrap();
    assert_eq!(script.stem, "my_story");
    assert_eq!(script.pages.len(), 2);
}

#[test]
fn missing_file_is_a_validation_error() {
    assert!(Script::from_path(Path::new("/nonexistent/s.txt")).is_err());
}
