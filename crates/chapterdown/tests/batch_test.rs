//! Directory-level conversion with a mix of good and bad inputs.

use std::fs;

use chapterdown::{convert_directory, BatchError, ChapterService, ConversionError};

#[test]
fn test_batch_with_faulty_file() {
    let input = tempfile::tempdir().unwrap();
    let output = input.path().join("markdown");

    for (name, title) in [("ch1", "One"), ("ch2", "Two"), ("ch3", "Three")] {
        fs::write(
            input.path().join(format!("{name}.xhtml")),
            format!(r#"<html><body><h1><span class="chapterTitle">{title}</span></h1><p>Text of {name}</p></body></html>"#),
        )
        .unwrap();
    }
    fs::write(input.path().join("broken.xhtml"), [0x3c, 0x70, 0x3e, 0xff, 0xfe]).unwrap();
    fs::write(input.path().join("cover.jpg"), [0xff, 0xd8]).unwrap();

    let report = convert_directory(&ChapterService::new(), input.path(), &output).unwrap();

    assert_eq!(report.converted(), 3);
    assert_eq!(report.total(), 4);
    assert!(!report.is_complete());
    assert!(matches!(
        &report.failures[..],
        [ConversionError::Encoding { path, .. }] if path.ends_with("broken.xhtml")
    ));

    let mut written: Vec<_> = fs::read_dir(&output)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    written.sort();
    assert_eq!(written, vec!["ch1.md", "ch2.md", "ch3.md"]);

    let ch2 = fs::read_to_string(output.join("ch2.md")).unwrap();
    assert_eq!(ch2, "---\ntitle: \"Two\"\n---\n\nText of ch2\n");
}

#[test]
fn test_dotted_stems_keep_their_name() {
    let input = tempfile::tempdir().unwrap();
    fs::write(input.path().join("part1.ch2.xhtml"), "<p>x</p>").unwrap();

    let report = convert_directory(&ChapterService::new(), input.path(), input.path()).unwrap();

    assert_eq!(report.written, vec![input.path().join("part1.ch2.md")]);
}

#[test]
fn test_custom_extensions() {
    let input = tempfile::tempdir().unwrap();
    fs::write(input.path().join("a.html"), "<p>x</p>").unwrap();
    fs::write(input.path().join("b.xhtml"), "<p>y</p>").unwrap();

    let mut service = ChapterService::new();
    service.options_mut().source_extension = "html".to_string();
    service.options_mut().target_extension = "markdown".to_string();

    let report = convert_directory(&service, input.path(), input.path()).unwrap();
    assert_eq!(report.written, vec![input.path().join("a.markdown")]);
}

#[test]
fn test_missing_input_directory_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out");

    let err = convert_directory(&ChapterService::new(), &dir.path().join("none"), &output)
        .unwrap_err();

    assert!(matches!(err, BatchError::DirectoryNotFound(_)));
    assert!(!output.exists());
}
