use mdform_core::templates::discovery::discover_templates;
use mdform_core::templates::errors::{FieldValidationError, TemplateParseError};
use mdform_core::templates::parser::SchemaParser;
use mdform_core::templates::{DocumentError, TemplateDiscoveryError, TemplateIndex};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(path: &PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn template(items: &str) -> String {
    format!("---\nnote-from-form: {{\"form-items\": [{items}]}}\n---\nbody\n")
}

fn parser() -> SchemaParser {
    SchemaParser::new("note-from-form")
}

#[test]
fn discovers_nested_templates_with_composed_names() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("tpl");

    write(&root.join("daily.md"), &template(r#"{"id":"a","type":"text"}"#));
    write(&root.join("work").join("meetings").join("weekly.md"), &template(""));
    write(&root.join("wiki").join("topic.markdown"), &template(""));
    write(&root.join("note.txt"), "# nope");

    let report = discover_templates(&root, &parser()).expect("discover ok");
    let names: Vec<&str> = report.templates.iter().map(|t| t.name.as_str()).collect();

    assert_eq!(names, ["daily", "work -> meetings -> weekly"]);
    assert_eq!(
        report.templates[1].source,
        Path::new("work").join("meetings").join("weekly.md")
    );
    assert!(report.failures.is_empty());
}

#[test]
fn unknown_kind_does_not_abort_siblings() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().to_path_buf();

    write(&root.join("a.md"), &template(r#"{"id":"x","type":"text"}"#));
    write(&root.join("b.md"), &template(r#"{"id":"x","type":"text"},{"id":"y","type":"slider"}"#));
    write(&root.join("c.md"), &template(r#"{"id":"z","type":"number"}"#));

    let report = discover_templates(&root, &parser()).unwrap();
    let names: Vec<&str> = report.templates.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["a", "c"]);

    assert_eq!(report.failures.len(), 1);
    let failure = &report.failures[0];
    assert_eq!(failure.path(), &PathBuf::from("b.md"));
    match failure {
        DocumentError::Parse {
            source: TemplateParseError::Field(FieldValidationError::UnknownKind { index, kind }),
            ..
        } => {
            assert_eq!(*index, 1);
            assert_eq!(kind, "slider");
        }
        other => panic!("expected UnknownKind, got {other:?}"),
    }
}

#[test]
fn plain_notes_are_skipped_not_failed() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().to_path_buf();

    write(&root.join("plain.md"), "# just a note\n");
    write(&root.join("other-props.md"), "---\ntags: [x]\n---\nbody\n");

    let report = discover_templates(&root, &parser()).unwrap();
    assert!(report.templates.is_empty());
    assert_eq!(report.skipped, vec![PathBuf::from("plain.md")]);
    assert_eq!(report.failures.len(), 1, "frontmatter without schema is reported");
}

#[cfg(unix)]
#[test]
fn unreadable_folder_does_not_abort_siblings() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempdir().unwrap();
    let root = tmp.path().to_path_buf();
    let locked = root.join("locked");

    write(&root.join("a.md"), &template(""));
    write(&locked.join("hidden.md"), &template(""));
    write(&root.join("z.md"), &template(""));
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Privileged users read the folder anyway; nothing to check then.
    let enforced = fs::read_dir(&locked).is_err();
    let report = discover_templates(&root, &parser());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    if !enforced {
        return;
    }

    let report = report.expect("walk errors are per-entry");
    let names: Vec<&str> = report.templates.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["a", "z"]);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(&report.failures[0], DocumentError::Walk { path, .. } if path == Path::new("locked")));
}

#[test]
fn missing_root_is_fatal() {
    let tmp = tempdir().unwrap();
    let err = discover_templates(&tmp.path().join("absent"), &parser()).unwrap_err();
    assert!(matches!(err, TemplateDiscoveryError::MissingDir(_)));
}

#[test]
fn reindex_replaces_stored_list() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("tpl");
    let index_path = tmp.path().join(".mdform").join("templates.json");

    write(&root.join("one.md"), &template(""));
    let first = discover_templates(&root, &parser()).unwrap();
    TemplateIndex::new(first.templates).save(&index_path).unwrap();

    write(&root.join("two.md"), &template(""));
    let second = discover_templates(&root, &parser()).unwrap();
    TemplateIndex::new(second.templates).save(&index_path).unwrap();

    let index = TemplateIndex::load(&index_path).unwrap();
    let commands: Vec<(String, String)> =
        index.commands().into_iter().map(|c| (c.id, c.name)).collect();
    assert_eq!(
        commands,
        [
            ("use-template-0".to_string(), "one".to_string()),
            ("use-template-1".to_string(), "two".to_string())
        ]
    );
}
