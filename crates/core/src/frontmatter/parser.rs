//! Frontmatter parsing from markdown documents.
//!
//! Template frontmatter is never fed to a YAML parser: other properties may
//! contain unrendered `{{var}}` placeholders that are not valid YAML until the
//! note is rendered. Only the schema property is located and cut out textually.

use regex::Regex;

use crate::templates::errors::SchemaParseError;

/// A document split at its frontmatter delimiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontmatterSplit<'a> {
    /// Text between the opening and closing `---` lines.
    pub yaml: &'a str,
    /// Everything after the closing `---` line.
    pub body: &'a str,
}

/// The schema property cut out of the frontmatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyBlock {
    /// The balanced `{ ... }` value.
    pub value: String,
    /// Frontmatter text with the property removed.
    pub remainder: String,
}

/// Split a document into frontmatter and body.
///
/// Frontmatter is delimited by `---` at the start of the document:
/// ```markdown
/// ---
/// key: value
/// ---
/// # Document content
/// ```
///
/// Returns `None` when the document has no complete frontmatter block.
pub fn split(content: &str) -> Option<FrontmatterSplit<'_>> {
    let trimmed = content.trim_start_matches('\u{feff}').trim_start();

    let after_first = trimmed.strip_prefix("---")?;

    // Skip the newline after opening ---
    let after_newline =
        after_first.strip_prefix('\n').or_else(|| after_first.strip_prefix("\r\n"))?;

    // Closing --- must sit on its own line
    let mut offset = 0;
    for line in after_newline.split_inclusive('\n') {
        if line.trim() == "---" {
            return Some(FrontmatterSplit {
                yaml: &after_newline[..offset],
                body: &after_newline[offset + line.len()..],
            });
        }
        offset += line.len();
    }

    None
}

/// Locate `key: { ... }` in frontmatter text and cut it out.
///
/// The value may span several lines. Its end is the brace that balances the
/// opening one; braces inside JSON strings are ignored.
pub fn extract_object_property(
    yaml: &str,
    key: &str,
) -> Result<PropertyBlock, SchemaParseError> {
    let pattern = format!(r#"(?m)^[ \t]*["']?{}["']?[ \t]*:\s*"#, regex::escape(key));
    let re = Regex::new(&pattern).expect("escaped key forms a valid regex");

    let m = re
        .find(yaml)
        .ok_or_else(|| SchemaParseError::MissingProperty(key.to_string()))?;

    let value_start = m.end();
    if !yaml[value_start..].starts_with('{') {
        return Err(SchemaParseError::NotAnObject { property: key.to_string() });
    }

    let value_end = find_balanced_end(&yaml[value_start..])
        .map(|rel| value_start + rel)
        .ok_or_else(|| SchemaParseError::Unbalanced { property: key.to_string() })?;

    // Drop the rest of the line if nothing but whitespace follows the value
    let tail = &yaml[value_end..];
    let tail = match tail.find('\n') {
        Some(nl) if tail[..nl].trim().is_empty() => &tail[nl + 1..],
        None if tail.trim().is_empty() => "",
        _ => tail,
    };

    Ok(PropertyBlock {
        value: yaml[value_start..value_end].to_string(),
        remainder: format!("{}{}", &yaml[..m.start()], tail),
    })
}

/// Byte offset just past the brace closing the object that `text` starts with.
fn find_balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + c.len_utf8());
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_no_frontmatter() {
        assert_eq!(split("# Hello\n\nSome content"), None);
    }

    #[test]
    fn split_unclosed_frontmatter() {
        assert_eq!(split("---\ntitle: x\n# Hello"), None);
    }

    #[test]
    fn split_simple_frontmatter() {
        let doc = split("---\ntitle: Hello\n---\n# Content").unwrap();
        assert_eq!(doc.yaml, "title: Hello\n");
        assert_eq!(doc.body, "# Content");
    }

    #[test]
    fn split_empty_frontmatter() {
        let doc = split("---\n---\n# Content").unwrap();
        assert_eq!(doc.yaml, "");
        assert_eq!(doc.body, "# Content");
    }

    #[test]
    fn split_crlf() {
        let doc = split("---\r\ntitle: Hello\r\n---\r\nBody").unwrap();
        assert_eq!(doc.yaml, "title: Hello\r\n");
        assert_eq!(doc.body, "Body");
    }

    #[test]
    fn split_keeps_later_rules_in_body() {
        let doc = split("---\na: 1\n---\ntext\n---\nmore").unwrap();
        assert_eq!(doc.body, "text\n---\nmore");
    }

    #[test]
    fn extract_single_line_property() {
        let yaml = "tags: [x]\nnote-from-form: {\"form-items\": []}\nstatus: open\n";
        let block = extract_object_property(yaml, "note-from-form").unwrap();
        assert_eq!(block.value, "{\"form-items\": []}");
        assert_eq!(block.remainder, "tags: [x]\nstatus: open\n");
    }

    #[test]
    fn extract_multi_line_property_with_braces_in_strings() {
        let yaml = "form: {\n  \"file-name\": \"t:{{title}}\",\n  \"form-items\": [{\"id\": \"a\", \"get\": \"f:return \\\"}\\\"\"}]\n}\nafter: 1\n";
        let block = extract_object_property(yaml, "form").unwrap();
        assert!(block.value.starts_with('{'));
        assert!(block.value.ends_with('}'));
        assert!(serde_json::from_str::<serde_json::Value>(&block.value).is_ok());
        assert_eq!(block.remainder, "after: 1\n");
    }

    #[test]
    fn extract_missing_property() {
        let err = extract_object_property("title: x\n", "note-from-form").unwrap_err();
        assert!(matches!(err, SchemaParseError::MissingProperty(p) if p == "note-from-form"));
    }

    #[test]
    fn extract_requires_object() {
        let err = extract_object_property("note-from-form: yes\n", "note-from-form")
            .unwrap_err();
        assert!(matches!(err, SchemaParseError::NotAnObject { .. }));
    }

    #[test]
    fn extract_unbalanced() {
        let err = extract_object_property("note-from-form: {\"a\": [1, 2}\n", "note-from-form")
            .unwrap_err();
        assert!(matches!(err, SchemaParseError::Unbalanced { .. }));
    }

    #[test]
    fn key_is_matched_literally() {
        let yaml = "formxitems: {}\nform.items: {\"a\": 1}\n";
        let block = extract_object_property(yaml, "form.items").unwrap();
        assert_eq!(block.value, "{\"a\": 1}");
        assert_eq!(block.remainder, "formxitems: {}\n");
    }
}
