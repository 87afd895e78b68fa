//! Recursive discovery of template documents.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use super::definition::TemplateDefinition;
use super::errors::{DocumentError, TemplateDiscoveryError};
use super::parser::SchemaParser;

/// Separator between folder segments in a template's display name.
pub const NAME_SEPARATOR: &str = " -> ";

/// Outcome of scanning a templates folder.
#[derive(Debug, Default)]
pub struct DiscoveryReport {
    /// Successfully parsed templates, in discovery order.
    pub templates: Vec<TemplateDefinition>,
    /// Documents without frontmatter (relative paths).
    pub skipped: Vec<PathBuf>,
    /// Documents that looked like templates but failed to parse.
    pub failures: Vec<DocumentError>,
}

/// Walk `root` and parse every markdown file as a template.
///
/// One malformed document never aborts the scan: it is recorded in
/// [`DiscoveryReport::failures`] and its siblings are still parsed.
pub fn discover_templates(
    root: &Path,
    parser: &SchemaParser,
) -> Result<DiscoveryReport, TemplateDiscoveryError> {
    if !root.is_dir() {
        return Err(TemplateDiscoveryError::MissingDir(root.display().to_string()));
    }

    let mut report = DiscoveryReport::default();

    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(source) => {
                let at = source.path().unwrap_or(root);
                let path = at.strip_prefix(root).unwrap_or(at).to_path_buf();
                warn!(path = %path.display(), error = %source, "failed to read templates folder");
                report.failures.push(DocumentError::Walk { path, source });
                continue;
            }
        };

        let path = entry.path();
        if !entry.file_type().is_file() || !is_template_file(path) {
            continue;
        }

        let rel = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        let name = display_name_from_relative(&rel);

        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(source) => {
                warn!(path = %rel.display(), error = %source, "failed to read template");
                report.failures.push(DocumentError::Io { path: rel, source });
                continue;
            }
        };

        match parser.parse_document(&name, &rel, &content) {
            Ok(Some(template)) => report.templates.push(template),
            Ok(None) => {
                warn!(path = %rel.display(), "file doesn't have frontmatter properties, skipping");
                report.skipped.push(rel);
            }
            Err(source) => {
                warn!(path = %rel.display(), error = %source, "failed to parse template");
                report.failures.push(DocumentError::Parse { path: rel, source });
            }
        }
    }

    info!(
        templates = report.templates.len(),
        skipped = report.skipped.len(),
        failed = report.failures.len(),
        "template discovery finished"
    );

    Ok(report)
}

fn is_template_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("md")
}

/// `meetings/team/weekly.md` becomes `meetings -> team -> weekly`.
fn display_name_from_relative(rel: &Path) -> String {
    let stem = rel.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();

    let mut name = String::new();
    if let Some(parent) = rel.parent() {
        for component in parent.components() {
            name.push_str(&component.as_os_str().to_string_lossy());
            name.push_str(NAME_SEPARATOR);
        }
    }
    name.push_str(&stem);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_top_level() {
        assert_eq!(display_name_from_relative(Path::new("daily.md")), "daily");
    }

    #[test]
    fn display_name_nested() {
        assert_eq!(
            display_name_from_relative(Path::new("work/meetings/weekly.md")),
            "work -> meetings -> weekly"
        );
    }

    #[test]
    fn only_markdown_files() {
        assert!(is_template_file(Path::new("a/b.md")));
        assert!(!is_template_file(Path::new("a/b.markdown")));
        assert!(!is_template_file(Path::new("a/b.txt")));
    }
}
