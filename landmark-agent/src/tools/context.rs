//! Long-form infrastructure context.
//!
//! Scans the area dossier files for any of the requested keywords and
//! returns matching documents wholesale, headed by their file name. Crude,
//! and deliberately so: the reasoner is the summarizer, not this tool.

use std::path::Path;

/// Dossier files scanned for keywords, in order.
pub const CONTEXT_FILES: [&str; 2] = ["infra_dossier.md", "cb_minutes.md"];

/// Concatenate every dossier that mentions at least one keyword.
///
/// Keywords match case-insensitively. Files that are absent or unreadable
/// are skipped; an empty string means nothing matched.
pub fn long_context_for_area(data_dir: &Path, keywords: &[String]) -> String {
    let mut context = String::new();

    for filename in CONTEXT_FILES {
        let path = data_dir.join(filename);
        let Ok(content) = std::fs::read_to_string(&path) else {
            continue;
        };

        let haystack = content.to_lowercase();
        let matched = keywords
            .iter()
            .filter(|kw| !kw.is_empty())
            .any(|kw| haystack.contains(&kw.to_lowercase()));

        if matched {
            context.push_str(&format!("## From {}:\n\n{}\n\n", filename, content));
        }
    }

    context
}

// =============================================================================
// TESTS
// =============================================================================
