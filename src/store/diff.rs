//! Snapshot comparison engine.
//!
//! Compares snapshot content against another version of the file:
//! - Line based, via `similar`
//! - Unified output with configurable context
//! - Added/removed line counts for a summary line

use similar::{ChangeTag, TextDiff};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffResult {
    pub unified: String,
    pub added: usize,
    pub removed: usize,
}

impl DiffResult {
    pub fn is_unchanged(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

/// Compare `old` (snapshot) to `new` (current) and render a unified diff.
///
/// Bytes are decoded lossily; invalid UTF-8 shows up as replacement characters.
pub fn compare_contents(
    old: &[u8],
    new: &[u8],
    old_label: &str,
    new_label: &str,
    context: usize,
) -> DiffResult {
    let old = String::from_utf8_lossy(old);
    let new = String::from_utf8_lossy(new);
    let diff = TextDiff::from_lines(old.as_ref(), new.as_ref());

    let mut added = 0;
    let mut removed = 0;
    let mut unified = String::new();

    for (idx, group) in diff.grouped_ops(context).iter().enumerate() {
        if idx == 0 {
            unified.push_str(&format!("--- {old_label}\n"));
            unified.push_str(&format!("+++ {new_label}\n"));
        } else {
            unified.push_str("...\n");
        }

        for op in group {
            for change in diff.iter_changes(op) {
                let sign = match change.tag() {
                    ChangeTag::Delete => {
                        removed += 1;
                        "-"
                    }
                    ChangeTag::Insert => {
                        added += 1;
                        "+"
                    }
                    ChangeTag::Equal => " ",
                };

                unified.push_str(sign);
                unified.push_str(change.value());
                if !change.value().ends_with('\n') {
                    unified.push('\n');
                }
            }
        }
    }

    DiffResult {
        unified,
        added,
        removed,
    }
}
