//! Line-oriented text patches.
//!
//! Content is split on `\n` exactly, so a trailing newline shows up as a final
//! empty line and re-joining yields the original bytes. Each primitive has a
//! pure `*_in` form working on a string and a file-backed form that reads the
//! whole file, transforms it in memory and writes it back in place.

use crate::error::{EditError, EditResult, ValidationError};
use crate::sha256_hex;
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use diffy::PatchFormatter;
use fs_err as fs;
use multiapp_types::ops::{InsertPosition, ReplaceRule};
use multiapp_types::report::FileChange;
use regex::{NoExpand, Regex};
use tracing::debug;

/// Result of patching one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEdit {
    pub path: Utf8PathBuf,
    pub before: String,
    pub after: String,
    /// Set when an `insert_at` anchor was not found.
    pub anchor_missing: Option<String>,
}

impl FileEdit {
    pub fn changed(&self) -> bool {
        self.before != self.after
    }

    pub fn file_change(&self) -> FileChange {
        FileChange {
            path: self.path.to_string(),
            before_sha256: sha256_hex(self.before.as_bytes()),
            after_sha256: sha256_hex(self.after.as_bytes()),
            before_bytes: self.before.len() as u64,
            after_bytes: self.after.len() as u64,
        }
    }

    /// Unified diff of the change, labelled with `display_path`.
    pub fn unified_diff(&self, display_path: &str) -> String {
        if !self.changed() {
            return String::new();
        }
        let mut out = format!("--- a/{0}\n+++ b/{0}\n", display_path);
        let patch = diffy::create_patch(&self.before, &self.after);
        let body = PatchFormatter::new().fmt_patch(&patch).to_string();
        // diffy repeats the ---/+++ header; keep only the hunks.
        let hunks = body.find("@@").map(|i| &body[i..]).unwrap_or("");
        out.push_str(hunks);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out
    }
}

/// Insert `new_lines` relative to the first line equal to `anchor`.
///
/// Returns `None` when no line matches.
pub fn insert_lines_in(
    contents: &str,
    anchor: &str,
    position: InsertPosition,
    new_lines: &[String],
) -> Option<String> {
    let mut lines: Vec<&str> = contents.split('\n').collect();
    let pos = lines.iter().position(|l| *l == anchor)?;
    let (at, remove) = match position {
        InsertPosition::Before => (pos, 0),
        InsertPosition::Same => (pos, 1),
        InsertPosition::After => (pos + 1, 0),
    };
    lines.splice(at..at + remove, new_lines.iter().map(String::as_str));
    Some(lines.join("\n"))
}

/// Remove `length` lines starting at `offset` and insert `new_lines` there.
///
/// A negative `offset` counts from the end (`-1` is the last line).
pub fn splice_lines_in(
    contents: &str,
    offset: i64,
    length: usize,
    new_lines: &[String],
) -> Result<String, ValidationError> {
    let mut lines: Vec<&str> = contents.split('\n').collect();
    let len = lines.len();
    let out_of_bounds = || ValidationError::SpliceOutOfBounds {
        offset,
        length,
        lines: len,
    };
    let start = resolve_offset(len, offset).ok_or_else(out_of_bounds)?;
    let end = start
        .checked_add(length)
        .filter(|end| *end <= len)
        .ok_or_else(out_of_bounds)?;
    lines.splice(start..end, new_lines.iter().map(String::as_str));
    Ok(lines.join("\n"))
}

fn resolve_offset(len: usize, offset: i64) -> Option<usize> {
    if offset < 0 {
        let back = usize::try_from(offset.unsigned_abs()).ok()?;
        len.checked_sub(back)
    } else {
        let start = usize::try_from(offset).ok()?;
        (start <= len).then_some(start)
    }
}

/// Compiled form of a list of [`ReplaceRule`]s.
#[derive(Debug, Clone)]
pub struct CompiledRules(Vec<(Regex, String)>);

impl CompiledRules {
    pub fn compile(rules: &[ReplaceRule]) -> Result<Self, ValidationError> {
        let compiled = rules
            .iter()
            .map(|rule| {
                Regex::new(&rule.pattern)
                    .map(|re| (re, rule.replacement.clone()))
                    .map_err(|e| ValidationError::InvalidPattern {
                        pattern: rule.pattern.clone(),
                        message: e.to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self(compiled))
    }

    /// Apply every rule, in order, to the whole text.
    pub fn apply(&self, contents: &str) -> String {
        let mut out = contents.to_string();
        for (re, replacement) in &self.0 {
            out = re
                .replace_all(&out, NoExpand(replacement.as_str()))
                .into_owned();
        }
        out
    }
}

pub fn replace_all_in(contents: &str, rules: &[ReplaceRule]) -> Result<String, ValidationError> {
    Ok(CompiledRules::compile(rules)?.apply(contents))
}

/// File-backed [`insert_lines_in`]. A missing anchor leaves the file untouched
/// and is reported through [`FileEdit::anchor_missing`].
pub fn insert_at(
    path: &Utf8Path,
    anchor: &str,
    position: InsertPosition,
    new_lines: &[String],
) -> EditResult<FileEdit> {
    let before = read_target(path)?;
    let (after, anchor_missing) = match insert_lines_in(&before, anchor, position, new_lines) {
        Some(after) => (after, None),
        None => (before.clone(), Some(anchor.to_string())),
    };
    write_back(path, &before, &after)?;
    Ok(FileEdit {
        path: path.to_path_buf(),
        before,
        after,
        anchor_missing,
    })
}

/// File-backed [`splice_lines_in`].
pub fn splice_lines(
    path: &Utf8Path,
    offset: i64,
    length: usize,
    new_lines: &[String],
) -> EditResult<FileEdit> {
    let before = read_target(path)?;
    let after = splice_lines_in(&before, offset, length, new_lines)?;
    write_back(path, &before, &after)?;
    Ok(FileEdit {
        path: path.to_path_buf(),
        before,
        after,
        anchor_missing: None,
    })
}

/// Apply `rules` to each of `files` independently.
///
/// Patterns are compiled and every target is checked for existence before the
/// first file is rewritten.
pub fn regex_replace_all<P: AsRef<Utf8Path>>(
    files: &[P],
    rules: &[ReplaceRule],
) -> EditResult<Vec<FileEdit>> {
    let compiled = CompiledRules::compile(rules)?;
    if let Some(missing) = files.iter().map(AsRef::as_ref).find(|p| !p.is_file()) {
        return Err(EditError::MissingTarget {
            path: missing.to_path_buf(),
        });
    }

    let mut edits = Vec::with_capacity(files.len());
    for path in files.iter().map(AsRef::as_ref) {
        let before = read_target(path)?;
        let after = compiled.apply(&before);
        write_back(path, &before, &after)?;
        edits.push(FileEdit {
            path: path.to_path_buf(),
            before,
            after,
            anchor_missing: None,
        });
    }
    Ok(edits)
}

fn read_target(path: &Utf8Path) -> EditResult<String> {
    if !path.is_file() {
        return Err(EditError::MissingTarget {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path))?;
    Ok(contents)
}

fn write_back(path: &Utf8Path, before: &str, after: &str) -> EditResult<()> {
    if before == after {
        debug!(path = path.as_str(), "content unchanged, not rewriting");
        return Ok(());
    }
    fs::write(path, after).with_context(|| format!("write {}", path))?;
    debug!(
        path = path.as_str(),
        before = before.len(),
        after = after.len(),
        "rewrote file"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn insert_before_after_and_same() {
        let src = "a\nanchor\nb\n";
        assert_eq!(
            insert_lines_in(src, "anchor", InsertPosition::Before, &lines(&["x"])).unwrap(),
            "a\nx\nanchor\nb\n"
        );
        assert_eq!(
            insert_lines_in(src, "anchor", InsertPosition::After, &lines(&["x", "y"])).unwrap(),
            "a\nanchor\nx\ny\nb\n"
        );
        assert_eq!(
            insert_lines_in(src, "anchor", InsertPosition::Same, &lines(&["x"])).unwrap(),
            "a\nx\nb\n"
        );
    }

    #[test]
    fn insert_uses_first_match_only() {
        let src = "k\nk\n";
        assert_eq!(
            insert_lines_in(src, "k", InsertPosition::Before, &lines(&["x"])).unwrap(),
            "x\nk\nk\n"
        );
    }

    #[test]
    fn insert_requires_exact_line_match() {
        assert!(insert_lines_in("  anchor\n", "anchor", InsertPosition::Before, &[]).is_none());
    }

    #[test]
    fn splice_negative_offset_counts_from_end() {
        // "}\n" splits into ["}", ""], so -2 lands on the closing brace.
        let src = "class A\n{\n}\n";
        let out = splice_lines_in(src, -2, 0, &lines(&["    body"])).unwrap();
        assert_eq!(out, "class A\n{\n    body\n}\n");
    }

    #[test]
    fn splice_minus_one_inserts_before_last_line() {
        let out = splice_lines_in("a\nb\nc", -1, 0, &lines(&["x"])).unwrap();
        assert_eq!(out, "a\nb\nx\nc");
    }

    #[test]
    fn splice_replaces_leading_lines() {
        let out = splice_lines_in("1\n2\n3\n4\n5", 0, 4, &[]).unwrap();
        assert_eq!(out, "5");
    }

    #[test]
    fn splice_out_of_bounds_is_rejected() {
        assert_eq!(
            splice_lines_in("a\nb", 1, 5, &[]),
            Err(ValidationError::SpliceOutOfBounds {
                offset: 1,
                length: 5,
                lines: 2
            })
        );
        assert!(splice_lines_in("a\nb", -3, 0, &[]).is_err());
        assert!(splice_lines_in("a\nb", 3, 0, &[]).is_err());
        // Appending at the very end is in bounds.
        assert_eq!(splice_lines_in("a\nb", 2, 0, &lines(&["c"])).unwrap(), "a\nb\nc");
    }

    #[test]
    fn replace_is_literal_in_replacement() {
        let rules = vec![ReplaceRule::new("AppKernel", "$1Kernel")];
        assert_eq!(
            replace_all_in("new AppKernel();", &rules).unwrap(),
            "new $1Kernel();"
        );
    }

    #[test]
    fn replace_rules_apply_in_order() {
        let rules = vec![
            ReplaceRule::new("/app/", "/../apps/front/"),
            ReplaceRule::new("/var/", "/../var/"),
        ];
        assert_eq!(
            replace_all_in("__DIR__.'/../app/autoload.php'; '/../var/x'", &rules).unwrap(),
            "__DIR__.'/../../apps/front/autoload.php'; '/../../var/x'"
        );
    }

    #[test]
    fn invalid_pattern_is_validation_error() {
        let err = replace_all_in("x", &[ReplaceRule::new("(", "")]).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidPattern { .. }));
    }

    #[test]
    fn unified_diff_shows_hunks() {
        let edit = FileEdit {
            path: Utf8PathBuf::from("/tmp/x"),
            before: "a\nb\n".to_string(),
            after: "a\nc\n".to_string(),
            anchor_missing: None,
        };
        let diff = edit.unified_diff("x");
        assert!(diff.starts_with("--- a/x\n+++ b/x\n@@"));
        assert!(diff.contains("-b\n"));
        assert!(diff.contains("+c\n"));
    }
}
