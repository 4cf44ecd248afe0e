//! Backing-directory traversal for datastore search.
//!
//! Runs against the local file system only; callers must not hold the
//! inventory lock while walking.

use std::path::{Component, Path};

use chrono::{DateTime, Utc};
use regex::Regex;
use vsim_types::FileInfo;
use walkdir::WalkDir;

/// A set of glob patterns matched against single file names.
///
/// Supported syntax: `*` (any run of characters), `?` (one character),
/// `[abc]`, `[a-z]` and negated `[!abc]` / `[^abc]` classes, and `\`
/// escapes. A pattern that does not compile (an unclosed class, say)
/// matches nothing.
#[derive(Debug, Clone)]
pub struct GlobSet {
    patterns: Vec<Regex>,
}

impl GlobSet {
    /// Compiles `patterns`, dropping the invalid ones.
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .filter_map(|p| glob_to_regex(p.as_ref()))
            .collect();
        Self { patterns }
    }

    /// Returns true if any pattern matches the whole of `name`.
    #[must_use]
    pub fn is_match(&self, name: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(name))
    }

    /// Returns true if no usable pattern was given.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Translates one glob into an anchored regex.
fn glob_to_regex(glob: &str) -> Option<Regex> {
    let mut out = String::with_capacity(glob.len() * 2 + 2);
    out.push('^');

    let mut chars = glob.chars();
    while let Some(c) = chars.next() {
        match c {
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '\\' => {
                let escaped = chars.next()?;
                out.push_str(&regex::escape(&escaped.to_string()));
            }
            '[' => {
                out.push('[');
                let mut first = true;
                let mut closed = false;
                for c in chars.by_ref() {
                    match c {
                        ']' if !first => {
                            closed = true;
                            break;
                        }
                        '!' | '^' if first => out.push('^'),
                        '\\' | '[' | ']' | '&' | '~' => {
                            out.push('\\');
                            out.push(c);
                        }
                        _ => out.push(c),
                    }
                    first = false;
                }
                if !closed {
                    return None;
                }
                out.push(']');
            }
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
    }

    out.push('$');
    Regex::new(&out).ok()
}

/// Returns true if `relative` stays inside the directory it is joined to.
///
/// Rejects absolute paths and any `..` component.
#[must_use]
pub fn is_contained(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Walks `root/folder` and returns every entry whose name matches `globs`.
///
/// Returned paths are relative to `root`, `/`-separated, in file-name
/// order. The search root itself is never reported.
///
/// # Errors
///
/// The first traversal error, including a missing or unreadable search
/// root.
pub fn search(root: &Path, folder: &str, globs: &GlobSet) -> Result<Vec<FileInfo>, walkdir::Error> {
    let base = root.join(folder);
    let mut found = Vec::new();

    for entry in WalkDir::new(&base).sort_by_file_name() {
        let entry = entry?;
        // The queried folder is the result's folder_path, never a file entry.
        if entry.depth() == 0 {
            continue;
        }

        let name = entry.file_name().to_string_lossy();
        if !globs.is_match(&name) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };
        let metadata = entry.metadata()?;
        found.push(FileInfo {
            path: to_slash(relative),
            file_size: i64::try_from(metadata.len()).unwrap_or(i64::MAX),
            modification: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }

    Ok(found)
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    mod glob_tests {
        use super::*;

        #[test]
        fn star_matches_within_a_name() {
            let globs = GlobSet::new(["*.vmx"]);
            assert!(globs.is_match("vm1.vmx"));
            assert!(globs.is_match(".vmx"));
            assert!(!globs.is_match("vm1.vmx.lck"));
            assert!(!globs.is_match("vm1.vmdk"));
        }

        #[test]
        fn question_mark_and_classes() {
            let globs = GlobSet::new(["vm?.log", "disk[0-9].vmdk", "[!x]y"]);
            assert!(globs.is_match("vm1.log"));
            assert!(!globs.is_match("vm12.log"));
            assert!(globs.is_match("disk7.vmdk"));
            assert!(!globs.is_match("diskA.vmdk"));
            assert!(globs.is_match("ay"));
            assert!(!globs.is_match("xy"));
        }

        #[test]
        fn regex_metacharacters_are_literal() {
            let globs = GlobSet::new(["a+b(1).txt"]);
            assert!(globs.is_match("a+b(1).txt"));
            assert!(!globs.is_match("aab1.txt"));
        }

        #[test]
        fn invalid_patterns_match_nothing() {
            let globs = GlobSet::new(["[abc", "trailing\\"]);
            assert!(globs.is_empty());
            assert!(!globs.is_match("a"));
        }

        #[test]
        fn empty_set_matches_nothing() {
            let globs = GlobSet::new(Vec::<String>::new());
            assert!(!globs.is_match("anything"));
        }
    }

    mod walk_tests {
        use super::*;

        #[test]
        fn search_returns_relative_paths() {
            let dir = tempfile::tempdir().unwrap();
            fs::create_dir_all(dir.path().join("vm1")).unwrap();
            fs::write(dir.path().join("vm1/vm1.vmx"), b"config").unwrap();
            fs::write(dir.path().join("vm1/vm1.vmdk"), b"disk").unwrap();
            fs::write(dir.path().join("top.vmx"), b"").unwrap();

            let found = search(dir.path(), "", &GlobSet::new(["*.vmx"])).unwrap();
            let paths: Vec<_> = found.iter().map(|f| f.path.as_str()).collect();
            assert_eq!(paths, vec!["top.vmx", "vm1/vm1.vmx"]);
            assert_eq!(found[1].file_size, 6);
            assert!(found.iter().all(|f| !f.path.starts_with('/')));
        }

        #[test]
        fn search_in_subfolder_keeps_root_relative_paths() {
            let dir = tempfile::tempdir().unwrap();
            fs::create_dir_all(dir.path().join("a/b")).unwrap();
            fs::write(dir.path().join("a/b/x.log"), b"").unwrap();

            let found = search(dir.path(), "a", &GlobSet::new(["*.log"])).unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].path, "a/b/x.log");
        }

        #[test]
        fn queried_folder_is_not_reported_even_when_it_matches() {
            let dir = tempfile::tempdir().unwrap();
            fs::create_dir_all(dir.path().join("logs/logs")).unwrap();

            let found = search(dir.path(), "logs", &GlobSet::new(["logs"])).unwrap();
            let paths: Vec<_> = found.iter().map(|f| f.path.as_str()).collect();
            assert_eq!(paths, vec!["logs/logs"]);
        }

        #[test]
        fn missing_search_root_is_an_error() {
            let dir = tempfile::tempdir().unwrap();
            assert!(search(dir.path(), "nope", &GlobSet::new(["*"])).is_err());
        }

        #[test]
        fn containment() {
            assert!(is_contained(""));
            assert!(is_contained("vm1/logs"));
            assert!(is_contained("./vm1"));
            assert!(!is_contained("../etc"));
            assert!(!is_contained("vm1/../../etc"));
            assert!(!is_contained("/etc"));
        }
    }
}
