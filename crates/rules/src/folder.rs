//! Folder-set rule parsing and evaluation (spec §4.B, §4.C).
//!
//! A folder-set rule string is pipe-delimited: zero or more modifier tokens
//! (`RECURSE`, `NORECURSE`, `TAG=<t>`) plus at most one bare condition. The
//! condition is interpreted, in order, as an existing directory path under
//! the current root, a name glob, a name regex, or (failing all of those) a
//! path-suffix match.

use crate::error::RuleError;
use globset::{Glob, GlobMatcher};
use regex::Regex;
use std::path::{Path, PathBuf};
use vfs::FileSystem;

/// The condition half of a parsed folder-set rule.
#[derive(Clone, Debug)]
pub enum FolderCondition {
    /// Matches a single, specific folder path.
    Path(PathBuf),
    /// Matches the folder's basename against a glob pattern.
    NameGlob(GlobMatcher),
    /// Matches the folder's basename against a regex, falling back to a
    /// path-suffix match (`lastly`) if the regex does not match.
    NameRegex {
        /// The compiled regex.
        regex: Regex,
        /// Lowercased, separator-normalized trailing-path fallback.
        lastly: String,
    },
    /// Matches when the folder's lowercased path ends with this
    /// separator-prefixed suffix.
    PathSuffix(String),
    /// Always matches.
    Always,
}

/// A single parsed folder-set rule: a condition plus its recursion and
/// tagging modifiers.
#[derive(Clone, Debug)]
pub struct FolderRule {
    /// The condition that must match a folder path.
    pub condition: FolderCondition,
    /// Whether a match also selects every descendant folder and halts
    /// further rule evaluation within that subtree.
    pub recurse: bool,
    /// An optional, already-uppercased tag to apply on match.
    pub tag: Option<String>,
}

/// Parses every rule string in `texts`, skipping (and reporting via
/// `on_warning`) any that fail to parse, per spec §4.B/§7.2: a rule-parse
/// failure is a warning, not a hard error, and processing continues.
pub fn parse_folder_rules(
    texts: &[String],
    root: &Path,
    fs: &dyn FileSystem,
    mut on_warning: impl FnMut(&str),
) -> Vec<FolderRule> {
    let mut rules = Vec::new();
    for text in texts {
        match parse_folder_rule(text, root, fs) {
            Ok(rule) => rules.push(rule),
            Err(err) => on_warning(&format!("folder filter failed interpretation: {text} ({err})")),
        }
    }
    rules
}

/// Parses a single pipe-delimited folder-set rule string.
pub fn parse_folder_rule(text: &str, root: &Path, fs: &dyn FileSystem) -> Result<FolderRule, RuleError> {
    let mut recurse = true;
    let mut tag: Option<String> = None;
    let mut condition_text: Option<&str> = None;

    for raw_part in text.split('|') {
        let part = raw_part.trim();
        if part.is_empty() {
            continue;
        }
        let upper = part.to_ascii_uppercase();
        if upper == "RECURSE" {
            recurse = true;
        } else if upper == "NORECURSE" {
            recurse = false;
        } else if let Some(t) = upper.strip_prefix("TAG=") {
            if !t.is_empty() {
                tag = Some(t.to_owned());
            }
        } else if condition_text.is_none() {
            condition_text = Some(part);
        } else {
            return Err(RuleError::MultipleConditions(text.to_owned()));
        }
    }

    let condition = match condition_text {
        Some(cond) => interpret_folder_condition(cond, root, fs)?,
        None if tag.is_some() => FolderCondition::Always,
        None => return Err(RuleError::NoCondition(text.to_owned())),
    };

    Ok(FolderRule { condition, recurse, tag })
}

fn interpret_folder_condition(cond: &str, root: &Path, fs: &dyn FileSystem) -> Result<FolderCondition, RuleError> {
    if cond.contains('/') || cond.contains('\\') {
        let candidate = if Path::new(cond).is_absolute() {
            PathBuf::from(cond)
        } else {
            root.join(cond)
        };
        if let Ok(normalized) = path_util::normalize(&candidate) {
            let within_root = normalized == root || path_util::is_under(root, &normalized, false);
            if fs.is_dir(&normalized) && within_root {
                return Ok(FolderCondition::Path(normalized));
            }
        }
    }

    if has_no_invalid_filename_chars(cond) {
        let matcher = Glob::new(cond)
            .map_err(|source| RuleError::InvalidGlob { pattern: cond.to_owned(), source })?
            .compile_matcher();
        return Ok(FolderCondition::NameGlob(matcher));
    }

    let lastly = to_lastly(cond);
    match Regex::new(cond) {
        Ok(regex) => Ok(FolderCondition::NameRegex { regex, lastly }),
        Err(_) => Ok(FolderCondition::PathSuffix(lastly)),
    }
}

/// Returns `true` if `text` contains none of the characters treated as
/// invalid in a filename (`<>:"/\|` and ASCII control characters).
pub(crate) fn has_no_invalid_filename_chars(text: &str) -> bool {
    !text.chars().any(|c| matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|') || c_is_control(c))
}

fn c_is_control(c: char) -> bool {
    (c as u32) < 0x20
}

fn to_lastly(cond: &str) -> String {
    let normalized = cond.replace('\\', "/").to_lowercase();
    if normalized.starts_with('/') {
        normalized
    } else {
        format!("/{normalized}")
    }
}

fn path_ends_with_lastly(folder_path: &Path, lastly: &str) -> bool {
    let normalized = folder_path.to_string_lossy().replace('\\', "/").to_lowercase();
    normalized.ends_with(lastly)
}

/// Returns whether `condition` matches `folder_path`.
#[must_use]
pub fn folder_condition_matches(condition: &FolderCondition, folder_path: &Path) -> bool {
    match condition {
        FolderCondition::Always => true,
        FolderCondition::Path(path) => path == folder_path,
        FolderCondition::NameGlob(matcher) => folder_path
            .file_name()
            .map(|name| matcher.is_match(name))
            .unwrap_or(false),
        FolderCondition::NameRegex { regex, lastly } => {
            let name = folder_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            regex.is_match(name) || path_ends_with_lastly(folder_path, lastly)
        }
        FolderCondition::PathSuffix(lastly) => path_ends_with_lastly(folder_path, lastly),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfs::memory::MemoryFileSystem;

    #[test]
    fn parses_recurse_and_tag_modifiers() {
        let fs = MemoryFileSystem::new();
        let rule = parse_folder_rule("venv|NORECURSE|TAG=skip", Path::new("/root"), &fs).unwrap();
        assert!(!rule.recurse);
        assert_eq!(rule.tag.as_deref(), Some("SKIP"));
        assert!(matches!(rule.condition, FolderCondition::NameGlob(_)));
    }

    #[test]
    fn tag_only_rule_is_always_condition() {
        let fs = MemoryFileSystem::new();
        let rule = parse_folder_rule("TAG=all", Path::new("/root"), &fs).unwrap();
        assert!(matches!(rule.condition, FolderCondition::Always));
    }

    #[test]
    fn multiple_conditions_is_an_error() {
        let fs = MemoryFileSystem::new();
        let err = parse_folder_rule("venv|other", Path::new("/root"), &fs);
        assert!(err.is_err());
    }

    #[test]
    fn existing_directory_under_root_is_a_path_condition() {
        let fs = MemoryFileSystem::new().with_dir("/root/sub/dir");
        let rule = parse_folder_rule("sub/dir", Path::new("/root"), &fs).unwrap();
        assert!(matches!(rule.condition, FolderCondition::Path(_)));
        assert!(folder_condition_matches(&rule.condition, Path::new("/root/sub/dir")));
    }

    #[test]
    fn regex_falls_back_to_lastly_suffix() {
        let fs = MemoryFileSystem::new();
        let rule = parse_folder_rule(r"\d+-build", Path::new("/root"), &fs).unwrap();
        match &rule.condition {
            FolderCondition::NameRegex { .. } => {}
            other => panic!("expected regex condition, got {other:?}"),
        }
        assert!(folder_condition_matches(&rule.condition, Path::new("/root/12-build")));
    }
}
