//! File-set rule parsing and evaluation (spec §4.B, §4.D).
//!
//! A file-set rule string is an ordered, pipe-delimited AND-conjunction of
//! conditions. Each condition is either `KEY:VALUE`/`KEY=VALUE` (recognised
//! keys: `REGEX`, `TAG`, `NTAG`, `PARENT`, `SIZE_GT`, `SIZE_LT`), the
//! bareword `NO_TAG`, or an unprefixed name glob/regex.

use crate::error::RuleError;
use crate::folder::has_no_invalid_filename_chars;
use crate::size::parse_byte_size;
use globset::{Glob, GlobMatcher};
use regex::Regex;
use std::collections::HashSet;
use std::io;
use std::path::Path;

/// A single condition within a file-set rule's conjunction.
#[derive(Clone, Debug)]
pub enum FileCondition {
    /// Matches the file name against a glob pattern.
    NameGlob(GlobMatcher),
    /// Matches the file name against a regex.
    NameRegex(Regex),
    /// Requires the containing folder to carry the given (uppercased) tag.
    HasTag(String),
    /// Requires the containing folder to *not* carry the given tag.
    NotHasTag(String),
    /// Requires the containing folder to carry no tags at all.
    NoTags,
    /// Matches the containing folder's (lowercased) basename against a
    /// glob pattern.
    ParentNameGlob(GlobMatcher),
    /// Requires the file size to be strictly greater than the given bound.
    SizeGt(u64),
    /// Requires the file size to be less than or equal to the given bound.
    ///
    /// Named `SIZE_LT` in the rule-string syntax for historical reasons;
    /// the comparison itself is `<=`.
    SizeLe(u64),
}

/// An ordered AND-conjunction of [`FileCondition`]s.
#[derive(Clone, Debug)]
pub struct FileRule {
    /// The conditions that must all hold for the rule to match.
    pub conditions: Vec<FileCondition>,
}

/// Parses every rule string in `texts`, skipping (and reporting via
/// `on_warning`) any whose conditions fail to parse.
pub fn parse_file_rules(texts: &[String], mut on_warning: impl FnMut(&str)) -> Vec<FileRule> {
    let mut rules = Vec::new();
    for text in texts {
        match parse_file_rule(text) {
            Ok(rule) => rules.push(rule),
            Err(err) => on_warning(&format!("file filter failed interpretation: {text} ({err})")),
        }
    }
    rules
}

/// Parses a single pipe-delimited file-set rule string into its conjunction
/// of conditions.
pub fn parse_file_rule(text: &str) -> Result<FileRule, RuleError> {
    let mut conditions = Vec::new();
    for raw_part in text.split('|') {
        let part = raw_part.trim();
        if part.is_empty() {
            continue;
        }
        conditions.push(parse_file_condition(part)?);
    }
    Ok(FileRule { conditions })
}

fn parse_file_condition(part: &str) -> Result<FileCondition, RuleError> {
    if part.eq_ignore_ascii_case("NO_TAG") {
        return Ok(FileCondition::NoTags);
    }

    if let Some((key, value)) = split_key_value(part) {
        let value = value.trim();
        return match key.to_ascii_uppercase().as_str() {
            "REGEX" => Regex::new(value)
                .map(FileCondition::NameRegex)
                .map_err(|source| RuleError::InvalidRegex { pattern: value.to_owned(), source }),
            "TAG" => Ok(FileCondition::HasTag(value.to_ascii_uppercase())),
            "NTAG" => Ok(FileCondition::NotHasTag(value.to_ascii_uppercase())),
            "PARENT" => compile_glob(&value.to_ascii_lowercase()).map(FileCondition::ParentNameGlob),
            "SIZE_GT" => parse_byte_size(value).map(FileCondition::SizeGt),
            "SIZE_LT" => parse_byte_size(value).map(FileCondition::SizeLe),
            other => Err(RuleError::UnknownKey(other.to_owned())),
        };
    }

    if has_no_invalid_filename_chars(part) {
        return compile_glob(part).map(FileCondition::NameGlob);
    }

    Regex::new(part)
        .map(FileCondition::NameRegex)
        .map_err(|source| RuleError::InvalidRegex { pattern: part.to_owned(), source })
}

fn compile_glob(pattern: &str) -> Result<GlobMatcher, RuleError> {
    Glob::new(pattern)
        .map(|glob| glob.compile_matcher())
        .map_err(|source| RuleError::InvalidGlob { pattern: pattern.to_owned(), source })
}

/// Splits `part` on the first `:` or `=`, preferring whichever occurs first,
/// only when the left-hand side looks like one of the recognised keys.
fn split_key_value(part: &str) -> Option<(&str, &str)> {
    let colon = part.find(':');
    let equals = part.find('=');
    let at = match (colon, equals) {
        (Some(c), Some(e)) => Some(c.min(e)),
        (Some(c), None) => Some(c),
        (None, Some(e)) => Some(e),
        (None, None) => None,
    }?;
    let key = &part[..at];
    if is_recognised_key(key) {
        Some((key, &part[at + 1..]))
    } else {
        None
    }
}

fn is_recognised_key(key: &str) -> bool {
    matches!(
        key.to_ascii_uppercase().as_str(),
        "REGEX" | "TAG" | "NTAG" | "PARENT" | "SIZE_GT" | "SIZE_LT"
    )
}

/// Evaluates whether every condition in `rule` holds for the given file.
///
/// `size_of` is invoked lazily, at most once, only if a size condition is
/// present, matching the original implementation's deferred `stat` call.
pub fn file_rule_matches(
    rule: &FileRule,
    file_name: &str,
    parent_path: &Path,
    tags: &HashSet<String>,
    mut size_of: impl FnMut() -> io::Result<u64>,
) -> bool {
    let mut cached_size: Option<u64> = None;
    rule.conditions.iter().all(|condition| match condition {
        FileCondition::NameGlob(matcher) => matcher.is_match(file_name),
        FileCondition::NameRegex(regex) => regex.is_match(file_name),
        FileCondition::HasTag(tag) => tags.contains(tag),
        FileCondition::NotHasTag(tag) => !tags.contains(tag),
        FileCondition::NoTags => tags.is_empty(),
        FileCondition::ParentNameGlob(matcher) => parent_path
            .file_name()
            .map(|name| matcher.is_match(name.to_string_lossy().to_lowercase()))
            .unwrap_or(false),
        FileCondition::SizeGt(bound) => {
            if cached_size.is_none() {
                cached_size = size_of().ok();
            }
            cached_size.is_some_and(|size| size > *bound)
        }
        FileCondition::SizeLe(bound) => {
            if cached_size.is_none() {
                cached_size = size_of().ok();
            }
            cached_size.is_some_and(|size| size <= *bound)
        }
    })
}

/// Returns `true` if any rule in `rules` fully matches the given file.
pub fn any_rule_matches(
    rules: &[FileRule],
    file_name: &str,
    parent_path: &Path,
    tags: &HashSet<String>,
    mut size_of: impl FnMut() -> io::Result<u64>,
) -> bool {
    rules
        .iter()
        .any(|rule| file_rule_matches(rule, file_name, parent_path, tags, &mut size_of))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bareword_glob_matches_filename() {
        let rule = parse_file_rule("*.tmp").unwrap();
        assert!(file_rule_matches(&rule, "a.tmp", Path::new("/root"), &HashSet::new(), || Ok(0)));
        assert!(!file_rule_matches(&rule, "a.txt", Path::new("/root"), &HashSet::new(), || Ok(0)));
    }

    #[test]
    fn tag_and_size_conjunction() {
        let rule = parse_file_rule("TAG:PRIV|SIZE_GT:10").unwrap();
        let mut tags = HashSet::new();
        tags.insert("PRIV".to_owned());

        assert!(file_rule_matches(&rule, "x", Path::new("/root"), &tags, || Ok(20)));
        assert!(!file_rule_matches(&rule, "x", Path::new("/root"), &tags, || Ok(5)));
        assert!(!file_rule_matches(&rule, "x", Path::new("/root"), &HashSet::new(), || Ok(20)));
    }

    #[test]
    fn no_tag_bareword() {
        let rule = parse_file_rule("NO_TAG").unwrap();
        assert!(file_rule_matches(&rule, "x", Path::new("/root"), &HashSet::new(), || Ok(0)));
        let mut tags = HashSet::new();
        tags.insert("A".to_owned());
        assert!(!file_rule_matches(&rule, "x", Path::new("/root"), &tags, || Ok(0)));
    }

    #[test]
    fn parent_glob_is_case_insensitive_on_value() {
        let rule = parse_file_rule("PARENT=Build*").unwrap();
        assert!(file_rule_matches(&rule, "x", Path::new("/root/BUILD-1"), &HashSet::new(), || Ok(0)));
    }

    #[test]
    fn invalid_regex_condition_errors() {
        let err = parse_file_rule("REGEX:[unterminated");
        assert!(err.is_err());
    }
}
