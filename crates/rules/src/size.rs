//! Byte-size suffix parsing for `SIZE_GT`/`SIZE_LE` file-set conditions.

use crate::error::RuleError;

/// Parses a byte-size string such as `"10"`, `"10B"`, `"10KB"`, `"1.5MB"`
/// into a byte count.
///
/// Suffixes are binary multiples of 1024 (`KB` = 1024 bytes, `MB` =
/// 1024 ^ 2, ... up to `TB`), matching the convention used elsewhere in the
/// workspace for bandwidth-style quantities. Suffixes are case-insensitive
/// and the trailing `B` is optional (`10K` and `10KB` are equivalent).
pub fn parse_byte_size(text: &str) -> Result<u64, RuleError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(RuleError::InvalidSize(text.to_owned()));
    }

    let digits_end = trimmed
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(trimmed.len());
    let (numeric_part, suffix) = trimmed.split_at(digits_end);

    if numeric_part.is_empty() {
        return Err(RuleError::InvalidSize(text.to_owned()));
    }

    let value: f64 = numeric_part
        .parse()
        .map_err(|_| RuleError::InvalidSize(text.to_owned()))?;

    let suffix = suffix.trim().to_ascii_uppercase();
    let suffix = suffix.strip_suffix('B').unwrap_or(&suffix);

    let multiplier: u64 = match suffix {
        "" => 1,
        "K" => 1024,
        "M" => 1024 * 1024,
        "G" => 1024 * 1024 * 1024,
        "T" => 1024 * 1024 * 1024 * 1024,
        _ => return Err(RuleError::InvalidSize(text.to_owned())),
    };

    Ok((value * multiplier as f64).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_bytes() {
        assert_eq!(parse_byte_size("512").unwrap(), 512);
        assert_eq!(parse_byte_size("512B").unwrap(), 512);
    }

    #[test]
    fn parses_binary_suffixes() {
        assert_eq!(parse_byte_size("1KB").unwrap(), 1024);
        assert_eq!(parse_byte_size("1MB").unwrap(), 1024 * 1024);
        assert_eq!(parse_byte_size("2GB").unwrap(), 2 * 1024 * 1024 * 1024);
    }

    #[test]
    fn parses_fractional_values() {
        assert_eq!(parse_byte_size("1.5KB").unwrap(), 1536);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_byte_size("banana").is_err());
        assert!(parse_byte_size("").is_err());
        assert!(parse_byte_size("10XB").is_err());
    }
}
