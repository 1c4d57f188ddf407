//! Regex-delimited substring extraction.
//!
//! `extract_between` is the slicing primitive the frame resolver and the log
//! parser use to pull structured fields out of free-form lines.

use regex::Regex;

use crate::error::{BlameError, Result};

/// Return the part of `source` lying between a match of `start_pattern` and a
/// following match of `end_pattern`.
///
/// An empty pattern always matches: at the start of the string for
/// `start_pattern`, at its end for `end_pattern`. A non-empty start pattern
/// that fails to match resolves to the start of the string; a non-empty end
/// pattern that fails to match resolves to where its search began, so the
/// result is empty. The end pattern is only searched for after the start
/// match, so delimiter text earlier in `source` is ignored.
///
/// Fails with `NotFound` only when both patterns are non-empty and neither
/// matches.
///
/// With `include_delimiters` the matched delimiters are part of the result.
pub fn extract_between(
    source: &str,
    start_pattern: &str,
    end_pattern: &str,
    include_delimiters: bool,
) -> Result<String> {
    if source.trim().is_empty() {
        return Err(BlameError::InvalidArgument(
            "source text must contain one or more characters".to_string(),
        ));
    }

    if start_pattern.is_empty() && end_pattern.is_empty() {
        return Err(BlameError::InvalidArgument(
            "a start pattern or an end pattern is required".to_string(),
        ));
    }

    let start_regex = compile(start_pattern)?;
    let end_regex = compile(end_pattern)?;

    let start_match = start_regex.as_ref().and_then(|re| re.find(source));

    let (start, search_from) = match start_match {
        Some(m) if include_delimiters => (m.start(), m.end()),
        Some(m) => (m.end(), m.end()),
        None => (0, 0),
    };

    let remainder = &source[search_from..];
    let end_match = end_regex.as_ref().and_then(|re| re.find(remainder));

    let start_matched = start_regex.is_none() || start_match.is_some();
    let end_matched = end_regex.is_none() || end_match.is_some();

    if !start_matched && !end_matched {
        return Err(BlameError::NotFound(format!(
            "no match for start pattern '{}' or end pattern '{}'",
            start_pattern, end_pattern
        )));
    }

    let end = match (&end_regex, end_match) {
        (_, Some(m)) if include_delimiters => search_from + m.end(),
        (_, Some(m)) => search_from + m.start(),
        (None, None) => source.len(),
        (Some(_), None) => search_from,
    };

    Ok(source[start..end].to_string())
}

fn compile(pattern: &str) -> Result<Option<Regex>> {
    if pattern.is_empty() {
        return Ok(None);
    }

    Regex::new(pattern)
        .map(Some)
        .map_err(|e| BlameError::InvalidArgument(format!("invalid pattern '{}': {}", pattern, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_between_both_patterns() {
        let value = extract_between("Author: Ann Lee <ann@example.com>", "Author: ", "<", false).unwrap();
        assert_eq!(value, "Ann Lee ");
    }

    #[test]
    fn test_include_delimiters() {
        let value = extract_between("at Foo() in C:\\root\\src\\Foo.cs:line 12", r"root\\", ":line", true).unwrap();
        assert_eq!(value, "root\\src\\Foo.cs:line");
    }

    #[test]
    fn test_empty_start_means_string_start() {
        let value = extract_between("Program.Main(String[] args) in", "", r"\(", false).unwrap();
        assert_eq!(value, "Program.Main");
    }

    #[test]
    fn test_empty_end_means_string_end() {
        let value = extract_between("commit 0a1b2c3d", "commit ", "", false).unwrap();
        assert_eq!(value, "0a1b2c3d");
    }

    #[test]
    fn test_only_end_present() {
        // the start pattern is absent, so extraction starts at the beginning
        let value = extract_between("alpha beta END gamma", "BEGIN", "END", false).unwrap();
        assert_eq!(value, "alpha beta ");
    }

    #[test]
    fn test_only_start_present() {
        // the end pattern is absent, so nothing after the start is taken
        let value = extract_between("alpha BEGIN beta gamma", "BEGIN", "END", false).unwrap();
        assert_eq!(value, "");

        let value = extract_between("alpha BEGIN beta gamma", "BEGIN", "END", true).unwrap();
        assert_eq!(value, "BEGIN");
    }

    #[test]
    fn test_reapplying_to_remainder_is_stable() {
        let source = "prefix BEGIN payload";
        let first = extract_between(source, "BEGIN", "END", false).unwrap();
        let again = extract_between(&format!("BEGIN{}", first), "BEGIN", "END", false).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_end_searched_after_start() {
        // the ":" before the start marker must not terminate the match
        let value = extract_between("a:b START c:d", "START ", ":", false).unwrap();
        assert_eq!(value, "c");
    }

    #[test]
    fn test_neither_pattern_matches() {
        let err = extract_between("nothing to see", "BEGIN", "END", false).unwrap_err();
        assert!(matches!(err, BlameError::NotFound(_)));
    }

    #[test]
    fn test_empty_start_with_missing_end_is_empty() {
        let value = extract_between("Worker in C:\\root\\a.cs:line 3", "", r"\(", false).unwrap();
        assert_eq!(value, "");
    }

    #[test]
    fn test_missing_start_with_empty_end_is_whole_source() {
        let value = extract_between("abc", "BEGIN", "", false).unwrap();
        assert_eq!(value, "abc");
    }

    #[test]
    fn test_blank_source_rejected() {
        let err = extract_between("   \r\n", "a", "b", false).unwrap_err();
        assert!(matches!(err, BlameError::InvalidArgument(_)));
    }

    #[test]
    fn test_both_patterns_empty_rejected() {
        let err = extract_between("text", "", "", false).unwrap_err();
        assert!(matches!(err, BlameError::InvalidArgument(_)));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let err = extract_between("text", "(", "", false).unwrap_err();
        assert!(matches!(err, BlameError::InvalidArgument(_)));
    }
}
