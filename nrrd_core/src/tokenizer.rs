//! Regex-driven line splitting.
//!
//! A [`Tokenizer`] splits text on every non-overlapping match of a delimiter
//! pattern and optionally maps each piece through a fallible conversion.
//! Header lines use [`field_tokenizer`] (`key : value`), the size list and the
//! text payload use [`whitespace_tokenizer`].

use std::sync::OnceLock;

use regex::Regex;

use crate::error::{NrrdError, Result};

static FIELD_PATTERN: OnceLock<Tokenizer> = OnceLock::new();
static WHITESPACE_PATTERN: OnceLock<Tokenizer> = OnceLock::new();

/// Splits on `:` with optional surrounding whitespace.
pub fn field_tokenizer() -> &'static Tokenizer {
    FIELD_PATTERN.get_or_init(|| Tokenizer::new(r"\s*:\s*").expect("Invalid field regex pattern"))
}

/// Splits on runs of whitespace, newlines included.
pub fn whitespace_tokenizer() -> &'static Tokenizer {
    WHITESPACE_PATTERN.get_or_init(|| Tokenizer::new(r"\s+").expect("Invalid whitespace regex pattern"))
}

#[derive(Debug, Clone)]
pub struct Tokenizer {
    delimiter: Regex,
}

impl Tokenizer {
    /// Compile a tokenizer from a delimiter pattern.
    pub fn new(pattern: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            delimiter: Regex::new(pattern)?,
        })
    }

    /// Split `line` into owned substrings. Empty input yields no tokens.
    pub fn split(&self, line: &str) -> Vec<String> {
        if line.is_empty() {
            return Vec::new();
        }
        self.delimiter.split(line).map(str::to_owned).collect()
    }

    /// Split `line` and convert every token with `convert`.
    ///
    /// The first token `convert` rejects aborts the whole split with
    /// [`NrrdError::MalformedToken`]; no partially converted sequence escapes.
    pub fn split_with<T, E, F>(&self, line: &str, mut convert: F) -> Result<Vec<T>>
    where
        F: FnMut(&str) -> std::result::Result<T, E>,
    {
        if line.is_empty() {
            return Ok(Vec::new());
        }
        self.delimiter
            .split(line)
            .map(|token| convert(token).map_err(|_| NrrdError::MalformedToken(token.to_owned())))
            .collect()
    }

    /// Convert at most `limit` non-empty tokens of `text`, ignoring the rest.
    ///
    /// Leading and trailing delimiters produce empty pieces; those are skipped
    /// so that surrounding whitespace never counts as a token. The caller
    /// compares the returned length against `limit` to detect short input.
    pub fn take_with<T, E, F>(&self, text: &str, limit: usize, mut convert: F) -> Result<Vec<T>>
    where
        F: FnMut(&str) -> std::result::Result<T, E>,
    {
        self.delimiter
            .split(text)
            .filter(|token| !token.is_empty())
            .take(limit)
            .map(|token| convert(token).map_err(|_| NrrdError::MalformedToken(token.to_owned())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_split_tolerates_whitespace() {
        let tokens = field_tokenizer().split("type   :  unsigned char");
        assert_eq!(tokens, vec!["type".to_string(), "unsigned char".to_string()]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(whitespace_tokenizer().split("").is_empty());
        let parsed: Vec<u32> = whitespace_tokenizer().split_with("", str::parse).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_split_with_integer_conversion() {
        let sizes: Vec<usize> = whitespace_tokenizer().split_with("3 64 48", str::parse).unwrap();
        assert_eq!(sizes, vec![3, 64, 48]);
    }

    #[test]
    fn test_failed_conversion_is_malformed_token() {
        let result: Result<Vec<usize>> = whitespace_tokenizer().split_with("3 x4 48", str::parse);
        match result {
            Err(NrrdError::MalformedToken(token)) => assert_eq!(token, "x4"),
            other => panic!("expected MalformedToken, got {:?}", other),
        }
    }

    #[test]
    fn test_take_with_stops_at_limit() {
        let values: Vec<i16> = whitespace_tokenizer()
            .take_with("\n  1 2\n\t3   4 junk\n", 4, str::parse)
            .unwrap();
        assert_eq!(values, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_custom_pattern() {
        let comma = Tokenizer::new(r"\s*,\s*").unwrap();
        assert_eq!(comma.split("a , b,c"), vec!["a", "b", "c"]);
    }
}
