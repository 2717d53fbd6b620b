//! Error types for template parsing.

/// A template could not be parsed.
///
/// Parsing never guesses: every malformed construct is reported, and the
/// variant tells which one.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("misplaced bracket: `]` without an open `[`")]
    MisplacedBracket,

    #[error("nested bracket: `[` inside an open group")]
    NestedBracket,

    #[error("unterminated bracket: `[` is never closed")]
    UnterminatedBracket,

    /// `{` at the end of input, or followed by anything but a name. An
    /// empty `{}` is reported here rather than as a missing brace.
    #[error("invalid variable token: `{{` must be followed by a variable name")]
    InvalidVariable,

    #[error("missing closing brace after variable `{name}`")]
    MissingClosingBrace { name: String },

    #[error("unterminated quote")]
    UnterminatedQuote,

    #[error("dangling escape at end of input")]
    DanglingEscape,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_case() {
        assert!(ParseError::MisplacedBracket
            .to_string()
            .starts_with("misplaced bracket"));
        assert!(ParseError::NestedBracket
            .to_string()
            .starts_with("nested bracket"));
        assert!(ParseError::UnterminatedBracket
            .to_string()
            .starts_with("unterminated bracket"));
        assert!(ParseError::InvalidVariable
            .to_string()
            .starts_with("invalid variable token"));
    }

    #[test]
    fn missing_brace_mentions_variable() {
        let e = ParseError::MissingClosingBrace {
            name: "device".to_string(),
        };
        let display = format!("{}", e);
        assert!(display.contains("missing closing brace"));
        assert!(display.contains("device"));
    }
}
