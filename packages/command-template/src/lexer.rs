//! Shell-style tokenizer for command templates.
//!
//! Quoting follows POSIX shell rules. Unquoted `[`, `]`, `{` and `}` are
//! punctuation: each is its own token and ends the word before it.

use std::iter::Peekable;
use std::str::Chars;

use crate::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Word(String),
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
}

pub(crate) struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
}

impl<'a> Lexer<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self {
            chars: source.chars().peekable(),
        }
    }

    fn punctuation(c: char) -> Option<Token> {
        match c {
            '[' => Some(Token::OpenBracket),
            ']' => Some(Token::CloseBracket),
            '{' => Some(Token::OpenBrace),
            '}' => Some(Token::CloseBrace),
            _ => None,
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|c| c.is_whitespace()).is_some() {}
    }

    fn read_word(&mut self) -> Result<String, ParseError> {
        let mut word = String::new();

        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() || Self::punctuation(c).is_some() {
                break;
            }
            self.chars.next();

            match c {
                '\'' => self.read_single_quoted(&mut word)?,
                '"' => self.read_double_quoted(&mut word)?,
                '\\' => match self.chars.next() {
                    None => return Err(ParseError::DanglingEscape),
                    // Line continuation.
                    Some('\n') => {}
                    Some(escaped) => word.push(escaped),
                },
                _ => word.push(c),
            }
        }

        Ok(word)
    }

    fn read_single_quoted(&mut self, word: &mut String) -> Result<(), ParseError> {
        loop {
            match self.chars.next() {
                None => return Err(ParseError::UnterminatedQuote),
                Some('\'') => return Ok(()),
                Some(c) => word.push(c),
            }
        }
    }

    fn read_double_quoted(&mut self, word: &mut String) -> Result<(), ParseError> {
        loop {
            match self.chars.next() {
                None => return Err(ParseError::UnterminatedQuote),
                Some('"') => return Ok(()),
                Some('\\') => match self.chars.peek() {
                    Some('\n') => {
                        self.chars.next();
                    }
                    Some(&escaped) if matches!(escaped, '\\' | '"' | '$' | '`') => {
                        self.chars.next();
                        word.push(escaped);
                    }
                    _ => word.push('\\'),
                },
                Some(c) => word.push(c),
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Result<Token, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.skip_whitespace();

        let &c = self.chars.peek()?;
        if let Some(token) = Self::punctuation(c) {
            self.chars.next();
            return Some(Ok(token));
        }

        Some(self.read_word().map(Token::Word))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(source: &str) -> Result<Vec<Token>, ParseError> {
        Lexer::new(source).collect()
    }

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(
            tokens("  mount\t-t  fuse\n").unwrap(),
            vec![word("mount"), word("-t"), word("fuse")]
        );
    }

    #[test]
    fn punctuation_ends_words() {
        assert_eq!(
            tokens("-o{opts}[x]").unwrap(),
            vec![
                word("-o"),
                Token::OpenBrace,
                word("opts"),
                Token::CloseBrace,
                Token::OpenBracket,
                word("x"),
                Token::CloseBracket,
            ]
        );
    }

    #[test]
    fn quotes_join_into_one_word() {
        assert_eq!(
            tokens(r#"'a b'"c d"e"#).unwrap(),
            vec![word("a bc de")]
        );
    }

    #[test]
    fn quoted_punctuation_is_literal() {
        assert_eq!(
            tokens(r#"'[{x}]' "]" \{"#).unwrap(),
            vec![word("[{x}]"), word("]"), word("{")]
        );
    }

    #[test]
    fn empty_quotes_make_an_empty_word() {
        assert_eq!(tokens("a '' b").unwrap(), vec![word("a"), word(""), word("b")]);
    }

    #[test]
    fn double_quote_escapes() {
        assert_eq!(
            tokens(r#""\"\$\\\n""#).unwrap(),
            vec![word(r#""$\\n"#)]
        );
    }

    #[test]
    fn single_quotes_keep_backslashes() {
        assert_eq!(tokens(r"'a\b'").unwrap(), vec![word(r"a\b")]);
    }

    #[test]
    fn unterminated_quote_fails() {
        assert_eq!(tokens("'abc"), Err(ParseError::UnterminatedQuote));
        assert_eq!(tokens("\"abc"), Err(ParseError::UnterminatedQuote));
    }

    #[test]
    fn trailing_backslash_fails() {
        assert_eq!(tokens("abc\\"), Err(ParseError::DanglingEscape));
    }
}
