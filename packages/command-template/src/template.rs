//! Template parsing and expansion.

use std::fmt;
use std::str::FromStr;

use crate::lexer::{Lexer, Token};
use crate::{ParseError, Variables};

/// A plain word or a `{name}` substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Part {
    Literal(String),
    Variable(String),
}

impl Part {
    /// Candidate values for this part.
    ///
    /// A variable holding newlines is a list of values; an empty or missing
    /// variable has no values at all.
    fn values<V: Variables + ?Sized>(&self, vars: &V) -> Vec<String> {
        match self {
            Part::Literal(word) => vec![word.clone()],
            Part::Variable(name) => match vars.lookup(name) {
                None | Some("") => Vec::new(),
                Some(value) => value.split('\n').map(str::to_owned).collect(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Part(Part),
    /// `[...]`: never nested, so a group only holds parts.
    Group(Vec<Part>),
}

/// A parsed command template.
///
/// Parsing validates the whole template up front; expansion can then never
/// fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl CommandTemplate {
    /// Parse a template string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use easyfuse_command_template::{CommandTemplate, ParseError};
    ///
    /// assert!(CommandTemplate::parse("umount {target}").is_ok());
    /// assert_eq!(
    ///     CommandTemplate::parse("cmd [tag"),
    ///     Err(ParseError::UnterminatedBracket),
    /// );
    /// ```
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let mut segments = Vec::new();
        let mut group: Option<Vec<Part>> = None;

        while let Some(token) = lexer.next().transpose()? {
            let part = match token {
                Token::OpenBracket => {
                    if group.is_some() {
                        return Err(ParseError::NestedBracket);
                    }
                    group = Some(Vec::new());
                    continue;
                }
                Token::CloseBracket => {
                    let parts = group.take().ok_or(ParseError::MisplacedBracket)?;
                    segments.push(Segment::Group(parts));
                    continue;
                }
                Token::OpenBrace => {
                    let name = match lexer.next().transpose()? {
                        Some(Token::Word(name)) => name,
                        _ => return Err(ParseError::InvalidVariable),
                    };
                    match lexer.next().transpose()? {
                        Some(Token::CloseBrace) => Part::Variable(name),
                        _ => return Err(ParseError::MissingClosingBrace { name }),
                    }
                }
                // A lone closing brace has no special meaning.
                Token::CloseBrace => Part::Literal("}".to_string()),
                Token::Word(word) => Part::Literal(word),
            };

            match group.as_mut() {
                Some(parts) => parts.push(part),
                None => segments.push(Segment::Part(part)),
            }
        }

        if group.is_some() {
            return Err(ParseError::UnterminatedBracket);
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// The template text this was parsed from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of all variables referenced by the template, in order of first use.
    pub fn variables(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        let parts = self.segments.iter().flat_map(|segment| match segment {
            Segment::Part(part) => std::slice::from_ref(part),
            Segment::Group(parts) => parts.as_slice(),
        });
        for part in parts {
            if let Part::Variable(name) = part {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Expand the template into an argv list.
    ///
    /// Outside a group, every value of a variable is appended in place.
    /// A group contributes the Cartesian product of its parts' values, one
    /// full copy of the group per combination; if any part of the group has
    /// no values the group contributes nothing.
    pub fn expand<V: Variables + ?Sized>(&self, vars: &V) -> Vec<String> {
        let mut argv = Vec::new();
        for segment in &self.segments {
            match segment {
                Segment::Part(part) => argv.extend(part.values(vars)),
                Segment::Group(parts) => {
                    let slots: Vec<Vec<String>> =
                        parts.iter().map(|part| part.values(vars)).collect();
                    push_product(&slots, &mut argv);
                }
            }
        }
        argv
    }
}

/// Append every combination of `slots`, leftmost slot varying slowest.
fn push_product(slots: &[Vec<String>], argv: &mut Vec<String>) {
    if slots.iter().any(Vec::is_empty) {
        return;
    }

    let mut indices = vec![0; slots.len()];
    loop {
        argv.extend(
            indices
                .iter()
                .zip(slots)
                .map(|(&i, values)| values[i].clone()),
        );

        let mut position = slots.len();
        loop {
            if position == 0 {
                return;
            }
            position -= 1;
            indices[position] += 1;
            if indices[position] < slots[position].len() {
                break;
            }
            indices[position] = 0;
        }
    }
}

impl FromStr for CommandTemplate {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Parse `template` and expand it against `vars` in one step.
pub fn expand<V: Variables + ?Sized>(
    template: &str,
    vars: &V,
) -> Result<Vec<String>, ParseError> {
    Ok(CommandTemplate::parse(template)?.expand(vars))
}
