use std::fmt;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("malformed template at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: &'static str },

    #[error("template is missing the {{{0}}} placeholder")]
    MissingPlaceholder(String),

    #[error("template contains unexpected placeholder {{{0}}}")]
    UnexpectedPlaceholder(String),

    #[error("no value supplied for placeholder {{{0}}}")]
    MissingValue(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Placeholder(String),
}

/// A text skeleton with `{name}` placeholders. `{{` and `}}` are literal
/// braces. Substituted values are inserted verbatim and never re-parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            match c {
                '{' => {
                    if chars.next_if(|&(_, next)| next == '{').is_some() {
                        literal.push('{');
                        continue;
                    }

                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some((_, '}')) => break,
                            Some((_, ch)) if ch.is_ascii_alphanumeric() || ch == '_' => {
                                name.push(ch)
                            }
                            Some(_) => {
                                return Err(TemplateError::Malformed {
                                    offset,
                                    reason: "invalid character in placeholder name",
                                });
                            }
                            None => {
                                return Err(TemplateError::Malformed {
                                    offset,
                                    reason: "unclosed placeholder",
                                });
                            }
                        }
                    }

                    if name.is_empty() {
                        return Err(TemplateError::Malformed {
                            offset,
                            reason: "empty placeholder name",
                        });
                    }

                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Placeholder(name));
                }
                '}' => {
                    if chars.next_if(|&(_, next)| next == '}').is_some() {
                        literal.push('}');
                    } else {
                        return Err(TemplateError::Malformed {
                            offset,
                            reason: "unmatched '}'",
                        });
                    }
                }
                _ => literal.push(c),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self { segments })
    }

    /// Placeholder names in order of appearance, duplicates included.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Placeholder(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Checks that the template uses every name in `names` and nothing else.
    pub fn require_placeholders(&self, names: &[&str]) -> Result<(), TemplateError> {
        if let Some(extra) = self.placeholders().find(|p| !names.contains(p)) {
            return Err(TemplateError::UnexpectedPlaceholder(extra.to_string()));
        }

        if let Some(missing) = names
            .iter()
            .find(|name| !self.placeholders().any(|p| p == **name))
        {
            return Err(TemplateError::MissingPlaceholder(missing.to_string()));
        }

        Ok(())
    }

    pub fn render(&self, values: &[(&str, &str)]) -> Result<String, TemplateError> {
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Placeholder(name) => {
                    let value = values
                        .iter()
                        .find(|(key, _)| key == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| TemplateError::MissingValue(name.clone()))?;
                    out.push_str(value);
                }
            }
        }

        Ok(out)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => {
                    write!(f, "{}", text.replace('{', "{{").replace('}', "}}"))?
                }
                Segment::Placeholder(name) => write!(f, "{{{name}}}")?,
            }
        }
        Ok(())
    }
}
