//! Message templates.
//!
//! A template is text with named holes: `"Served {Count} forecasts for {City}"`.
//! Holes may carry a capture hint (`{@Order}`, `{$Order}`), an alignment
//! (`{Name,10}`) or a format (`{Elapsed:0.00}`); hints, alignment and format
//! are accepted but rendering only uses the name. `{{` and `}}` are literal
//! braces. Anything that does not parse as a hole stays literal text.

use serde_json::{Map, Value};

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Text(String),
    Hole { name: String, raw: String },
}

/// A parsed message template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    tokens: Vec<Token>,
}

impl MessageTemplate {
    pub fn parse(template: &str) -> Self {
        let mut tokens = Vec::new();
        let mut text = String::new();
        let mut rest = template;

        while let Some(c) = rest.chars().next() {
            match c {
                '{' if rest.starts_with("{{") => {
                    text.push('{');
                    rest = &rest[2..];
                }
                '}' if rest.starts_with("}}") => {
                    text.push('}');
                    rest = &rest[2..];
                }
                '{' => {
                    let (consumed, name) = scan_hole(rest);
                    match name {
                        Some(name) => {
                            if !text.is_empty() {
                                tokens.push(Token::Text(std::mem::take(&mut text)));
                            }
                            tokens.push(Token::Hole {
                                name: name.to_string(),
                                raw: rest[..consumed].to_string(),
                            });
                        }
                        None => text.push_str(&rest[..consumed]),
                    }
                    rest = &rest[consumed..];
                }
                _ => {
                    text.push(c);
                    rest = &rest[c.len_utf8()..];
                }
            }
        }
        if !text.is_empty() {
            tokens.push(Token::Text(text));
        }

        Self { tokens }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Hole names in order of first appearance, without duplicates.
    pub fn hole_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for token in &self.tokens {
            if let Token::Hole { name, .. } = token {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Substitute property values into the holes.
    ///
    /// Unbound holes are written back verbatim.
    pub fn render(&self, properties: &Map<String, Value>) -> String {
        let mut out = String::new();
        for token in &self.tokens {
            match token {
                Token::Text(text) => out.push_str(text),
                Token::Hole { name, raw } => match properties.get(name) {
                    Some(value) => render_value(value, &mut out),
                    None => out.push_str(raw),
                },
            }
        }
        out
    }
}

/// Render a property value for a message: strings bare, everything else as JSON.
pub fn render_value(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => out.push_str(s),
        other => out.push_str(&other.to_string()),
    }
}

/// Scan a hole starting at the `{` that opens `s`.
///
/// Returns the bytes consumed and the hole's name when it is well formed.
/// A malformed hole consumes only its valid prefix, so scanning resumes at
/// the first offending character and a later hole is still found.
fn scan_hole(s: &str) -> (usize, Option<&str>) {
    let start = 1 + usize::from(s[1..].starts_with(['@', '$']));
    let name_end = s[start..]
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .map_or(s.len(), |i| start + i);
    let tag_end = if s[name_end..].starts_with([',', ':']) {
        s[name_end..].find(['{', '}']).map_or(s.len(), |i| name_end + i)
    } else {
        name_end
    };

    if name_end > start && s[tag_end..].starts_with('}') {
        (tag_end + 1, Some(&s[start..name_end]))
    } else {
        (tag_end, None)
    }
}
