use std::fmt::{self, Display, Formatter};

use crate::errors::HandlerError;

/// An element's `style` attribute as an ordered property list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct InlineStyle {
    declarations: Vec<(String, String)>,
    trailing_semicolon: bool,
}

impl InlineStyle {
    /// Splits on semicolons outside quotes and parentheses. A repeated
    /// property keeps its first position and takes the last value.
    pub(crate) fn parse(text: &str, tag: &str) -> Result<Self, HandlerError> {
        let mut style = Self {
            declarations: Vec::new(),
            trailing_semicolon: text.trim_end().ends_with(';'),
        };

        let bytes = text.as_bytes();
        let mut quote: Option<u8> = None;
        let mut depth = 0usize;
        let mut start = 0;
        let mut i = 0;

        while i < bytes.len() {
            let byte = bytes[i];
            match (quote, byte) {
                (Some(_), b'\\') => i += 1,
                (Some(q), _) if byte == q => quote = None,
                (Some(_), _) => {}
                (None, b'\'' | b'"') => quote = Some(byte),
                (None, b'(') => depth += 1,
                (None, b')') => depth = depth.saturating_sub(1),
                (None, b';') if depth == 0 => {
                    style.push_declaration(&text[start..i], tag)?;
                    start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }

        if quote.is_some() {
            return Err(unterminated(tag, "string"));
        }
        if depth > 0 {
            return Err(unterminated(tag, "parenthesis"));
        }
        style.push_declaration(&text[start..], tag)?;

        Ok(style)
    }

    fn push_declaration(&mut self, raw: &str, tag: &str) -> Result<(), HandlerError> {
        let declaration = raw.trim();
        if declaration.is_empty() {
            return Ok(());
        }

        let malformed = || HandlerError::MalformedStyle {
            tag: tag.to_string(),
            declaration: declaration.to_string(),
        };
        let (name, value) = declaration.split_once(':').ok_or_else(malformed)?;
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            return Err(malformed());
        }

        self.set(name, value);
        Ok(())
    }

    /// Overwrites in place, or appends a new declaration.
    pub(crate) fn set(&mut self, property: &str, value: &str) {
        let property = normalize(property);
        match self
            .declarations
            .iter_mut()
            .find(|(name, _)| *name == property)
        {
            Some((_, existing)) => value.clone_into(existing),
            None => self.declarations.push((property, value.to_string())),
        }
    }

    pub(crate) fn remove(&mut self, property: &str) -> bool {
        let property = normalize(property);
        let before = self.declarations.len();
        self.declarations.retain(|(name, _)| *name != property);
        self.declarations.len() != before
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

impl Display for InlineStyle {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (position, (name, value)) in self.declarations.iter().enumerate() {
            if position > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{name}: {value}")?;
        }
        if self.trailing_semicolon && !self.is_empty() {
            f.write_str(";")?;
        }
        Ok(())
    }
}

/// Property names are case-insensitive except for custom properties.
fn normalize(property: &str) -> String {
    let property = property.trim();
    if property.starts_with("--") {
        property.to_string()
    } else {
        property.to_ascii_lowercase()
    }
}

fn unterminated(tag: &str, what: &'static str) -> HandlerError {
    HandlerError::UnterminatedStyle {
        tag: tag.to_string(),
        what,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> InlineStyle {
        InlineStyle::parse(text, "div").unwrap()
    }

    #[test]
    fn keeps_order_and_trailing_semicolon() {
        let mut style = parse("color: red; margin: 0;");
        style.set("color", "blue");
        assert_eq!(style.to_string(), "color: blue; margin: 0;");

        let mut style = parse("color:red");
        style.set("padding", "4px");
        assert_eq!(style.to_string(), "color: red; padding: 4px");
    }

    #[test]
    fn duplicates_keep_first_position_and_last_value() {
        let style = parse("color: red; margin: 0; COLOR: green");
        assert_eq!(style.to_string(), "color: green; margin: 0");
    }

    #[test]
    fn separators_inside_urls_and_strings_are_kept() {
        let mut style =
            parse(r#"background: url("a;b.png"); content: 'x;y'; grid: repeat(2, 1fr)"#);
        assert_eq!(style.declarations.len(), 3);
        style.set("Grid", "none");
        assert_eq!(
            style.to_string(),
            r#"background: url("a;b.png"); content: 'x;y'; grid: none"#
        );
    }

    #[test]
    fn custom_properties_are_case_sensitive() {
        let style = parse("--Accent: red; --accent: blue");
        assert_eq!(style.to_string(), "--Accent: red; --accent: blue");
    }

    #[test]
    fn removing_the_last_declaration_empties_the_style() {
        let mut style = parse("display: none;");
        assert!(style.remove("display"));
        assert!(!style.remove("display"));
        assert!(style.is_empty());
        assert_eq!(style.to_string(), "");
    }

    #[test]
    fn blank_and_empty_input() {
        assert!(parse("").is_empty());
        assert!(parse(" ; ;").is_empty());
    }

    #[test]
    fn malformed_declarations_are_errors() {
        assert_eq!(
            InlineStyle::parse("color red", "p"),
            Err(HandlerError::MalformedStyle {
                tag: "p".into(),
                declaration: "color red".into()
            })
        );
        assert!(InlineStyle::parse("color:", "p").is_err());
        assert!(InlineStyle::parse(": red", "p").is_err());
        assert_eq!(
            InlineStyle::parse("content: 'open", "p"),
            Err(HandlerError::UnterminatedStyle {
                tag: "p".into(),
                what: "string"
            })
        );
        assert!(InlineStyle::parse("width: calc(1px + 2px", "p").is_err());
    }
}
