//! Small string helpers shared by the document and the selector engine

use crate::error::{DomError, Result};

/// ASCII whitespace as defined by the HTML standard
pub fn is_html_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\x0C' | '\r')
}

/// Split a `class` attribute into its tokens (duplicates dropped, order kept)
pub fn class_tokens(class_attr: Option<&str>) -> Vec<String> {
    let mut tokens: Vec<String> = Vec::new();
    for token in class_attr.unwrap_or("").split(is_html_whitespace) {
        if !token.is_empty() && !tokens.iter().any(|t| t == token) {
            tokens.push(token.to_string());
        }
    }
    tokens
}

/// Validate a token for `classList` mutation
pub fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(DomError::InvalidToken {
            token: token.to_string(),
            reason: "the token must not be empty",
        });
    }
    if token.chars().any(is_html_whitespace) {
        return Err(DomError::InvalidToken {
            token: token.to_string(),
            reason: "the token must not contain whitespace",
        });
    }
    Ok(())
}

/// Validate a name passed to `createElement`
pub fn validate_element_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let valid_rest = chars.all(|c| {
        !is_html_whitespace(c) && !matches!(c, '\0' | '/' | '>' | '<' | '=' | '"' | '\'')
    });
    if valid_start && valid_rest {
        Ok(())
    } else {
        Err(DomError::InvalidCharacter(name.to_string()))
    }
}

/// Validate a name passed to `setAttribute`
pub fn validate_attribute_name(name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name.chars().any(|c| {
            is_html_whitespace(c) || matches!(c, '\0' | '/' | '>' | '<' | '=' | '"' | '\'')
        });
    if invalid {
        Err(DomError::InvalidCharacter(name.to_string()))
    } else {
        Ok(())
    }
}

/// Strip and collapse ASCII whitespace runs to single spaces
pub fn collapse_whitespace(text: &str) -> String {
    text.split(is_html_whitespace)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse an inline `style` attribute into ordered declarations
pub fn parse_style_declarations(style_attr: Option<&str>) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for raw in style_attr.unwrap_or("").split(';') {
        let Some((name, value)) = raw.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        if name.is_empty() || value.is_empty() {
            continue;
        }
        match out.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value.to_string(),
            None => out.push((name, value.to_string())),
        }
    }
    out
}

pub fn serialize_style_declarations(decls: &[(String, String)]) -> String {
    decls
        .iter()
        .map(|(name, value)| format!("{}: {};", name, value))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_tokens() {
        assert_eq!(class_tokens(Some("  a b\ta  c ")), vec!["a", "b", "c"]);
        assert!(class_tokens(None).is_empty());
    }

    #[test]
    fn test_validate_token() {
        assert!(validate_token("ok").is_ok());
        assert!(validate_token("").is_err());
        assert!(validate_token("a b").is_err());
    }

    #[test]
    fn test_validate_element_name() {
        assert!(validate_element_name("div").is_ok());
        assert!(validate_element_name("my-widget").is_ok());
        assert!(validate_element_name("").is_err());
        assert!(validate_element_name("1div").is_err());
        assert!(validate_element_name("di v").is_err());
        assert!(validate_element_name("<div>").is_err());

        assert!(validate_attribute_name("data-x").is_ok());
        assert!(validate_attribute_name("_private").is_ok());
        assert!(validate_attribute_name("").is_err());
        assert!(validate_attribute_name("a=b").is_err());
    }

    #[test]
    fn test_style_round_trip() {
        let decls = parse_style_declarations(Some("color: red; DISPLAY:none;;bogus"));
        assert_eq!(
            decls,
            vec![
                ("color".to_string(), "red".to_string()),
                ("display".to_string(), "none".to_string())
            ]
        );
        assert_eq!(
            serialize_style_declarations(&decls),
            "color: red; display: none;"
        );
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  Hello \n  world "), "Hello world");
        assert_eq!(collapse_whitespace("   "), "");
    }
}
