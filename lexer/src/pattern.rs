use std::fmt;

use regex::Regex;

/// A condition on a whole attribute value or text span.
///
/// Every pattern must match its input completely, a regular expression
/// matching only part of the input does not count.
///
/// ```
/// # use xml_lexer::Pattern;
/// assert!(Pattern::literal("Hello").matches("Hello"));
/// assert!(!Pattern::literal("Hello").matches("hello"));
/// assert!(Pattern::ignore_case("Hello").matches("hELLO"));
/// assert!(Pattern::regex(r"chapter\d+").unwrap().matches("chapter12"));
/// assert!(!Pattern::regex(r"chapter\d+").unwrap().matches("chapter12.xhtml"));
/// ```
#[derive(Debug, Clone)]
pub struct Pattern(Kind);

#[derive(Debug, Clone)]
enum Kind {
    Literal(String),
    /// ASCII case-insensitive literal.
    IgnoreCase(String),
    /// Anchored at both ends.
    Regex(Regex),
}

impl Pattern {
    pub fn literal(value: impl Into<String>) -> Self {
        Pattern(Kind::Literal(value.into()))
    }

    pub fn ignore_case(value: impl Into<String>) -> Self {
        Pattern(Kind::IgnoreCase(value.into()))
    }

    /// Compiles a regular expression in `regex` crate syntax. Inline flags
    /// such as `(?i)` work as usual.
    pub fn regex(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Pattern(Kind::Regex(regex)))
    }

    pub fn matches(&self, input: &str) -> bool {
        match &self.0 {
            Kind::Literal(value) => value == input,
            Kind::IgnoreCase(value) => value.eq_ignore_ascii_case(input),
            Kind::Regex(regex) => regex.is_match(input),
        }
    }
}

impl From<&str> for Pattern {
    fn from(value: &str) -> Self {
        Pattern::literal(value)
    }
}

impl From<String> for Pattern {
    fn from(value: String) -> Self {
        Pattern::literal(value)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Kind::Literal(value) => write!(f, "{value:?}"),
            Kind::IgnoreCase(value) => write!(f, "{value:?} (ignoring case)"),
            Kind::Regex(regex) => write!(f, "/{}/", regex.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_is_not_a_regex() {
        let pattern = Pattern::literal("a.b");
        assert!(pattern.matches("a.b"));
        assert!(!pattern.matches("axb"));
        assert!(Pattern::ignore_case("HTTP://example.com").matches("http://EXAMPLE.com"));
        assert!(!Pattern::ignore_case("http://example.com").matches("http://example.com/"));
    }

    #[test]
    fn regex_must_match_whole_input() {
        let pattern = Pattern::regex("a|ab").unwrap();
        assert!(pattern.matches("a"));
        assert!(pattern.matches("ab"));
        assert!(!pattern.matches("abc"));
        assert!(!pattern.matches("xab"));

        let pattern = Pattern::regex(r"(?i)hello\s+world").unwrap();
        assert!(pattern.matches("HELLO   world"));
    }

    #[test]
    fn invalid_regex() {
        assert!(Pattern::regex("(unclosed").is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Pattern::from("x").to_string(), "\"x\"");
        assert_eq!(Pattern::regex("a+").unwrap().to_string(), "/^(?:a+)$/");
    }
}
