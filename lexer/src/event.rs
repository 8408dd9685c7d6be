use std::collections::HashMap;
use std::fmt;

use crate::error::ParseError;

/// Attributes of a single start tag. Keys are unique, order is irrelevant.
pub type Attributes = HashMap<String, String>;

/// One discrete occurrence of a document scan.
///
/// `Finish` and `Failure` only terminate the stream; the lexer consumes them
/// itself and never hands them to a matcher.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ElementStart {
        tag_name: String,
        attributes: Attributes,
    },
    ElementEnd {
        tag_name: String,
    },
    Text {
        content: String,
    },
    Finish,
    Failure(ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    ElementStart,
    ElementEnd,
    Text,
    Finish,
    Failure,
}

impl EventKind {
    pub fn name(self) -> &'static str {
        match self {
            EventKind::ElementStart => "element start",
            EventKind::ElementEnd => "element end",
            EventKind::Text => "text",
            EventKind::Finish => "finish",
            EventKind::Failure => "failure",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Event {
    /// ```
    /// # use xml_lexer::Event;
    /// let event = Event::start("a", [("href", "http://example.com")]);
    /// assert!(event.is_start_of("a"));
    /// assert_eq!(event.attribute("href"), Some("http://example.com"));
    /// ```
    pub fn start<I, K, V>(tag_name: impl Into<String>, attributes: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Event::ElementStart {
            tag_name: tag_name.into(),
            attributes: attributes
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn end(tag_name: impl Into<String>) -> Self {
        Event::ElementEnd {
            tag_name: tag_name.into(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Event::Text {
            content: content.into(),
        }
    }

    /// Whether `other` is this very event. Lets a known event serve as the
    /// condition of [`BlockingLexer::wait_for`](crate::BlockingLexer::wait_for).
    ///
    /// ```
    /// # use xml_lexer::{BlockingLexer, Event};
    /// # fn main() -> Result<(), xml_lexer::LexerError> {
    /// let xml = r#"<ncx><navPoint id="n1"/><navPoint id="n2"/></ncx>"#;
    /// let mut lexer = BlockingLexer::new();
    /// lexer.run_synchronous(embedded_xml::Reader::new(xml.as_bytes(), 64))?;
    /// let expected = Event::start("navPoint", [("id", "n2")]);
    /// assert_eq!(lexer.wait_for(|event| expected.matches(event))?, Some(&expected));
    /// # Ok(())
    /// # }
    /// ```
    pub fn matches(&self, other: &Event) -> bool {
        self == other
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::ElementStart { .. } => EventKind::ElementStart,
            Event::ElementEnd { .. } => EventKind::ElementEnd,
            Event::Text { .. } => EventKind::Text,
            Event::Finish => EventKind::Finish,
            Event::Failure(_) => EventKind::Failure,
        }
    }

    pub fn is_element_start(&self) -> bool {
        matches!(self, Event::ElementStart { .. })
    }

    pub fn is_element_end(&self) -> bool {
        matches!(self, Event::ElementEnd { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Event::Text { .. })
    }

    /// `Finish` or `Failure`: nothing follows in the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Finish | Event::Failure(_))
    }

    /// Tag name of an element start or end, `None` for everything else.
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Event::ElementStart { tag_name, .. } | Event::ElementEnd { tag_name } => {
                Some(tag_name.as_str())
            }
            _ => None,
        }
    }

    pub fn is_start_of(&self, tag: &str) -> bool {
        matches!(self, Event::ElementStart { tag_name, .. } if tag_name == tag)
    }

    pub fn is_end_of(&self, tag: &str) -> bool {
        matches!(self, Event::ElementEnd { tag_name } if tag_name == tag)
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Event::Text { content } => Some(content.as_str()),
            _ => None,
        }
    }

    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Event::ElementStart { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Value of attribute `key` of an element start. Keys are case-sensitive.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes()?.get(key).map(String::as_str)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::ElementStart {
                tag_name,
                attributes,
            } => {
                write!(f, "<{tag_name}")?;
                let mut attributes: Vec<_> = attributes.iter().collect();
                attributes.sort();
                for (key, value) in attributes {
                    write!(f, " {key}={value:?}")?;
                }
                f.write_str(">")
            }
            Event::ElementEnd { tag_name } => write!(f, "</{tag_name}>"),
            Event::Text { content } => write!(f, "{content:?}"),
            Event::Finish => f.write_str("finish"),
            Event::Failure(cause) => write!(f, "failure: {cause}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspection_never_panics() {
        let events = [
            Event::start("div", [("class", "note")]),
            Event::end("div"),
            Event::text("hello"),
            Event::Finish,
        ];
        let names: Vec<_> = events.iter().map(Event::tag_name).collect();
        assert_eq!(names, [Some("div"), Some("div"), None, None]);
        assert!(events[0].is_start_of("div") && !events[0].is_end_of("div"));
        assert!(events[1].is_end_of("div") && !events[1].is_start_of("div"));
        assert_eq!(events[2].content(), Some("hello"));
        assert_eq!(events[3].content(), None);
        assert_eq!(events[1].attribute("class"), None);
        assert_eq!(events[0].attribute("class"), Some("note"));
        assert!(events[3].is_terminal());
    }

    #[test]
    fn value_equality() {
        assert_eq!(
            Event::start("a", [("href", "x"), ("id", "y")]),
            Event::start("a", [("id", "y"), ("href", "x")])
        );
        assert_ne!(Event::start("a", [("href", "x")]), Event::start("a", [("href", "z")]));
        assert_ne!(Event::end("a"), Event::start("a", Attributes::new()));
        assert_eq!(Event::text("t"), Event::text(String::from("t")));
    }

    #[test]
    fn matches_equal_events_only() {
        let expected = Event::start("a", [("href", "x")]);
        assert!(expected.matches(&Event::start("a", [("href", "x")])));
        assert!(!expected.matches(&Event::start("a", [("href", "x"), ("id", "y")])));
        assert!(!expected.matches(&Event::end("a")));
        assert!(Event::Finish.matches(&Event::Finish));
    }

    #[test]
    fn display() {
        let start = Event::start("a", [("id", "x"), ("href", "h")]);
        assert_eq!(start.to_string(), r#"<a href="h" id="x">"#);
        assert_eq!(Event::end("a").to_string(), "</a>");
        assert_eq!(Event::text("a\nb").to_string(), r#""a\nb""#);
        assert_eq!(start.kind().to_string(), "element start");
    }
}
