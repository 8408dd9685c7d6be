use std::fmt;
use std::sync::Arc;

use log::{debug, trace};

use crate::bridge::{Producer, XmlParser};
use crate::error::{LexerError, ParseError, Result};
use crate::event::Event;
use crate::executor::Executor;
use crate::pattern::Pattern;
use crate::queue::{CancelHandle, EventQueue};

/// Lexer that can be used to gradually walk through an XML document.
///
/// A producer fills the event queue, either up front
/// ([`run_synchronous`](Self::run_synchronous)) or concurrently
/// ([`run_asynchronous`](Self::run_asynchronous)). The matchers take events
/// off the queue until one satisfies them, discarding the ones in between,
/// and remember it as the current event.
///
/// Every matcher returns `Ok(None)` once the document is finished (or the
/// wait was cancelled) and `Err(LexerError::Parse(_))` if the parser failed.
///
/// ```
/// # use xml_lexer::BlockingLexer;
/// # fn main() -> Result<(), xml_lexer::LexerError> {
/// let xml = r#"<html><a href="http://example.com">Example</a></html>"#;
/// let mut lexer = BlockingLexer::new();
/// lexer.run_synchronous(embedded_xml::Reader::new(xml.as_bytes(), 256))?;
///
/// lexer.start("a", &["href", "HTTP://EXAMPLE.COM"])?;
/// assert_eq!(lexer.current_attribute("href")?, Some("http://example.com"));
/// lexer.text("Example")?;
/// assert_eq!(lexer.current_text()?, "Example");
/// assert!(lexer.end("html")?.is_some());
/// assert!(lexer.next()?.is_none());
/// # Ok(())
/// # }
/// ```
pub struct BlockingLexer {
    queue: Arc<EventQueue>,
    last: Option<Event>,
    terminal: Option<Terminal>,
}

/// How the event stream ended, once the consumer got there.
#[derive(Debug, Clone)]
enum Terminal {
    Finished,
    Failed(ParseError),
}

impl Default for BlockingLexer {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockingLexer {
    pub fn new() -> Self {
        BlockingLexer {
            queue: Arc::default(),
            last: None,
            terminal: None,
        }
    }

    pub fn producer(&self) -> Producer {
        Producer::new(Arc::clone(&self.queue))
    }

    /// Reads the whole document into the event queue before returning.
    /// The matchers then replay the buffered events.
    pub fn run_synchronous<P: XmlParser>(&self, parser: P) -> Result<()> {
        self.producer().run_synchronous(parser)
    }

    /// Like [`run_synchronous`](Self::run_synchronous), but on `executor`.
    /// The matchers can be used right away and block until the parser
    /// catches up.
    pub fn run_asynchronous<P, E>(&self, parser: P, executor: &E)
    where
        P: XmlParser + Send + 'static,
        E: Executor + ?Sized,
    {
        self.producer().run_asynchronous(parser, executor)
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::new(Arc::clone(&self.queue))
    }

    /// Waits for an event satisfying `condition` and makes it the current
    /// event. Events that don't satisfy it are discarded.
    ///
    /// Returns `Ok(None)` at the end of the document, which also clears the
    /// current event, or when the wait was cancelled.
    pub fn wait_for<F>(&mut self, mut condition: F) -> Result<Option<&Event>>
    where
        F: FnMut(&Event) -> bool,
    {
        match &self.terminal {
            Some(Terminal::Finished) => return Ok(None),
            Some(Terminal::Failed(cause)) => return Err(LexerError::Parse(cause.clone())),
            None => {}
        }
        loop {
            let Some(event) = self.queue.take() else {
                debug!("Wait cancelled");
                return Ok(None);
            };
            match event {
                Event::Finish => {
                    trace!("Reached end of document");
                    self.last = None;
                    self.terminal = Some(Terminal::Finished);
                    return Ok(None);
                }
                Event::Failure(cause) => {
                    self.terminal = Some(Terminal::Failed(cause.clone()));
                    return Err(LexerError::Parse(cause));
                }
                event if condition(&event) => {
                    let event: &Event = self.last.insert(event);
                    return Ok(Some(event));
                }
                event => trace!("Skipping {event}"),
            }
        }
    }

    /// Skips to the next event, whatever it is.
    pub fn next(&mut self) -> Result<Option<&Event>> {
        self.wait_for(|_| true)
    }

    /// Waits for a start element. Attributes are in key, value format:
    /// `("a", &["href", "http://example.com"])` would match any links to
    /// `http://example.com`. Values are compared ignoring ASCII case and
    /// attributes not listed are ignored.
    ///
    /// Fails with [`LexerError::InvalidArgument`] on an odd number of
    /// strings, before any event is consumed.
    pub fn start(&mut self, tag_name: &str, attributes: &[&str]) -> Result<Option<&Event>> {
        self.start_with(tag_name, |value| Ok(Pattern::ignore_case(value)), attributes)
    }

    /// Like [`start`](Self::start), with `pattern_factory` turning each
    /// attribute value into the pattern it is matched with.
    ///
    /// ```
    /// # use xml_lexer::{BlockingLexer, Pattern};
    /// # fn main() -> Result<(), xml_lexer::LexerError> {
    /// let xml = r#"<spine><itemref idref="cover"/><itemref idref="chapter2"/></spine>"#;
    /// let mut lexer = BlockingLexer::new();
    /// lexer.run_synchronous(embedded_xml::Reader::new(xml.as_bytes(), 256))?;
    /// lexer.start_with("itemref", Pattern::regex, &["idref", r"chapter\d+"])?;
    /// assert_eq!(lexer.current_attribute("idref")?, Some("chapter2"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn start_with<F>(&mut self, tag_name: &str, mut pattern_factory: F, attributes: &[&str]) -> Result<Option<&Event>>
    where
        F: FnMut(&str) -> std::result::Result<Pattern, regex::Error>,
    {
        if attributes.len() % 2 != 0 {
            return Err(LexerError::InvalidArgument(
                "attributes must be given as key, value pairs",
            ));
        }
        let mut patterns = Vec::with_capacity(attributes.len() / 2);
        for pair in attributes.chunks_exact(2) {
            patterns.push((pair[0], pattern_factory(pair[1])?));
        }
        self.start_matching(tag_name, patterns)
    }

    /// Waits for a start element whose attributes match the given patterns,
    /// used as they are.
    pub fn start_matching<I, K>(&mut self, tag_name: &str, attributes: I) -> Result<Option<&Event>>
    where
        I: IntoIterator<Item = (K, Pattern)>,
        K: AsRef<str>,
    {
        let patterns: Vec<(K, Pattern)> = attributes.into_iter().collect();
        self.wait_for(|event| match event {
            Event::ElementStart {
                tag_name: name,
                attributes,
            } => {
                name == tag_name
                    && patterns.iter().all(|(key, pattern)| {
                        attributes
                            .get(key.as_ref())
                            .is_some_and(|value| pattern.matches(value))
                    })
            }
            _ => false,
        })
    }

    /// Waits for the end of an element of the given type.
    pub fn end(&mut self, tag_name: &str) -> Result<Option<&Event>> {
        self.wait_for(|event| event.is_end_of(tag_name))
    }

    /// Waits for text matching `pattern`, either as is or with surrounding
    /// whitespace trimmed. A plain string is matched literally.
    pub fn text(&mut self, pattern: impl Into<Pattern>) -> Result<Option<&Event>> {
        let pattern = pattern.into();
        self.wait_for(|event| {
            event
                .content()
                .is_some_and(|content| pattern.matches(content) || pattern.matches(content.trim()))
        })
    }

    /// The last matched event.
    pub fn current(&self) -> Option<&Event> {
        self.last.as_ref()
    }

    /// Content of the current text event.
    pub fn current_text(&self) -> Result<&str> {
        self.last
            .as_ref()
            .and_then(Event::content)
            .ok_or_else(|| self.mismatch("text"))
    }

    /// Tag name of the current element start or end.
    pub fn current_tag_name(&self) -> Result<&str> {
        self.last
            .as_ref()
            .and_then(Event::tag_name)
            .ok_or_else(|| self.mismatch("element start or end"))
    }

    /// Value of attribute `key` (or `None`) of the current element start.
    pub fn current_attribute(&self, key: &str) -> Result<Option<&str>> {
        match &self.last {
            Some(event @ Event::ElementStart { .. }) => Ok(event.attribute(key)),
            _ => Err(self.mismatch("element start")),
        }
    }

    fn mismatch(&self, expected: &'static str) -> LexerError {
        LexerError::TypeMismatch {
            expected,
            found: self.last.as_ref().map_or("nothing", |event| event.kind().name()),
        }
    }
}

impl fmt::Debug for BlockingLexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingLexer")
            .field("last", &self.last)
            .field("buffered", &self.queue.len())
            .field("terminal", &self.terminal)
            .finish()
    }
}
