use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use embedded_xml::{AttributeReader, ContentHandler};
use log::{debug, trace, warn};

use crate::error::{LexerError, ParseError, Result, TaskError};
use crate::event::Event;
use crate::executor::Executor;
use crate::queue::EventQueue;

/// A push parser the lexer can be fed from.
///
/// Implementations walk the document once, report it to `handler` in
/// document order and finish with `end_document`. Failures are returned,
/// whatever was reported before them stays valid.
pub trait XmlParser {
    type Error: std::error::Error + Send + Sync + 'static;

    fn parse_document(self, handler: &mut dyn ContentHandler) -> std::result::Result<(), Self::Error>;
}

impl<R, Buffer> XmlParser for embedded_xml::Reader<R, Buffer>
where
    R: embedded_io::Read,
    Buffer: AsRef<[u8]> + AsMut<[u8]>,
{
    type Error = embedded_xml::Error;

    fn parse_document(mut self, handler: &mut dyn ContentHandler) -> std::result::Result<(), Self::Error> {
        self.parse(handler)
    }
}

/// Feeding end of a lexer's queue.
///
/// Obtained from [`BlockingLexer::producer`](crate::BlockingLexer::producer).
/// It only holds the queue, so it can be moved to the thread that parses.
#[derive(Clone)]
pub struct Producer {
    queue: Arc<EventQueue>,
}

impl Producer {
    pub(crate) fn new(queue: Arc<EventQueue>) -> Self {
        Producer { queue }
    }

    /// Parses the whole document on the calling thread, queueing an event
    /// per callback.
    ///
    /// A parse error (or a parser panic) is queued as a failure for the
    /// consumer and returned as well.
    pub fn run_synchronous<P: XmlParser>(&self, parser: P) -> Result<()> {
        debug!("Parsing document");
        let mut handler = QueueHandler::new(&self.queue);
        let parsed = panic::catch_unwind(AssertUnwindSafe(|| parser.parse_document(&mut handler)));
        let result = match parsed {
            Ok(result) => result.map_err(ParseError::new),
            Err(payload) => Err(ParseError::new(TaskError::Panicked(panic_message(payload.as_ref())))),
        };
        handler.settle(result)
    }

    /// Schedules [`run_synchronous`](Self::run_synchronous) on `executor`
    /// and returns right away. The outcome only reaches the consumer,
    /// through the queue.
    pub fn run_asynchronous<P, E>(&self, parser: P, executor: &E)
    where
        P: XmlParser + Send + 'static,
        E: Executor + ?Sized,
    {
        let task = ScheduledParse {
            producer: self.clone(),
            parser: Some(parser),
        };
        executor.execute(Box::new(move || task.run()));
    }
}

/// Translates the callbacks of a single parse run into events.
struct QueueHandler<'q> {
    queue: &'q EventQueue,
    terminated: bool,
    queued: usize,
}

impl<'q> QueueHandler<'q> {
    fn new(queue: &'q EventQueue) -> Self {
        QueueHandler {
            queue,
            terminated: false,
            queued: 0,
        }
    }

    fn push(&mut self, event: Event) {
        if self.terminated {
            trace!("Dropping {event} after the end of the run");
            return;
        }
        self.terminated = event.is_terminal();
        self.queued += 1;
        self.queue.push(event);
    }

    /// Terminates the run. A parser that returned without reporting the end
    /// of the document still gets its `Finish`.
    fn settle(mut self, result: std::result::Result<(), ParseError>) -> Result<()> {
        match result {
            Ok(()) => {
                if !self.terminated {
                    debug!("Parser returned without ending the document");
                    self.push(Event::Finish);
                }
                debug!("Parsed document into {} events", self.queued);
                Ok(())
            }
            Err(cause) => {
                warn!("Parse failed after {} events: {cause}", self.queued);
                self.push(Event::Failure(cause.clone()));
                Err(LexerError::Parse(cause))
            }
        }
    }
}

impl ContentHandler for QueueHandler<'_> {
    fn start_element(&mut self, name: &str, attrs: AttributeReader<'_>) {
        self.push(Event::start(name, attrs));
    }

    fn characters(&mut self, content: &str) {
        self.push(Event::text(content));
    }

    fn end_element(&mut self, name: &str) {
        self.push(Event::end(name));
    }

    fn end_document(&mut self) {
        self.push(Event::Finish);
    }
}

/// A parse handed to an executor. Reports a failure if the executor drops
/// it without running it.
struct ScheduledParse<P> {
    producer: Producer,
    parser: Option<P>,
}

impl<P: XmlParser> ScheduledParse<P> {
    fn run(mut self) {
        if let Some(parser) = self.parser.take() {
            // the consumer sees the outcome through the queue
            let _ = self.producer.run_synchronous(parser);
        }
    }
}

impl<P> Drop for ScheduledParse<P> {
    fn drop(&mut self) {
        if self.parser.is_some() {
            warn!("Parse task dropped before it ran");
            let cause = ParseError::new(TaskError::Dropped);
            self.producer.queue.push(Event::Failure(cause));
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unknown panic payload")
    }
}
