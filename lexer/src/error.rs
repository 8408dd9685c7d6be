use std::error::Error as StdError;
use std::sync::Arc;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LexerError>;

/// Enum representing any lexer error.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexerError {
    /// The producer failed. Raised by the matcher that dequeued the failure
    /// and returned to the caller of a synchronous run.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// A cursor accessor did not fit the last matched event.
    #[error("current event is {found}, expected {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Cause of a failed parse, shared between the producer's caller and the
/// consumer that dequeues it.
#[derive(Error, Debug, Clone)]
#[error(transparent)]
pub struct ParseError(Arc<dyn StdError + Send + Sync>);

impl ParseError {
    pub fn new<E: StdError + Send + Sync + 'static>(cause: E) -> Self {
        ParseError(Arc::new(cause))
    }

    pub fn cause(&self) -> &(dyn StdError + Send + Sync + 'static) {
        &*self.0
    }

    /// The parser's own error, if it is of type `E`.
    ///
    /// ```
    /// # use xml_lexer::ParseError;
    /// let error = ParseError::new(embedded_xml::Error::Eof);
    /// assert_eq!(error.downcast_ref::<embedded_xml::Error>(), Some(&embedded_xml::Error::Eof));
    /// ```
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref()
    }
}

/// Two failures are equal when they carry the very same cause.
impl PartialEq for ParseError {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Failures of the scheduled parse task itself, as opposed to the parser.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    #[error("parse task was dropped before it ran")]
    Dropped,
    #[error("parser panicked: {0}")]
    Panicked(String),
}
