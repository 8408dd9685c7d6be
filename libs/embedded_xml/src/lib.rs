/*!
A no_std push-style XML reader using embedded-io for memory constrainted environment.

The reader walks the document once and reports its structure to a
[`ContentHandler`], much like a SAX parser.

## Features
- no_std
- alloc optional
- streaming, fixed-size window

## Usage
```
# use embedded_xml as xml;
# fn main() -> Result<(), xml::Error> {
struct Printer;

impl xml::ContentHandler for Printer {
    fn start_element(&mut self, name: &str, attrs: xml::AttributeReader<'_>) {
        println!("Start element: {name} with attributes: {attrs:?}");
    }
    fn characters(&mut self, content: &str) {
        println!("Text: {content}");
    }
    fn end_element(&mut self, name: &str) {
        println!("End element: {name}");
    }
    fn end_document(&mut self) {}
}

let xml = "<?xml version=\"1.0\"?><root>Text</root>";
let mut reader = xml::Reader::new(xml.as_bytes(), 64);
reader.parse(&mut Printer)?;
# Ok(())
# }
```

## Limitations & non-goals
- UTF-8 only
- no rewinding
- no DTD support
- no namespaces
- no entity decoding
- markup blocks (tags, comments, ...) have to fit inside the internal buffer
*/

#![no_std]

#[cfg(test)]
extern crate std;

macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        log::trace!($($arg)*);
        #[cfg(test)]
        std::eprintln!($($arg)*);
    };
}

mod attributes;
mod handler;
mod reader;
mod token;

#[cfg(test)]
mod tests;

#[cfg(feature = "alloc")]
extern crate alloc;

pub use attributes::AttributeReader;
pub use handler::ContentHandler;
pub use reader::Reader;

#[cfg(feature = "alloc")]
pub type OwnedReader<R> = Reader<R, alloc::vec::Vec<u8>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    IoError(embedded_io::ErrorKind),
    Utf8Error(core::str::Utf8Error),
    InvalidState,
    /// Input ended inside markup, or before any root element.
    Eof,
    /// A markup block does not fit into the reader's buffer.
    BufferTooSmall,
    MismatchedTag,
    UnclosedElement,
    /// Non-whitespace character data outside of the root element.
    UnexpectedText,
}

type Result<T> = core::result::Result<T, Error>;

impl From<core::str::Utf8Error> for Error {
    fn from(err: core::str::Utf8Error) -> Self {
        Error::Utf8Error(err)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::IoError(kind) => write!(f, "i/o error: {kind:?}"),
            Error::Utf8Error(err) => write!(f, "invalid utf-8: {err}"),
            Error::InvalidState => f.write_str("invalid document structure"),
            Error::Eof => f.write_str("unexpected end of document"),
            Error::BufferTooSmall => f.write_str("markup does not fit into the read buffer"),
            Error::MismatchedTag => f.write_str("end tag does not match the open element"),
            Error::UnclosedElement => f.write_str("document ended with unclosed elements"),
            Error::UnexpectedText => f.write_str("text outside of the root element"),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Utf8Error(err) => Some(err),
            _ => None,
        }
    }
}
