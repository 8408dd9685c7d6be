/*!
A blocking lexer over a push-style XML parser.

The parser pushes callbacks into a queue of [`Event`]s, the consumer pulls
them back out with matchers such as [`BlockingLexer::start`] or
[`BlockingLexer::text`]. Each matcher blocks until a suitable event comes up,
discarding everything in between, which makes scraping a few values out of
a large document a matter of a handful of calls.

The parse can run to completion up front or concurrently on any
[`Executor`], in which case the matchers wait for the parser to catch up.

## Usage
```
# use xml_lexer::{BlockingLexer, ThreadExecutor};
# fn main() -> Result<(), xml_lexer::LexerError> {
let opf = r#"<package>
  <metadata><title>Moby Dick</title></metadata>
  <manifest><item id="c1" href="chapter1.xhtml"/></manifest>
</package>"#;

let mut lexer = BlockingLexer::new();
let parser = embedded_xml::Reader::new(opf.as_bytes(), 256);
lexer.run_asynchronous(parser, &ThreadExecutor::named("opf"));

lexer.start("title", &[])?;
lexer.next()?;
assert_eq!(lexer.current_text()?, "Moby Dick");

lexer.start("item", &["id", "C1"])?;
assert_eq!(lexer.current_attribute("href")?, Some("chapter1.xhtml"));
# Ok(())
# }
```
*/

mod bridge;
mod error;
mod event;
mod executor;
mod lexer;
mod pattern;
mod queue;


pub use bridge::{Producer, XmlParser};
pub use error::{LexerError, ParseError, Result, TaskError};
pub use event::{Attributes, Event, EventKind};
pub use executor::{Executor, Task, ThreadExecutor};
pub use lexer::BlockingLexer;
pub use pattern::Pattern;
pub use queue::CancelHandle;

pub use embedded_xml::{AttributeReader, ContentHandler};
