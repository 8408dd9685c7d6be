use crate::attributes::AttributeReader;

/// Raw markup unit produced by the reader's tokenizer before it is
/// dispatched to a [`ContentHandler`](crate::ContentHandler).
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Token<'a> {
    StartElement {
        name: &'a str,
        attrs: AttributeReader<'a>,
        self_closing: bool,
    },
    EndElement {
        name: &'a str,
    },
    Text {
        content: &'a str,
    },
    CDATA {
        data: &'a [u8],
    },
    /// Comments, processing instructions and doctype declarations.
    Skipped,
    EndOfFile,
}
