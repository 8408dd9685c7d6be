use crate::attributes::AttributeReader;

/// Receives the structure of a document from [`Reader::parse`](crate::Reader::parse).
///
/// Callbacks arrive in document order. Borrowed arguments only live for the
/// duration of the call, so implementations copy whatever they keep.
pub trait ContentHandler {
    /// An element was opened. Self-closing elements are followed by
    /// [`end_element`](Self::end_element) right away.
    fn start_element(&mut self, name: &str, attrs: AttributeReader<'_>);

    /// A span of character data. One text node may be split into several
    /// adjacent spans when it does not fit into the reader's buffer.
    fn characters(&mut self, content: &str);

    fn end_element(&mut self, name: &str);

    /// The whole document was read. Always the last call of a successful parse.
    fn end_document(&mut self);
}

impl<H: ContentHandler + ?Sized> ContentHandler for &mut H {
    fn start_element(&mut self, name: &str, attrs: AttributeReader<'_>) {
        (**self).start_element(name, attrs)
    }

    fn characters(&mut self, content: &str) {
        (**self).characters(content)
    }

    fn end_element(&mut self, name: &str) {
        (**self).end_element(name)
    }

    fn end_document(&mut self) {
        (**self).end_document()
    }
}
