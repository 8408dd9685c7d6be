use embedded_io::Error as _;

use crate::attributes::AttributeReader;
use crate::handler::ContentHandler;
use crate::token::Token;
use crate::{Error, Result};

/// A streaming, push-style XML reader.
/// The window buffer can be owned or borrowed.
pub struct Reader<R, Buffer> {
    reader: R,
    exhausted: bool,
    buffer: Buffer,
    pos: usize,
    end: usize,
}

impl<'a, R: embedded_io::Read> Reader<R, &'a mut [u8]> {
    /// Creates a new Reader with a borrowed buffer.
    /// ```
    /// # use embedded_xml as xml;
    /// let xml = "<?xml version=\"1.0\"?><root/>";
    /// let mut buffer = [0u8; 256];
    /// let parser = xml::Reader::new_borrowed(xml.as_bytes(), &mut buffer);
    /// ```
    pub fn new_borrowed(reader: R, buffer: &'a mut [u8]) -> Self {
        Self::with_buffer(reader, buffer)
    }
}

#[cfg(feature = "alloc")]
impl<R: embedded_io::Read> Reader<R, alloc::vec::Vec<u8>> {
    /// Creates a new Reader with an owned buffer of size `buffer_size`.
    /// ```
    /// # use embedded_xml as xml;
    /// let xml = "<?xml version=\"1.0\"?><root/>";
    /// let parser = xml::Reader::new(xml.as_bytes(), 256);
    /// ```
    pub fn new(reader: R, buffer_size: usize) -> Self {
        Self::with_buffer(reader, alloc::vec![0; buffer_size])
    }
}

impl<R: embedded_io::Read, Buffer: AsRef<[u8]> + AsMut<[u8]>> Reader<R, Buffer> {
    fn with_buffer(reader: R, buffer: Buffer) -> Self {
        Reader {
            reader,
            exhausted: false,
            buffer,
            pos: 0,
            end: 0,
        }
    }

    /// Reads the whole document and reports it to `handler`.
    ///
    /// `end_document` is only called when the document was well-formed
    /// enough to be read to the end; on error the handler has seen every
    /// callback up to the failure point.
    ///
    /// # Examples
    /// ```
    /// # use embedded_xml as xml;
    /// struct Depth(usize, usize);
    ///
    /// impl xml::ContentHandler for Depth {
    ///     fn start_element(&mut self, _: &str, _: xml::AttributeReader<'_>) {
    ///         self.0 += 1;
    ///         self.1 = self.1.max(self.0);
    ///     }
    ///     fn characters(&mut self, _: &str) {}
    ///     fn end_element(&mut self, _: &str) {
    ///         self.0 -= 1;
    ///     }
    ///     fn end_document(&mut self) {}
    /// }
    ///
    /// let xml = "<a><b><c/></b><b/></a>";
    /// let mut depth = Depth(0, 0);
    /// xml::Reader::new(xml.as_bytes(), 64).parse(&mut depth).unwrap();
    /// assert_eq!(depth.1, 3);
    /// ```
    pub fn parse<H: ContentHandler + ?Sized>(&mut self, handler: &mut H) -> Result<()> {
        let mut open = OpenElements::default();
        let mut seen_root = false;
        loop {
            match self.next_token()? {
                Token::StartElement {
                    name,
                    attrs,
                    self_closing,
                } => {
                    if open.depth == 0 {
                        if seen_root {
                            return Err(Error::InvalidState);
                        }
                        seen_root = true;
                    }
                    handler.start_element(name, attrs);
                    if self_closing {
                        handler.end_element(name);
                    } else {
                        open.push(name);
                    }
                }
                Token::EndElement { name } => {
                    open.pop(name)?;
                    handler.end_element(name);
                }
                Token::Text { content } => {
                    if open.depth > 0 {
                        handler.characters(content);
                    } else if !content.trim_ascii().is_empty() {
                        return Err(Error::UnexpectedText);
                    }
                }
                Token::CDATA { data } => {
                    if open.depth == 0 {
                        return Err(Error::UnexpectedText);
                    }
                    handler.characters(core::str::from_utf8(data)?);
                }
                Token::Skipped => {}
                Token::EndOfFile => {
                    if open.depth > 0 {
                        return Err(Error::UnclosedElement);
                    }
                    if !seen_root {
                        return Err(Error::Eof);
                    }
                    handler.end_document();
                    return Ok(());
                }
            }
        }
    }

    fn next_token(&mut self) -> Result<Token<'_>> {
        if self.pos == self.end {
            self.fill()?;
            if self.pos == self.end {
                trace!("Pos = End");
                return Ok(Token::EndOfFile);
            }
        }

        let text_end = match memchr::memchr(b'<', self.window()) {
            Some(offset) => offset,
            None => {
                self.fill()?;
                let window = self.window();
                memchr::memchr(b'<', window).unwrap_or(window.len())
            }
        };
        if text_end > 0 {
            return self.text(text_end);
        }

        self.ensure(3)?;

        enum BlockType {
            Cdata,
            Comment,
            Dtd,
            PI,
            EndElement,
            StartElement,
        }

        let b = self.window();
        let (ty, n_start, n_end) = match (b[1], b[2]) {
            (b'!', b'[') => (BlockType::Cdata, "<![CDATA[", "]]>"),
            (b'!', b'-') => (BlockType::Comment, "<!--", "-->"),
            (b'!', _) => (BlockType::Dtd, "<!", ">"),
            (b'?', _) => (BlockType::PI, "<?", "?>"),
            (b'/', _) => (BlockType::EndElement, "</", ">"),
            (_, _) => (BlockType::StartElement, "<", ">"),
        };

        let (start, end) = match ty {
            BlockType::StartElement => self.find_tag_end()?,
            _ => self.find_block(n_start, n_end)?,
        };

        let window = &self.buffer.as_ref()[self.pos..self.end];
        let mut block = &window[start..end];
        let self_closing = matches!(ty, BlockType::StartElement) && block.last() == Some(&b'/');
        if self_closing {
            block = &block[..block.len() - 1];
        }
        let block = block.trim_ascii();

        let token = match ty {
            BlockType::Cdata => Token::CDATA {
                data: &window[start..end],
            },
            BlockType::Comment | BlockType::Dtd | BlockType::PI => Token::Skipped,
            BlockType::EndElement => Token::EndElement {
                name: core::str::from_utf8(block)?,
            },
            BlockType::StartElement => {
                let (name, attrs) = Self::name_and_attrs(block)?;
                Token::StartElement {
                    name,
                    attrs,
                    self_closing,
                }
            }
        };
        self.pos += end + n_end.len();
        Ok(token)
    }

    /// Emits character data from the start of the window, up to `len` bytes.
    /// A multi-byte character cut off by the window edge is left for the
    /// next span, or completed from the reader if nothing precedes it.
    fn text(&mut self, mut len: usize) -> Result<Token<'_>> {
        loop {
            let checked = core::str::from_utf8(&self.window()[..len]).map(|_| ());
            match checked {
                Ok(()) => break,
                Err(e) if e.error_len().is_none()
                    && self.pos + len == self.end
                    && !self.exhausted =>
                {
                    if e.valid_up_to() > 0 {
                        len = e.valid_up_to();
                        break;
                    }
                    trace!("Completing a character split by the window edge");
                    self.ensure(len + 1)?;
                    let window = self.window();
                    len = memchr::memchr(b'<', window).unwrap_or(window.len());
                }
                Err(e) => return Err(e.into()),
            }
        }
        let content = core::str::from_utf8(&self.buffer.as_ref()[self.pos..self.pos + len])?;
        self.pos += len;
        Ok(Token::Text { content })
    }

    fn name_and_attrs(block: &[u8]) -> Result<(&str, AttributeReader<'_>)> {
        let block = core::str::from_utf8(block)?;

        let (name, attrs) = match block.split_once(|c: char| c.is_ascii_whitespace()) {
            Some((name, rest)) => (name, AttributeReader::from_block(rest)),
            None => (block, AttributeReader::default()),
        };
        if name.is_empty() {
            return Err(Error::InvalidState);
        }
        Ok((name, attrs))
    }

    /// Moves the unparsed bytes to the beginning of the buffer, updates
    /// positional indices and reads more data behind them.
    /// Returns the number of bytes read, 0 if the buffer is full or the
    /// input is exhausted.
    fn fill(&mut self) -> Result<usize> {
        if self.exhausted {
            return Ok(0);
        }
        let buffer = self.buffer.as_mut();
        trace!("Copying {} bytes to start of buffer", self.end - self.pos);
        buffer.copy_within(self.pos..self.end, 0);
        self.end -= self.pos;
        self.pos = 0;
        if self.end == buffer.len() {
            return Ok(0);
        }
        let read_bytes = self
            .reader
            .read(&mut buffer[self.end..])
            .map_err(|e| Error::IoError(e.kind()))?;
        if read_bytes == 0 {
            self.exhausted = true;
        }
        self.end += read_bytes;
        trace!("Read {read_bytes} bytes, new window len: {}", self.end);
        Ok(read_bytes)
    }

    /// Ensure at least `size` bytes are available in the window, reading if necessary.
    fn ensure(&mut self, size: usize) -> Result<()> {
        trace!("Ensuring {size} bytes (available: {})", self.end - self.pos);
        while self.end - self.pos < size {
            if self.fill()? == 0 {
                return Err(if self.exhausted {
                    Error::Eof
                } else {
                    Error::BufferTooSmall
                });
            }
        }
        Ok(())
    }

    /// Finds the end of the markup block starting at the beginning of the
    /// window, reading more data until the end needle shows up.
    /// Returns the range between both needles, relative to the window.
    fn find_block(&mut self, n_start: &str, n_end: &str) -> Result<(usize, usize)> {
        trace!("Trying to find '{n_start}' .. '{n_end}'");
        let n_end = n_end.as_bytes();
        let mut searched = n_start.len();
        loop {
            let window = self.window();
            if window.len() > searched {
                if let Some(end) = memchr::memmem::find(&window[searched..], n_end) {
                    return Ok((n_start.len(), searched + end));
                }
                // the needle may straddle the refill boundary
                searched = window
                    .len()
                    .saturating_sub(n_end.len() - 1)
                    .max(n_start.len());
            }
            let available = window.len();
            self.ensure(available + 1)?;
        }
    }

    /// Finds the `>` closing the start tag at the beginning of the window.
    /// Quoted attribute values may contain `>`, the quote state survives
    /// refills. Returns the range between `<` and `>`, relative to the window.
    fn find_tag_end(&mut self) -> Result<(usize, usize)> {
        let mut quote = None;
        let mut searched = 1;
        loop {
            let window = self.window();
            while searched < window.len() {
                let rest = &window[searched..];
                let hit = match quote {
                    None => memchr::memchr3(b'>', b'"', b'\'', rest),
                    Some(open) => memchr::memchr(open, rest),
                };
                let Some(offset) = hit else {
                    searched = window.len();
                    break;
                };
                let at = searched + offset;
                match (quote, window[at]) {
                    (None, b'>') => return Ok((1, at)),
                    (None, open) => quote = Some(open),
                    (Some(_), _) => quote = None,
                }
                searched = at + 1;
            }
            let available = window.len();
            self.ensure(available + 1)?;
        }
    }

    fn window(&self) -> &[u8] {
        &self.buffer.as_ref()[self.pos..self.end]
    }
}

/// Elements opened but not yet closed. Names are only tracked with `alloc`,
/// otherwise just the nesting depth is verified.
#[derive(Default)]
struct OpenElements {
    depth: usize,
    #[cfg(feature = "alloc")]
    names: alloc::vec::Vec<alloc::string::String>,
}

impl OpenElements {
    fn push(&mut self, name: &str) {
        self.depth += 1;
        #[cfg(feature = "alloc")]
        self.names.push(alloc::string::String::from(name));
        #[cfg(not(feature = "alloc"))]
        let _ = name;
    }

    fn pop(&mut self, name: &str) -> Result<()> {
        if self.depth == 0 {
            return Err(Error::MismatchedTag);
        }
        self.depth -= 1;
        #[cfg(feature = "alloc")]
        {
            if self.names.pop().as_deref() != Some(name) {
                return Err(Error::MismatchedTag);
            }
        }
        #[cfg(not(feature = "alloc"))]
        let _ = name;
        Ok(())
    }
}
