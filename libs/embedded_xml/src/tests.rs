#![cfg_attr(rustfmt, rustfmt_skip)]
extern crate std;

use super::*;
use std::format;
use std::string::String;
use std::vec::Vec;

/// Renders every callback into a line so whole documents can be compared.
#[derive(Default)]
struct Recorder {
    lines: Vec<String>,
}

impl ContentHandler for Recorder {
    fn start_element(&mut self, name: &str, attrs: AttributeReader<'_>) {
        let mut line = format!("<{name}");
        for (n, v) in attrs {
            line.push_str(&format!(" {n}={v}"));
        }
        line.push('>');
        self.lines.push(line);
    }

    fn characters(&mut self, content: &str) {
        self.lines.push(format!("{content:?}"));
    }

    fn end_element(&mut self, name: &str) {
        self.lines.push(format!("</{name}>"));
    }

    fn end_document(&mut self) {
        self.lines.push(String::from("EOF"));
    }
}

fn record(xml: &str, buffer_size: usize) -> (Result<()>, Vec<String>) {
    let mut recorder = Recorder::default();
    let mut buffer = std::vec![0u8; buffer_size];
    let result = Reader::new_borrowed(xml.as_bytes(), &mut buffer[..]).parse(&mut recorder);
    (result, recorder.lines)
}

const CONTAINER: &str = "\
    <?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
    <container version=\"1.0\" xmlns=\"urn:oasis:names:tc:opendocument:xmlns:container\">\n\
    \x20 <rootfiles>\n\
    \x20   <rootfile full-path=\"OEBPS/content.opf\" media-type=\"application/oebps-package+xml\"/>\n\
    \x20 </rootfiles>\n\
    </container>\n";

#[test]
fn full_tree() {
    let xml = "\
        <?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\
        <!DOCTYPE root>\
        <root attr1=\"value1\" attr2='value 2'>\
            <child>Text</child>\
            <?example processing=\"instructions\"?>\
            <child>More text</child>\
            <![CDATA[<not> markup]]>\
            <!-- a comment -->\
            <self-closing />\
            <self-closing/>\
        </root>";
    let (result, lines) = record(xml, 512);
    assert_eq!(result, Ok(()));
    assert_eq!(lines, [
        "<root attr1=value1 attr2=value 2>",
        "<child>", "\"Text\"", "</child>",
        "<child>", "\"More text\"", "</child>",
        "\"<not> markup\"",
        "<self-closing>", "</self-closing>",
        "<self-closing>", "</self-closing>",
        "</root>",
        "EOF",
    ]);
}

#[test]
fn whitespace_is_character_data() {
    let (result, lines) = record(CONTAINER, 128);
    assert_eq!(result, Ok(()));
    assert_eq!(lines, [
        "<container version=1.0 xmlns=urn:oasis:names:tc:opendocument:xmlns:container>",
        "\"\\n  \"",
        "<rootfiles>",
        "\"\\n    \"",
        "<rootfile full-path=OEBPS/content.opf media-type=application/oebps-package+xml>",
        "</rootfile>",
        "\"\\n  \"",
        "</rootfiles>",
        "\"\\n\"",
        "</container>",
        "EOF",
    ]);
}

#[test]
fn small_buffer_splits_text() {
    let xml = "<p>Lorem ipsum dolor sit amet</p>";
    let (result, lines) = record(xml, 8);
    assert_eq!(result, Ok(()));
    assert_eq!(lines.first().map(String::as_str), Some("<p>"));
    assert_eq!(lines[lines.len() - 2..], ["</p>", "EOF"]);
    let text: String = lines[1..lines.len() - 2]
        .iter()
        .map(|l| l.trim_matches('"'))
        .collect();
    assert_eq!(text, "Lorem ipsum dolor sit amet");
    assert!(lines.len() > 4, "text should arrive in several spans");
}

#[test]
fn invalid_doc() {
    let (result, lines) = record("This isn't actually an XML document", 512);
    assert_eq!(result, Err(Error::UnexpectedText));
    assert!(lines.is_empty());

    let (result, _) = record("", 512);
    assert_eq!(result, Err(Error::Eof));

    let (result, lines) = record("<?xml?><unclosed><child>Text</child>", 512);
    assert_eq!(result, Err(Error::UnclosedElement));
    assert_eq!(lines, ["<unclosed>", "<child>", "\"Text\"", "</child>"]);

    let (result, lines) = record("<root><a></b></root>", 512);
    assert_eq!(result, Err(Error::MismatchedTag));
    assert_eq!(lines, ["<root>", "<a>"]);

    let (result, _) = record("<root/><second/>", 512);
    assert_eq!(result, Err(Error::InvalidState));
}

#[test]
fn truncated_markup() {
    let (result, lines) = record("<root><child>Text</child><broken attr", 512);
    assert_eq!(result, Err(Error::Eof));
    assert_eq!(lines, ["<root>", "<child>", "\"Text\"", "</child>"]);
}

#[test]
fn markup_larger_than_buffer() {
    let (result, _) = record("<root with=\"far too many attribute bytes\"/>", 16);
    assert_eq!(result, Err(Error::BufferTooSmall));
}

#[test]
fn non_owning() {
    let xml = "<?xml?><root>Text</root>";
    let (result, lines) = record(xml, 8);
    assert_eq!(result, Ok(()));
    assert_eq!(lines, ["<root>", "\"Text\"", "</root>", "EOF"]);
}

#[test]
fn gt_inside_quoted_attribute() {
    let (result, lines) = record("<r a=\"1>0\" b='x>y'>x<e c=\">\"/></r>", 64);
    assert_eq!(result, Ok(()));
    assert_eq!(lines, ["<r a=1>0 b=x>y>", "\"x\"", "<e c=>>", "</e>", "</r>", "EOF"]);

    // the prolog fills most of the window, the tag arrives in two reads
    let (result, lines) = record("<?xml?><r a=\"1>0\">x</r>", 16);
    assert_eq!(result, Ok(()));
    assert_eq!(lines, ["<r a=1>0>", "\"x\"", "</r>", "EOF"]);
}

/// Hands out a single byte per read.
struct Trickle<'a>(&'a [u8]);

impl embedded_io::ErrorType for Trickle<'_> {
    type Error = embedded_io::ErrorKind;
}

impl embedded_io::Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> core::result::Result<usize, Self::Error> {
        match self.0.split_first() {
            Some((&byte, rest)) if !buf.is_empty() => {
                buf[0] = byte;
                self.0 = rest;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

#[test]
fn short_reads_keep_characters_whole() {
    let xml = "<r>€</r>";
    let mut recorder = Recorder::default();
    let mut buffer = [0u8; 16];
    let result = Reader::new_borrowed(Trickle(xml.as_bytes()), &mut buffer[..]).parse(&mut recorder);
    assert_eq!(result, Ok(()));
    assert_eq!(recorder.lines, ["<r>", "\"€\"", "</r>", "EOF"]);

    let xml = "<p lang=\"de\">Grüße, €uro</p>";
    let mut recorder = Recorder::default();
    let mut buffer = [0u8; 16];
    let result = Reader::new_borrowed(Trickle(xml.as_bytes()), &mut buffer[..]).parse(&mut recorder);
    assert_eq!(result, Ok(()));
    let lines = &recorder.lines;
    assert_eq!(lines.first().map(String::as_str), Some("<p lang=de>"));
    assert_eq!(lines[lines.len() - 2..], ["</p>", "EOF"]);
    let text: String = lines[1..lines.len() - 2]
        .iter()
        .map(|l| l.trim_matches('"'))
        .collect();
    assert_eq!(text, "Grüße, €uro");
}

#[test]
fn truncated_character_is_an_error() {
    let mut recorder = Recorder::default();
    let mut buffer = [0u8; 16];
    let result = Reader::new_borrowed(&b"<r>\xe2\x82"[..], &mut buffer[..]).parse(&mut recorder);
    assert_eq!(result, Err(Error::Eof));
    assert_eq!(recorder.lines, ["<r>"]);
}
