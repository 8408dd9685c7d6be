use std::collections::BTreeMap;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use argh::FromArgs;
use embedded_xml as xml;
use log::{debug, error, info, trace};
use xml_lexer::{BlockingLexer, Event, Pattern, ThreadExecutor};

use crate::std_fs::StdFileReader;

mod std_fs;

type Result<T> = std::result::Result<T, Box<dyn Error>>;

#[derive(FromArgs)]
/// Scan an XML document with the blocking lexer
struct Args {
    /// path of the XML document
    #[argh(positional)]
    path: PathBuf,

    /// print every start tag with this name
    #[argh(option, short = 't')]
    tag: Option<String>,

    /// only print start tags carrying this attribute, as key=value (repeatable)
    #[argh(option, short = 'a')]
    attr: Vec<String>,

    /// print every text span matching this pattern
    #[argh(option)]
    text: Option<String>,

    /// treat attribute values and the text pattern as regular expressions
    #[argh(switch, short = 'r')]
    regex: bool,

    /// parse on a separate thread while scanning
    #[argh(switch, short = 'p')]
    parallel: bool,

    /// size of the parser's read window in bytes
    #[argh(option, default = "4096")]
    buffer_size: usize,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Args = argh::from_env();
    match scan(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("Scanning {} failed: {err}", args.path.display());
            ExitCode::FAILURE
        }
    }
}

fn scan(args: &Args) -> Result<()> {
    if args.tag.is_some() && args.text.is_some() {
        return Err("--tag and --text cannot be combined".into());
    }

    let file = StdFileReader::open(&args.path)?;
    let parser = xml::Reader::new(file, args.buffer_size);
    let mut lexer = BlockingLexer::new();
    if args.parallel {
        lexer.run_asynchronous(parser, &ThreadExecutor::named("xmlscan-parser"));
    } else if let Err(err) = lexer.run_synchronous(parser) {
        // queued as well, it is reported once the scan reaches it
        debug!("Parse stopped early: {err}");
    }

    match (&args.tag, &args.text) {
        (Some(tag), _) => {
            let found = print_tags(&mut lexer, tag, &args.attr, args.regex)?;
            info!("Found {found} <{tag}> elements");
        }
        (None, Some(text)) => {
            let found = print_text(&mut lexer, text, args.regex)?;
            info!("Found {found} matching text spans");
        }
        (None, None) => summarize(&mut lexer)?,
    }
    Ok(())
}

fn value_pattern(value: &str, regex: bool) -> std::result::Result<Pattern, regex::Error> {
    if regex {
        Pattern::regex(value)
    } else {
        Ok(Pattern::ignore_case(value))
    }
}

fn print_tags(lexer: &mut BlockingLexer, tag: &str, attrs: &[String], regex: bool) -> Result<usize> {
    let mut pairs = Vec::with_capacity(attrs.len() * 2);
    for attr in attrs {
        let (key, value) = attr
            .split_once('=')
            .ok_or_else(|| format!("attribute filter {attr:?} is not key=value"))?;
        pairs.push(key);
        pairs.push(value);
    }

    let mut found = 0;
    while let Some(event) = lexer.start_with(tag, |value| value_pattern(value, regex), &pairs)? {
        println!("{event}");
        found += 1;
    }
    Ok(found)
}

fn print_text(lexer: &mut BlockingLexer, text: &str, regex: bool) -> Result<usize> {
    let pattern = if regex {
        Pattern::regex(text)?
    } else {
        Pattern::literal(text)
    };

    let mut found = 0;
    while lexer.text(pattern.clone())?.is_some() {
        println!("{}", lexer.current_text()?.trim());
        found += 1;
    }
    Ok(found)
}

/// Walks every event, checking nesting and counting elements.
fn summarize(lexer: &mut BlockingLexer) -> Result<()> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut open: Vec<String> = Vec::new();
    let mut text_size = 0;
    while let Some(event) = lexer.next()? {
        trace!("Event: {event}");
        match event {
            Event::ElementStart { tag_name, .. } => {
                *counts.entry(tag_name.clone()).or_default() += 1;
                open.push(tag_name.clone());
            }
            Event::ElementEnd { tag_name } => match open.pop() {
                Some(name) if name == *tag_name => {}
                other => return Err(format!("</{tag_name}> closes {other:?}").into()),
            },
            Event::Text { content } => text_size += content.len(),
            _ => {}
        }
    }
    for name in &open {
        error!("Unclosed element: {name}");
    }

    info!("Element counts: {counts:?}");
    info!("Text size: {text_size} bytes");
    if !open.is_empty() {
        return Err("document ended with unclosed elements".into());
    }
    Ok(())
}
