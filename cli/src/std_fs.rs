use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use embedded_io::ErrorType;
use log::info;

/// A host file exposed through `embedded_io`, which is what the parser reads.
pub struct StdFileReader {
    file: BufReader<File>,
}

impl StdFileReader {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        info!("Opened {} ({} bytes)", path.display(), file.metadata()?.len());
        Ok(StdFileReader {
            file: BufReader::new(file),
        })
    }
}

impl ErrorType for StdFileReader {
    type Error = std::io::Error;
}

impl embedded_io::Read for StdFileReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        use std::io::Read;
        self.file.read(buf)
    }
}
