//! Incremental tailing of a growing log file
//!
//! Works like `tail -f`: only complete, newline-terminated lines are handed
//! out. A partial line at EOF is left unread until its newline arrives.

use std::io::{self, SeekFrom};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncSeekExt, BufReader};
use tracing::{debug, trace};

use crate::config::ConfigError;

/// Text encoding of the monitored file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// UTF-8; invalid sequences become U+FFFD
    #[default]
    Utf8,
    /// ISO-8859-1, one byte per char
    Latin1,
}

impl TextEncoding {
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            TextEncoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            TextEncoding::Latin1 => bytes.iter().map(|&b| b as char).collect(),
        }
    }
}

impl FromStr for TextEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "utf-8" | "utf8" => Ok(TextEncoding::Utf8),
            "latin-1" | "latin1" | "iso-8859-1" => Ok(TextEncoding::Latin1),
            other => Err(ConfigError::UnsupportedEncoding(other.to_string())),
        }
    }
}

/// Tailing reader over one log file
pub struct LogTail {
    path: PathBuf,
    reader: BufReader<File>,
    encoding: TextEncoding,
    buf: Vec<u8>,
}

impl LogTail {
    /// Open `path` for tailing.
    ///
    /// Unless `start_from_beginning` is set, the cursor is placed at EOF so only
    /// lines appended from now on are seen.
    pub async fn open(
        path: &Path,
        start_from_beginning: bool,
        encoding: TextEncoding,
    ) -> io::Result<Self> {
        let file = File::open(path).await?;
        let mut reader = BufReader::new(file);

        if !start_from_beginning {
            let end = reader.seek(SeekFrom::End(0)).await?;
            debug!(path = %path.display(), offset = end, "Positioned at end of file");
        }

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            encoding,
            buf: Vec::new(),
        })
    }

    /// Read the next complete line, if one is available.
    ///
    /// Returns `Ok(None)` at EOF or when only a partial line is present; the
    /// cursor is then back where it was before the call.
    pub async fn try_next_line(&mut self) -> io::Result<Option<String>> {
        let start = self.reader.stream_position().await?;

        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf).await?;

        if read == 0 || self.buf.last() != Some(&b'\n') {
            if read > 0 {
                trace!(
                    path = %self.path.display(),
                    partial_bytes = read,
                    "Incomplete line, rewinding"
                );
            }
            self.reader.seek(SeekFrom::Start(start)).await?;
            return Ok(None);
        }

        let mut line = self.buf.as_slice();
        line = line.strip_suffix(b"\n").unwrap_or(line);
        line = line.strip_suffix(b"\r").unwrap_or(line);

        Ok(Some(self.encoding.decode(line)))
    }

    /// Current read offset in bytes
    pub async fn position(&mut self) -> io::Result<u64> {
        self.reader.stream_position().await
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
