//! Reading the service's own log file: a bounded tail and a live follower.

pub mod ws;

use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tokio::io::{AsyncReadExt, AsyncSeekExt};

pub const DEFAULT_TAIL_LINES: usize = 200;
pub const MAX_TAIL_LINES: usize = 1000;

const CHUNK: u64 = 8 * 1024;

/// Last `n` lines of a file, reading backwards in chunks so large files are not loaded whole.
/// A missing file yields no lines.
pub fn tail_lines(path: &Path, n: usize) -> io::Result<Vec<String>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let len = file.metadata()?.len();
    let mut position = len;
    let mut buffer: Vec<u8> = Vec::new();

    while position > 0 {
        let read_size = CHUNK.min(position);
        position -= read_size;
        file.seek(SeekFrom::Start(position))?;

        let mut chunk = vec![0u8; read_size as usize];
        file.read_exact(&mut chunk)?;
        chunk.extend_from_slice(&buffer);
        buffer = chunk;

        // One extra newline guarantees the first kept line is complete
        if buffer.iter().filter(|b| **b == b'\n').count() > n {
            break;
        }
    }

    let text = String::from_utf8_lossy(&buffer);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    Ok(lines[start..].iter().map(|l| l.to_string()).collect())
}

/// Clamp a client supplied line count
pub fn clamp_lines(requested: Option<usize>) -> usize {
    requested.unwrap_or(DEFAULT_TAIL_LINES).clamp(1, MAX_TAIL_LINES)
}

/// Follows whichever file `locate` returns, so daily rotation switches files
/// and a truncated file is re-read from the start
pub struct LogFollower {
    locate: Box<dyn Fn() -> PathBuf + Send + Sync>,
    path: PathBuf,
    position: u64,
    partial: Vec<u8>,
}

impl LogFollower {
    /// Start at the current end of the file; only lines written afterwards are yielded
    pub async fn from_end(locate: impl Fn() -> PathBuf + Send + Sync + 'static) -> Self {
        let path = locate();
        let position = tokio::fs::metadata(&path).await.map(|m| m.len()).unwrap_or(0);
        Self {
            locate: Box::new(locate),
            path,
            position,
            partial: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Complete lines appended since the previous poll
    pub async fn poll(&mut self) -> io::Result<Vec<String>> {
        let current = (self.locate)();
        if current != self.path {
            tracing::debug!(from = %self.path.display(), to = %current.display(), "Log file rotated");
            self.path = current;
            self.position = 0;
            self.partial.clear();
        }

        let mut file = match tokio::fs::File::open(&self.path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let len = file.metadata().await?.len();
        if len < self.position {
            self.position = 0;
            self.partial.clear();
        }
        if len == self.position {
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.position)).await?;
        let mut appended = Vec::with_capacity((len - self.position) as usize);
        file.take(len - self.position).read_to_end(&mut appended).await?;
        self.position += appended.len() as u64;

        self.partial.extend_from_slice(&appended);
        let Some(last_newline) = self.partial.iter().rposition(|b| *b == b'\n') else {
            return Ok(Vec::new());
        };

        let complete: Vec<u8> = self.partial.drain(..=last_newline).collect();
        Ok(String::from_utf8_lossy(&complete).lines().map(str::to_string).collect())
    }
}
