//! Line-record reading over a single split, with boundary-correct
//! attribution between neighboring splits of the same target.

use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::sync::Arc;

use manifold_core::types::{FileSplit, Record};
use manifold_fs::{Fs, FsError, ReadSeek};
use tracing::debug;

use crate::InputMetrics;

/// A lazy, finite, forward-only stream of line records.
///
/// There is no rewind: restarting means recreating the source from the same
/// split value.
pub trait RecordSource {
    fn next_record(&mut self) -> std::io::Result<Option<Record>>;
}

/// Reads the lines of one [`FileSplit`].
///
/// A reader returns exactly the lines whose first byte lies inside its
/// range. To find the first owned line, a reader whose range starts past 0
/// backs up one byte and discards through the next terminator: when the
/// range begins exactly at a line start only the previous line's terminator
/// is consumed. A line straddling the range end is read to its terminator;
/// no line is begun at or past the end. Across a target's full split
/// sequence every line is therefore returned exactly once.
///
/// The reader owns its file handle; dropping it releases the handle.
pub struct LineRecordReader {
    input: BufReader<Box<dyn ReadSeek>>,
    pos: u64,
    end: u64,
    buf: Vec<u8>,
    metrics: Option<Arc<InputMetrics>>,
}

impl std::fmt::Debug for LineRecordReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineRecordReader")
            .field("pos", &self.pos)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

impl LineRecordReader {
    /// Opens `split.path` through `fs` and positions at the first owned
    /// line. Open and read failures carry the underlying I/O error
    /// unchanged; nothing is retried.
    pub fn open(fs: &dyn Fs, split: &FileSplit) -> Result<Self, FsError> {
        debug!(
            target: "manifold_proof",
            event = "split_opened",
            path = %split.path.display(),
            start = split.start,
            len = split.len,
            "opening split"
        );
        let stream = fs.open_read(&split.path)?;
        Self::from_stream(stream, split.start, split.len).map_err(FsError::Io)
    }

    /// Builds a reader over an already-open seekable stream. Exposed so the
    /// boundary handling can run over any byte source.
    pub fn from_stream(
        stream: Box<dyn ReadSeek>,
        start: u64,
        len: u64,
    ) -> std::io::Result<Self> {
        let end = start.saturating_add(len);
        let mut input = BufReader::new(stream);
        let mut pos = start;
        if start > 0 {
            input.seek(SeekFrom::Start(start - 1))?;
            let mut fragment = Vec::new();
            let skipped = read_line_bytes(&mut input, &mut fragment)?;
            pos = start - 1 + skipped;
        } else {
            input.seek(SeekFrom::Start(0))?;
        }
        Ok(Self {
            input,
            pos,
            end,
            buf: Vec::new(),
            metrics: None,
        })
    }

    pub(crate) fn with_metrics(mut self, metrics: Arc<InputMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Byte offset at which the next record would begin.
    pub fn position(&self) -> u64 {
        self.pos
    }
}

impl RecordSource for LineRecordReader {
    fn next_record(&mut self) -> std::io::Result<Option<Record>> {
        // A line begun at or past the nominal end belongs to the next split.
        if self.pos >= self.end {
            return Ok(None);
        }
        let consumed = read_line_bytes(&mut self.input, &mut self.buf)?;
        if consumed == 0 {
            return Ok(None);
        }
        let position = self.pos;
        self.pos += consumed;
        if let Some(metrics) = &self.metrics {
            metrics.records_delivered_total.inc();
        }
        Ok(Some(Record {
            position,
            line: trim_terminator(&self.buf),
        }))
    }
}

/// Reads one terminator-inclusive line into `buf`, returning the number of
/// bytes consumed (0 at end of stream).
fn read_line_bytes<R: BufRead>(input: &mut R, buf: &mut Vec<u8>) -> std::io::Result<u64> {
    buf.clear();
    let n = input.read_until(b'\n', buf)?;
    Ok(n as u64)
}

fn trim_terminator(bytes: &[u8]) -> String {
    let line = match bytes.strip_suffix(b"\n") {
        Some(rest) => rest.strip_suffix(b"\r").unwrap_or(rest),
        None => bytes,
    };
    String::from_utf8_lossy(line).into_owned()
}
