//! Line-complete block reader
//!
//! Turns an arbitrary byte source into [`LineBlock`]s that always end on a
//! newline, so later stages never see a line torn across two reads.

use crate::{
    config::EngineConfig,
    error::{EngineError, ErrorSink, Result},
    stage::spawn_stage,
    types::LineBlock,
};
use crossbeam_channel::{bounded, Receiver};
use std::io::{ErrorKind, Read};

/// Bytes requested from the source per read
pub const READ_SIZE: usize = 65536;

/// Extra room at the head of the buffer for the carried remainder
pub const RESERVE_SIZE: usize = 16384;

/// Outcome of one buffer fill
enum Fill {
    /// `buffer[..n]` ends with a newline
    Lines(usize),
    /// `buffer[..n]` has no newline yet; keep reading
    Partial(usize),
    /// Source exhausted or failed
    Closed,
}

/// Reads a byte source and yields blocks of complete lines.
///
/// Bytes after the last newline of a read are carried into the next one. A
/// line longer than the buffer is assembled across as many reads as it takes.
/// Trailing bytes that never see a newline before end-of-stream are dropped.
pub struct BlockReader<R> {
    reader: R,
    buffer: Vec<u8>,
    remainder: Vec<u8>,
    reserve_size: usize,
    bytes_read: u64,
    closed: bool,
    errors: ErrorSink,
}

impl<R: Read> BlockReader<R> {
    /// Create a reader with the default buffer sizes
    pub fn new(reader: R) -> Self {
        Self::with_sizes(reader, READ_SIZE, RESERVE_SIZE, ErrorSink::discard())
    }

    /// Create a reader using the sizes from `config`
    pub fn with_config(reader: R, config: &EngineConfig, errors: ErrorSink) -> Self {
        Self::with_sizes(reader, config.read_size, config.reserve_size, errors)
    }

    fn with_sizes(reader: R, read_size: usize, reserve_size: usize, errors: ErrorSink) -> Self {
        Self {
            reader,
            buffer: vec![0; read_size + reserve_size],
            remainder: Vec::with_capacity(reserve_size),
            reserve_size,
            bytes_read: 0,
            closed: false,
            errors,
        }
    }

    /// Total bytes consumed from the source so far
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Next block of complete lines, or the sentinel once the source is done
    pub fn next_block(&mut self) -> LineBlock {
        let mut pending = Vec::new();

        loop {
            match self.next_buffer() {
                Fill::Closed => return LineBlock::sentinel(),
                Fill::Lines(len) => {
                    pending.extend_from_slice(&self.buffer[..len]);
                    break;
                }
                Fill::Partial(len) => pending.extend_from_slice(&self.buffer[..len]),
            }
        }

        LineBlock::from(pending)
    }

    fn next_buffer(&mut self) -> Fill {
        if self.closed {
            return Fill::Closed;
        }

        let carried = self.remainder.len();
        self.buffer[..carried].copy_from_slice(&self.remainder);
        self.remainder.clear();

        if carried > self.reserve_size {
            // no room left to read behind it; pass it on and keep going
            return Fill::Partial(carried);
        }

        let count = match self.read_into(carried) {
            Ok(Some(count)) => count,
            Ok(None) => {
                self.closed = true;
                return Fill::Closed;
            }
            Err(err) => {
                // a failed read may have left garbage in the buffer
                self.errors.report(EngineError::from(err));
                self.closed = true;
                return Fill::Closed;
            }
        };

        self.bytes_read += count as u64;
        let filled = carried + count;

        match memchr::memrchr(b'\n', &self.buffer[..filled]) {
            Some(pos) => {
                let end = pos + 1;
                self.remainder.extend_from_slice(&self.buffer[end..filled]);
                Fill::Lines(end)
            }
            None => Fill::Partial(filled),
        }
    }

    /// Read behind `offset`. `Ok(None)` means end-of-stream.
    fn read_into(&mut self, offset: usize) -> std::io::Result<Option<usize>> {
        let space = self.buffer.len() - offset;
        loop {
            match self.reader.read(&mut self.buffer[offset..]) {
                Ok(0) => return Ok(None),
                Ok(count) if count > space => {
                    log::warn!(
                        "reader reported {count} bytes for a {space} byte buffer, treating as 0"
                    );
                    return Ok(Some(0));
                }
                Ok(count) => return Ok(Some(count)),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err),
            }
        }
    }
}

impl<R: Read> Iterator for BlockReader<R> {
    type Item = LineBlock;

    fn next(&mut self) -> Option<LineBlock> {
        let block = self.next_block();
        (!block.is_sentinel()).then_some(block)
    }
}

/// Start a stage that reads `reader` and sends line blocks downstream.
///
/// The stage sends the empty sentinel last and then closes the queue. Read
/// failures go to `errors` and end the stream early.
pub fn create_text_streamer<R>(
    reader: R,
    config: &EngineConfig,
    errors: ErrorSink,
) -> Result<Receiver<LineBlock>>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = bounded(config.queue_capacity);
    let mut blocks = BlockReader::with_config(reader, config, errors);

    spawn_stage("text-streamer", move || loop {
        let block = blocks.next_block();
        let done = block.is_sentinel();
        if tx.send(block).is_err() || done {
            log::debug!("text-streamer read {} bytes", blocks.bytes_read());
            break;
        }
    })?;

    Ok(rx)
}
