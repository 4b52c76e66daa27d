//! Line transport for the gateway.
//!
//! Every message is one JSON object on its own line:
//!
//! ```text
//! {"type":"message","chat_id":1,"chat_kind":"private","text":"hi"}\n   (in)
//! {"chat_id":1,"text":"What?"}\n                                        (out)
//! ```
//!
//! Messages must not contain embedded newlines; compact JSON never does.

use std::io::{BufRead, BufReader, BufWriter, Stdin, Stdout, Write};

use crate::types::{InboundEvent, OutboundReply};
use crate::{BotError, BotResult};

/// Newline-delimited JSON transport over any reader/writer pair.
pub struct LineTransport<R, W> {
    reader: R,
    writer: W,
}

/// Transport over the process's stdin/stdout.
pub type StdioTransport = LineTransport<BufReader<Stdin>, BufWriter<Stdout>>;

impl StdioTransport {
    /// Creates a transport on stdin/stdout.
    pub fn stdio() -> Self {
        LineTransport::new(
            BufReader::new(std::io::stdin()),
            BufWriter::new(std::io::stdout()),
        )
    }
}

impl<R: BufRead, W: Write> LineTransport<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Reads the next event, skipping blank lines.
    ///
    /// Returns `TransportClosed` at end of input, `MalformedLine` for a line
    /// that is not UTF-8 and `Json` for a line that is not a valid event.
    /// The offending line is consumed in every case.
    pub fn read_event(&mut self) -> BotResult<InboundEvent> {
        loop {
            let mut buf = Vec::new();
            let bytes_read = self.reader.read_until(b'\n', &mut buf)?;

            if bytes_read == 0 {
                return Err(BotError::TransportClosed);
            }

            let line = String::from_utf8(buf)
                .map_err(|e| BotError::MalformedLine(e.utf8_error().to_string()))?;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let event: InboundEvent = serde_json::from_str(trimmed)?;
            tracing::trace!(chat_id = %event.chat_id(), "Received event");
            return Ok(event);
        }
    }

    /// Writes one reply and flushes it.
    pub fn write_reply(&mut self, reply: &OutboundReply) -> BotResult<()> {
        let body = serde_json::to_string(reply)?;

        self.writer.write_all(body.as_bytes())?;
        self.writer.write_all(b"\n")?;
        // Replies must reach the peer before the next event is read.
        self.writer.flush()?;

        tracing::trace!(chat_id = %reply.chat_id, "Sent reply");
        Ok(())
    }

    /// Consumes the transport, returning the writer.
    pub fn into_writer(self) -> W {
        self.writer
    }
}
