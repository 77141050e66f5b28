//! Streaming HTTP response assembly
//!
//! Accumulates raw bytes read off a tunnel, splits headers from body at the
//! first CRLFCRLF and resolves its outcome channel exactly once.

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::oneshot;
use tracing::{debug, warn};

use crate::error::{BridgeError, Result};

const HEADER_DELIMITER: &[u8] = b"\r\n\r\n";
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Status reported when the header block has no parsable status line
pub const DEFAULT_STATUS_CODE: u16 = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    AwaitingHeaders,
    ReceivingBody,
    Done,
}

/// Fully received response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledResponse {
    pub status_code: u16,
    pub header_block: String,
    pub body: Bytes,
    pub complete: bool,
}

impl AssembledResponse {
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

pub struct ResponseAssembler {
    state: AssemblerState,
    buffer: BytesMut,
    header_block: String,
    body: BytesMut,
    scanned: usize,
    resolver: Option<oneshot::Sender<Result<AssembledResponse>>>,
}

impl ResponseAssembler {
    /// Create an assembler and the receiver its single outcome is sent to
    pub fn new() -> (Self, oneshot::Receiver<Result<AssembledResponse>>) {
        let (tx, rx) = oneshot::channel();
        let assembler = Self {
            state: AssemblerState::AwaitingHeaders,
            buffer: BytesMut::new(),
            header_block: String::new(),
            body: BytesMut::new(),
            scanned: 0,
            resolver: Some(tx),
        };
        (assembler, rx)
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == AssemblerState::Done
    }

    pub fn on_chunk(&mut self, chunk: &[u8]) {
        match self.state {
            AssemblerState::AwaitingHeaders => {
                self.buffer.extend_from_slice(chunk);

                // The delimiter may straddle the previous chunk.
                let start = self.scanned.saturating_sub(HEADER_DELIMITER.len() - 1);
                match find_delimiter(&self.buffer[start..]) {
                    Some(offset) => {
                        let at = start + offset;
                        let body = self.buffer.split_off(at + HEADER_DELIMITER.len());
                        self.buffer.truncate(at);
                        self.header_block = String::from_utf8_lossy(&self.buffer).into_owned();
                        self.body = body;
                        self.buffer.clear();
                        self.state = AssemblerState::ReceivingBody;
                        debug!(
                            header_bytes = at,
                            "Header block received, streaming body"
                        );
                    }
                    None => self.scanned = self.buffer.len(),
                }
            }
            AssemblerState::ReceivingBody => self.body.extend_from_slice(chunk),
            AssemblerState::Done => {}
        }
    }

    pub fn on_end(&mut self) {
        if self.is_done() {
            return;
        }

        if self.state == AssemblerState::AwaitingHeaders {
            // Peer closed before the blank line; keep what arrived as headers.
            self.header_block = String::from_utf8_lossy(&self.buffer).into_owned();
            self.buffer.clear();
        }
        self.state = AssemblerState::Done;

        let status_code = match parse_status_code(&self.header_block) {
            Some(code) => code,
            None => {
                warn!(
                    "No HTTP status line in response, assuming {}",
                    DEFAULT_STATUS_CODE
                );
                DEFAULT_STATUS_CODE
            }
        };

        let response = AssembledResponse {
            status_code,
            header_block: std::mem::take(&mut self.header_block),
            body: std::mem::take(&mut self.body).freeze(),
            complete: true,
        };
        self.resolve(Ok(response));
    }

    /// Partial data is discarded
    pub fn on_error(&mut self, err: std::io::Error) {
        if self.is_done() {
            return;
        }

        self.state = AssemblerState::Done;
        self.buffer.clear();
        self.body.clear();
        self.header_block.clear();
        self.resolve(Err(BridgeError::StreamError(err.to_string())));
    }

    /// Pump a reader into the assembler until a terminal event
    pub async fn consume<R>(&mut self, reader: &mut R)
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let mut buf = vec![0u8; READ_BUFFER_SIZE];

        while !self.is_done() {
            match reader.read(&mut buf).await {
                Ok(0) => self.on_end(),
                Ok(n) => self.on_chunk(&buf[..n]),
                Err(e) => self.on_error(e),
            }
        }
    }

    fn resolve(&mut self, outcome: Result<AssembledResponse>) {
        if let Some(tx) = self.resolver.take() {
            // Owner may have stopped waiting (deadline); nothing to report then.
            let _ = tx.send(outcome);
        }
    }
}

fn find_delimiter(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(HEADER_DELIMITER.len())
        .position(|window| window == HEADER_DELIMITER)
}

/// Status code from a leading `HTTP/<version> <code>` line
pub fn parse_status_code(header_block: &str) -> Option<u16> {
    let first_line = header_block.lines().next()?;
    let rest = first_line.strip_prefix("HTTP/")?;

    let version_len = rest
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(rest.len());
    if version_len == 0 {
        return None;
    }

    let rest = &rest[version_len..];
    let code = rest.trim_start();
    if code.len() == rest.len() {
        return None;
    }

    let digits_len = code
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(code.len());
    code[..digits_len].parse().ok()
}
