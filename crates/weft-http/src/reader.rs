//! Pull-based reader over a request body.
//!
//! [`BodyReader`] buffers chunks pulled from a [`RequestBody`] and hands
//! them out on demand. The caller reports progress with
//! [`advance_to()`](BodyReader::advance_to): consumed bytes leave the
//! buffer, examined-but-unconsumed bytes stay and the next read waits for
//! more data instead of returning the same bytes again. Nothing is pulled
//! from the stream until a read asks for it, so a slow consumer pushes
//! back on the producer.

use std::fmt;
use std::future::poll_fn;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, Waker};

use bytes::{Buf, Bytes, BytesMut};
use tracing::debug;
use weft_core::ReaderConfig;
use weft_core::config::{DEFAULT_BUFFER_SIZE, DEFAULT_MINIMUM_READ_SIZE};

use crate::body::RequestBody;
use crate::error::{BodyError, HttpError, HttpResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Initial capacity used when buffered data and a new chunk are merged.
    pub buffer_size: usize,
    /// A read keeps pulling ready chunks until this many new bytes arrived.
    pub minimum_read_size: usize,
    /// When false, [`BodyReader::complete`] also closes the wrapped body.
    pub leave_open: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            minimum_read_size: DEFAULT_MINIMUM_READ_SIZE,
            leave_open: false,
        }
    }
}

impl From<&ReaderConfig> for ReaderOptions {
    fn from(config: &ReaderConfig) -> Self {
        Self {
            buffer_size: config.buffer_size.max(1),
            minimum_read_size: config.minimum_read_size.max(1),
            leave_open: config.leave_open,
        }
    }
}

/// Outcome of a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadResult {
    /// Every buffered byte not yet consumed.
    pub buffer: Bytes,
    /// The body stream has ended; no more bytes will be buffered.
    pub is_completed: bool,
    /// The read was cut short by [`BodyReader::cancel_pending_read`].
    pub is_canceled: bool,
}

/// Pull-based reader over one [`RequestBody`].
///
/// Cheap to clone; clones share the same buffer and position.
#[derive(Clone)]
pub struct BodyReader {
    inner: Arc<ReaderInner>,
}

struct ReaderInner {
    options: ReaderOptions,
    state: Mutex<ReaderState>,
}

struct ReaderState {
    body: Option<RequestBody>,
    buffer: Bytes,
    examined: usize,
    stream_ended: bool,
    pending_error: Option<BodyError>,
    reading: bool,
    cancel_requested: bool,
    completed: bool,
    waker: Option<Waker>,
}

impl ReaderState {
    fn append(&mut self, chunk: Bytes, buffer_size: usize) {
        if self.buffer.is_empty() {
            self.buffer = chunk;
            return;
        }
        let capacity = std::cmp::max(buffer_size, self.buffer.len() + chunk.len());
        let mut merged = BytesMut::with_capacity(capacity);
        merged.extend_from_slice(&self.buffer);
        merged.extend_from_slice(&chunk);
        self.buffer = merged.freeze();
    }

    fn hand_out(&mut self, is_canceled: bool) -> ReadResult {
        self.reading = true;
        ReadResult {
            buffer: self.buffer.clone(),
            is_completed: self.stream_ended,
            is_canceled,
        }
    }

    /// A read that can be answered without touching the stream.
    fn ready(&mut self) -> Option<HttpResult<ReadResult>> {
        if self.completed {
            return Some(Err(HttpError::ReaderCompleted));
        }
        if self.reading {
            return Some(Err(HttpError::ReadInProgress));
        }
        if self.cancel_requested {
            self.cancel_requested = false;
            return Some(Ok(self.hand_out(true)));
        }
        if let Some(err) = self.pending_error.take() {
            return Some(Err(err.into()));
        }
        if self.buffer.len() > self.examined || self.stream_ended {
            return Some(Ok(self.hand_out(false)));
        }
        None
    }
}

impl BodyReader {
    pub fn new(body: RequestBody) -> Self {
        Self::with_options(body, ReaderOptions::default())
    }

    pub fn with_options(body: RequestBody, options: ReaderOptions) -> Self {
        Self {
            inner: Arc::new(ReaderInner {
                options,
                state: Mutex::new(ReaderState {
                    body: Some(body),
                    buffer: Bytes::new(),
                    examined: 0,
                    stream_ended: false,
                    pending_error: None,
                    reading: false,
                    cancel_requested: false,
                    completed: false,
                    waker: None,
                }),
            }),
        }
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.inner.options
    }

    /// Returns `true` if both handles are the same reader.
    pub fn ptr_eq(a: &BodyReader, b: &BodyReader) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, ReaderState> {
        self.inner.state.lock().expect("body reader state")
    }

    /// Read buffered data, pulling from the body stream when every
    /// buffered byte has already been examined.
    pub async fn read(&self) -> HttpResult<ReadResult> {
        poll_fn(|cx| self.poll_read(cx)).await
    }

    pub fn poll_read(&self, cx: &mut Context<'_>) -> Poll<HttpResult<ReadResult>> {
        let mut state = self.state();
        if let Some(result) = state.ready() {
            return Poll::Ready(result);
        }

        let Some(body) = state.body.clone() else {
            state.stream_ended = true;
            return Poll::Ready(Ok(state.hand_out(false)));
        };

        let mut pulled = 0;
        loop {
            match body.poll_chunk(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    if chunk.is_empty() {
                        continue;
                    }
                    pulled += chunk.len();
                    state.append(chunk, self.inner.options.buffer_size);
                    if pulled >= self.inner.options.minimum_read_size {
                        break;
                    }
                }
                Poll::Ready(Some(Err(err))) => {
                    if pulled == 0 {
                        return Poll::Ready(Err(err.into()));
                    }
                    // Hand out what arrived first; the error surfaces next read.
                    state.pending_error = Some(err);
                    break;
                }
                Poll::Ready(None) => {
                    state.stream_ended = true;
                    break;
                }
                Poll::Pending => {
                    if pulled > 0 {
                        break;
                    }
                    state.waker = Some(cx.waker().clone());
                    return Poll::Pending;
                }
            }
        }

        Poll::Ready(Ok(state.hand_out(false)))
    }

    /// Non-blocking read: `Some` when data can be handed out without
    /// waiting on the stream.
    pub fn try_read(&self) -> Option<HttpResult<ReadResult>> {
        self.state().ready()
    }

    /// Report progress on the last read. `consumed` bytes are dropped
    /// from the buffer; bytes up to `examined` will not be handed out
    /// again until more data arrives.
    pub fn advance_to(&self, consumed: usize, examined: usize) -> HttpResult<()> {
        let mut state = self.state();
        if state.completed {
            return Err(HttpError::ReaderCompleted);
        }
        if !state.reading {
            return Err(HttpError::NoReadInProgress);
        }
        let buffered = state.buffer.len();
        if consumed > examined || examined > buffered {
            return Err(HttpError::InvalidAdvance {
                consumed,
                examined,
                buffered,
            });
        }
        state.buffer.advance(consumed);
        state.examined = examined - consumed;
        state.reading = false;
        Ok(())
    }

    /// Shorthand for `advance_to(consumed, consumed)`.
    pub fn advance(&self, consumed: usize) -> HttpResult<()> {
        self.advance_to(consumed, consumed)
    }

    /// Make the current or next read return right away with
    /// `is_canceled` set.
    pub fn cancel_pending_read(&self) {
        let waker = {
            let mut state = self.state();
            state.cancel_requested = true;
            state.waker.take()
        };
        if let Some(waker) = waker {
            waker.wake();
        }
    }

    /// Mark the reader complete and release its buffer and stream.
    ///
    /// Unless `leave_open` is set, the wrapped [`RequestBody`] is closed
    /// too. Calling this more than once has no further effect.
    pub fn complete(&self) {
        let (body, waker) = {
            let mut state = self.state();
            if state.completed {
                return;
            }
            state.completed = true;
            state.buffer = Bytes::new();
            state.examined = 0;
            state.pending_error = None;
            (state.body.take(), state.waker.take())
        };

        if let Some(body) = body {
            if !self.inner.options.leave_open {
                body.close();
            }
        }
        if let Some(waker) = waker {
            waker.wake();
        }
        debug!(leave_open = self.inner.options.leave_open, "body reader completed");
    }

    pub fn is_completed(&self) -> bool {
        self.state().completed
    }

    /// Drain the rest of the body into one buffer.
    pub async fn read_to_end(&self) -> HttpResult<Bytes> {
        let mut collected = BytesMut::new();
        loop {
            let result = self.read().await?;
            collected.extend_from_slice(&result.buffer);
            self.advance(result.buffer.len())?;
            if result.is_completed {
                return Ok(collected.freeze());
            }
        }
    }
}

impl fmt::Debug for BodyReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("BodyReader")
            .field("buffered", &state.buffer.len())
            .field("examined", &state.examined)
            .field("stream_ended", &state.stream_ended)
            .field("completed", &state.completed)
            .finish()
    }
}
