//! Request body streams.
//!
//! A [`RequestBody`] is a shared handle to one underlying byte stream.
//! The request context stores a handle; middleware may swap it for a
//! different one (a decompressing wrapper, a buffered replay, ...). Code
//! that needs to know whether the body changed compares handles with
//! [`RequestBody::ptr_eq`], which looks at the shared allocation and
//! never at the bytes.

use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;

use crate::error::BodyError;

/// Default chunk size for breaking buffered bodies into stream chunks (64 KB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// A type-erased, fallible async stream of byte chunks.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, BodyError>> + Send>>;

/// Yields a `Bytes` buffer in fixed-size chunks without copying.
///
/// Each `poll_next` returns a single `Bytes::slice()` sharing the
/// original allocation's refcount, so no per-chunk allocation occurs.
pub(crate) struct ChunkedBytesStream {
    buf: Bytes,
    chunk_size: usize,
    offset: usize,
}

impl ChunkedBytesStream {
    pub fn new(buf: Bytes, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be > 0");
        Self {
            buf,
            chunk_size,
            offset: 0,
        }
    }
}

impl Stream for ChunkedBytesStream {
    type Item = Result<Bytes, BodyError>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.offset >= this.buf.len() {
            return Poll::Ready(None);
        }
        let end = std::cmp::min(this.offset + this.chunk_size, this.buf.len());
        let chunk = this.buf.slice(this.offset..end);
        this.offset = end;
        Poll::Ready(Some(Ok(chunk)))
    }
}

/// A shared handle to the byte stream of one request body.
///
/// Clones refer to the same stream: bytes pulled through one clone are
/// gone for every other clone. Locking is confined to a single
/// `poll_next` call and never held across an await point.
#[derive(Clone)]
pub struct RequestBody {
    stream: Arc<Mutex<Option<ByteStream>>>,
}

impl RequestBody {
    fn from_boxed(stream: ByteStream) -> Self {
        Self {
            stream: Arc::new(Mutex::new(Some(stream))),
        }
    }

    /// A body that ends immediately.
    pub fn empty() -> Self {
        Self {
            stream: Arc::new(Mutex::new(None)),
        }
    }

    /// Wrap a buffered body, yielded in [`DEFAULT_CHUNK_SIZE`] chunks.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self::from_bytes_chunked(bytes, DEFAULT_CHUNK_SIZE)
    }

    /// Like [`from_bytes()`](RequestBody::from_bytes) but with a custom chunk size.
    pub fn from_bytes_chunked(bytes: impl Into<Bytes>, chunk_size: usize) -> Self {
        Self::from_boxed(Box::pin(ChunkedBytesStream::new(bytes.into(), chunk_size)))
    }

    /// Wrap an arbitrary chunk stream.
    pub fn from_stream(
        stream: impl Stream<Item = Result<Bytes, BodyError>> + Send + 'static,
    ) -> Self {
        Self::from_boxed(Box::pin(stream))
    }

    /// Returns `true` if both handles refer to the same underlying stream.
    pub fn ptr_eq(a: &RequestBody, b: &RequestBody) -> bool {
        Arc::ptr_eq(&a.stream, &b.stream)
    }

    /// Poll the next chunk from the underlying stream.
    pub fn poll_chunk(&self, cx: &mut Context<'_>) -> Poll<Option<Result<Bytes, BodyError>>> {
        let mut stream = self.stream.lock().expect("request body lock");
        match stream.as_mut() {
            Some(inner) => inner.as_mut().poll_next(cx),
            None => Poll::Ready(None),
        }
    }

    /// Drop the underlying stream, releasing whatever it holds.
    ///
    /// Every clone observes end-of-stream afterwards.
    pub fn close(&self) {
        let closed = self.stream.lock().expect("request body lock").take();
        drop(closed);
    }

    pub fn is_closed(&self) -> bool {
        self.stream.lock().expect("request body lock").is_none()
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestBody")
            .field("handle", &Arc::as_ptr(&self.stream))
            .finish()
    }
}

impl Stream for RequestBody {
    type Item = Result<Bytes, BodyError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.poll_chunk(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_sync(body: &RequestBody) -> Vec<Bytes> {
        let mut chunks = Vec::new();
        let mut cx = Context::from_waker(std::task::Waker::noop());
        loop {
            match body.poll_chunk(&mut cx) {
                Poll::Ready(Some(Ok(chunk))) => chunks.push(chunk),
                Poll::Ready(Some(Err(e))) => panic!("unexpected error: {e}"),
                Poll::Ready(None) => break,
                Poll::Pending => panic!("buffered body should never pend"),
            }
        }
        chunks
    }

    #[test]
    fn chunked_body_remainder() {
        let body = RequestBody::from_bytes_chunked(vec![0xBB; 3000], 1024);
        let chunks = collect_sync(&body);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 1024);
        assert_eq!(chunks[1].len(), 1024);
        assert_eq!(chunks[2].len(), 952);
    }

    #[test]
    fn chunked_body_is_zero_copy() {
        let original = Bytes::from(vec![0xFF; 8192]);
        let ptr_before = original.as_ptr();

        let body = RequestBody::from_bytes_chunked(original, 4096);
        let chunks = collect_sync(&body);

        assert_eq!(chunks[0].as_ptr(), ptr_before);
        assert_eq!(chunks[1].as_ptr(), ptr_before.wrapping_add(4096));
    }

    #[test]
    #[should_panic(expected = "chunk_size must be > 0")]
    fn zero_chunk_size_panics() {
        let _ = RequestBody::from_bytes_chunked(Bytes::new(), 0);
    }

    #[test]
    fn empty_body_ends_immediately() {
        assert!(collect_sync(&RequestBody::empty()).is_empty());
    }

    #[test]
    fn clones_share_one_stream() {
        let body = RequestBody::from_bytes_chunked("abcdef", 2);
        let clone = body.clone();
        let mut cx = Context::from_waker(std::task::Waker::noop());

        assert!(matches!(body.poll_chunk(&mut cx), Poll::Ready(Some(Ok(c))) if c == "ab"));
        assert!(matches!(clone.poll_chunk(&mut cx), Poll::Ready(Some(Ok(c))) if c == "cd"));
        assert!(RequestBody::ptr_eq(&body, &clone));
    }

    #[test]
    fn identity_is_not_content_equality() {
        let a = RequestBody::from_bytes("same");
        let b = RequestBody::from_bytes("same");
        assert!(!RequestBody::ptr_eq(&a, &b));
    }

    #[test]
    fn close_ends_stream_for_all_clones() {
        let body = RequestBody::from_bytes_chunked(vec![1u8; 10], 2);
        let clone = body.clone();
        let mut cx = Context::from_waker(std::task::Waker::noop());
        assert!(matches!(body.poll_chunk(&mut cx), Poll::Ready(Some(Ok(_)))));

        clone.close();
        clone.close();

        assert!(body.is_closed());
        assert!(matches!(body.poll_chunk(&mut cx), Poll::Ready(None)));
    }
}
