//! Conversion from `http` crate requests into a [`HttpContext`].
//!
//! The HTTP server (hyper or anything else speaking `http_body::Body`)
//! stays outside this crate; whatever it hands over is adapted here so
//! the body becomes a [`RequestBody`] stream.

use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures_core::Stream;
use http_body::Body;

use crate::body::RequestBody;
use crate::context::HttpContext;
use crate::error::BodyError;

/// Adapts an `http_body::Body` into a stream of data chunks.
///
/// Trailer frames are skipped.
struct DataFrames<B> {
    body: Pin<Box<B>>,
}

impl<B> Stream for DataFrames<B>
where
    B: Body<Data = Bytes>,
    B::Error: Display,
{
    type Item = Result<Bytes, BodyError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match self.body.as_mut().poll_frame(cx) {
                Poll::Ready(Some(Ok(frame))) => {
                    if let Ok(data) = frame.into_data() {
                        return Poll::Ready(Some(Ok(data)));
                    }
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(BodyError::new(e.to_string()))));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Wrap an `http_body::Body` as a [`RequestBody`].
pub fn body_from_http<B>(body: B) -> RequestBody
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Display,
{
    if body.is_end_stream() {
        return RequestBody::empty();
    }
    RequestBody::from_stream(DataFrames {
        body: Box::pin(body),
    })
}

/// Build a request context from an `http::Request`.
pub fn context_from_http<B>(request: http::Request<B>) -> HttpContext
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Display,
{
    let (parts, body) = request.into_parts();
    HttpContext::new(parts.method, parts.uri, parts.headers, body_from_http(body))
}
