//! Weft HTTP abstractions with a pull-based request body reader.
//!
//! # Body reading model
//!
//! A request's body is a [`RequestBody`]: a shared handle to one byte
//! stream, stored in the request's [`HttpContext`]. Middleware may swap
//! the handle for another stream at any point.
//!
//! [`RequestBodyPipeFeature`] exposes the body as a [`BodyReader`]. The
//! reader is created on first access and cached for the rest of the
//! request; when the context's body handle is no longer the one the
//! cached reader wraps, a new reader is built over the new stream.
//! Each reader built this way is completed when the response completes
//! (see [`Response::complete`]), whether or not anything was read.
//!
//! Reading is pull-based: nothing is taken from the stream until a read
//! asks for it, and bytes stay buffered until the caller reports them
//! consumed with [`BodyReader::advance_to`].
//!
//! # Abandoned requests
//!
//! Completion hangs off the response lifecycle. If a request is aborted
//! and [`Response::complete`] is never called, readers are not completed
//! by this crate; the host must call one of the two explicitly.

mod body;
mod context;
mod convert;
mod error;
mod feature;
mod reader;

pub use body::{ByteStream, DEFAULT_CHUNK_SIZE, RequestBody};
pub use context::{HttpContext, Response};
pub use convert::{body_from_http, context_from_http};
pub use error::{BodyError, HttpError, HttpResult};
pub use feature::RequestBodyPipeFeature;
pub use reader::{BodyReader, ReadResult, ReaderOptions};
