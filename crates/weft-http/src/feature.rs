//! Per-request body reader feature.
//!
//! [`RequestBodyPipeFeature`] hands out one [`BodyReader`] per request.
//! The reader is built lazily on first access and cached. If the
//! request's body stream is replaced (say by a decompression middleware)
//! the next access notices the new stream identity and builds a fresh
//! reader over it.
//!
//! Every build registers a completion callback on the response that
//! completes the reader it just built. A reader that was replaced by a
//! rebuild is not completed here; its own callback still runs when the
//! response completes.

use tracing::debug;

use crate::body::RequestBody;
use crate::context::HttpContext;
use crate::error::{HttpError, HttpResult};
use crate::reader::{BodyReader, ReaderOptions};

struct WrappedReader {
    body: RequestBody,
    reader: BodyReader,
}

pub struct RequestBodyPipeFeature {
    context: HttpContext,
    options: ReaderOptions,
    wrapped: Option<WrappedReader>,
}

impl RequestBodyPipeFeature {
    pub fn new(context: &HttpContext) -> Self {
        Self::with_options(context, ReaderOptions::default())
    }

    pub fn with_options(context: &HttpContext, options: ReaderOptions) -> Self {
        Self {
            context: context.clone(),
            options,
            wrapped: None,
        }
    }

    /// Build the feature from a context that may be missing.
    pub fn from_context(context: Option<&HttpContext>) -> HttpResult<Self> {
        let context = context.ok_or(HttpError::MissingContext)?;
        Ok(Self::new(context))
    }

    pub fn context(&self) -> &HttpContext {
        &self.context
    }

    /// The reader over the request's current body stream.
    pub fn reader(&mut self) -> BodyReader {
        let body = self.context.request_body();

        if let Some(wrapped) = &self.wrapped {
            if RequestBody::ptr_eq(&wrapped.body, &body) {
                return wrapped.reader.clone();
            }
            debug!(uri = %self.context.uri(), "request body replaced; rebuilding body reader");
        }

        let reader = BodyReader::with_options(body.clone(), self.options);
        let on_completed = reader.clone();
        self.context
            .response()
            .on_completed(move || on_completed.complete());

        self.wrapped = Some(WrappedReader {
            body,
            reader: reader.clone(),
        });
        reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{HeaderMap, Method, Uri};

    fn context(body: &'static str) -> HttpContext {
        HttpContext::new(
            Method::POST,
            Uri::from_static("/"),
            HeaderMap::new(),
            RequestBody::from_bytes(body),
        )
    }

    #[test]
    fn missing_context_is_rejected() {
        assert!(matches!(
            RequestBodyPipeFeature::from_context(None),
            Err(HttpError::MissingContext)
        ));
        let ctx = context("x");
        assert!(RequestBodyPipeFeature::from_context(Some(&ctx)).is_ok());
    }

    #[test]
    fn reader_is_cached_while_body_is_unchanged() {
        let ctx = context("abc");
        let mut feature = RequestBodyPipeFeature::new(&ctx);
        let first = feature.reader();
        let second = feature.reader();
        assert!(BodyReader::ptr_eq(&first, &second));
        assert_eq!(ctx.response().pending_callbacks(), 1);
    }

    #[test]
    fn swapped_body_rebuilds_reader() {
        let ctx = context("abc");
        let mut feature = RequestBodyPipeFeature::new(&ctx);
        let first = feature.reader();

        ctx.set_request_body(RequestBody::from_bytes("xyz"));
        let second = feature.reader();

        assert!(!BodyReader::ptr_eq(&first, &second));
        assert!(!first.is_completed());
        assert_eq!(ctx.response().pending_callbacks(), 2);
    }

    #[test]
    fn no_access_registers_nothing() {
        let ctx = context("abc");
        let _feature = RequestBodyPipeFeature::new(&ctx);
        assert_eq!(ctx.response().pending_callbacks(), 0);
        assert_eq!(ctx.response().complete(), 0);
    }

    #[test]
    fn response_completion_completes_reader() {
        let ctx = context("abc");
        let mut feature = RequestBodyPipeFeature::new(&ctx);
        let reader = feature.reader();

        ctx.response().complete();
        assert!(reader.is_completed());
        assert!(ctx.request_body().is_closed());
    }
}
