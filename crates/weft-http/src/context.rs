//! Per-request context and the response completion lifecycle.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

use http::{HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use tracing::{debug, error, warn};

use crate::body::RequestBody;

type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Shared handle to the state of one in-flight request.
///
/// Clones point at the same request. The request head is fixed at
/// construction; the body slot can be swapped by middleware through
/// [`set_request_body()`](HttpContext::set_request_body).
#[derive(Clone)]
pub struct HttpContext {
    inner: Arc<ContextInner>,
}

struct ContextInner {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Mutex<RequestBody>,
    response: Response,
}

impl HttpContext {
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: RequestBody) -> Self {
        Self {
            inner: Arc::new(ContextInner {
                method,
                uri,
                headers,
                body: Mutex::new(body),
                response: Response::new(),
            }),
        }
    }

    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    pub fn uri(&self) -> &Uri {
        &self.inner.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    /// The body stream currently installed on the request.
    pub fn request_body(&self) -> RequestBody {
        self.inner.body.lock().expect("request body slot").clone()
    }

    /// Install a different body stream. The previous handle is returned
    /// untouched; it is not closed.
    pub fn set_request_body(&self, body: RequestBody) -> RequestBody {
        let mut slot = self.inner.body.lock().expect("request body slot");
        std::mem::replace(&mut *slot, body)
    }

    pub fn response(&self) -> &Response {
        &self.inner.response
    }

    /// Returns `true` if both handles refer to the same request.
    pub fn ptr_eq(a: &HttpContext, b: &HttpContext) -> bool {
        Arc::ptr_eq(&a.inner, &b.inner)
    }
}

impl std::fmt::Debug for HttpContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpContext")
            .field("method", &self.inner.method)
            .field("uri", &self.inner.uri)
            .field("completed", &self.inner.response.has_completed())
            .finish()
    }
}

/// The response side of a request: status, headers, and the
/// completion callbacks that run once the response has been sent.
pub struct Response {
    status: AtomicU16,
    headers: Mutex<HeaderMap>,
    on_completed: Mutex<Vec<CompletionCallback>>,
    completed: AtomicBool,
}

impl Response {
    fn new() -> Self {
        Self {
            status: AtomicU16::new(StatusCode::OK.as_u16()),
            headers: Mutex::new(HeaderMap::new()),
            on_completed: Mutex::new(Vec::new()),
            completed: AtomicBool::new(false),
        }
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status.load(Ordering::Acquire))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn set_status(&self, status: StatusCode) {
        self.status.store(status.as_u16(), Ordering::Release);
    }

    pub fn headers(&self) -> HeaderMap {
        self.headers.lock().expect("response headers").clone()
    }

    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        self.headers
            .lock()
            .expect("response headers")
            .append(name, value);
    }

    /// Register a callback to run once the response has completed.
    ///
    /// The closure owns whatever state it needs. Callbacks must not
    /// block. Registering after completion drops the callback with a
    /// warning.
    pub fn on_completed<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        // `complete` flips the flag under this lock, so a callback is either
        // queued before the drain or rejected here.
        let mut callbacks = self.on_completed.lock().expect("completion callbacks");
        if self.has_completed() {
            warn!("on_completed registered after response completion; callback dropped");
            return;
        }
        callbacks.push(Box::new(callback));
    }

    /// Mark the response complete and run the registered callbacks,
    /// most recently registered first. Returns how many ran.
    ///
    /// Only the first call does anything. If a request is abandoned and
    /// this is never called, nothing registered here runs: readers over
    /// the request body are then left uncompleted.
    pub fn complete(&self) -> usize {
        let callbacks = {
            let mut registered = self.on_completed.lock().expect("completion callbacks");
            if self.completed.swap(true, Ordering::AcqRel) {
                return 0;
            }
            std::mem::take(&mut *registered)
        };
        let count = callbacks.len();
        for callback in callbacks.into_iter().rev() {
            if catch_unwind(AssertUnwindSafe(callback)).is_err() {
                error!("response completion callback panicked");
            }
        }
        debug!(callbacks = count, "response completed");
        count
    }

    pub fn has_completed(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    pub fn pending_callbacks(&self) -> usize {
        self.on_completed.lock().expect("completion callbacks").len()
    }
}
