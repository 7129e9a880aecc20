//! Weft component markers.
//!
//! When a page embeds an interactive component, the server writes an
//! HTML comment describing the component's type and parameters. The
//! client runtime later scans the document for these comments and
//! starts the component where they sit. A prerendered component is
//! written as a start comment, its server-rendered markup, and an end
//! comment that shares the start comment's prerender id.
//!
//! [`ComponentSerializer`] produces the marker records and their comment
//! text; the free functions use the default render mode.

mod component;
mod error;
mod json;
mod marker;
mod parameters;
mod serializer;

pub use component::ComponentType;
pub use error::{MarkerError, MarkerResult};
pub use marker::ComponentMarker;
pub use parameters::{ComponentParameter, ParameterView, ParameterViewBuilder};
pub use serializer::{
    ComponentSerializer, MARKER_PREFIX, MARKER_SUFFIX, MarkerChunks, get_epilogue, get_preamble,
    serialize_invocation,
};
pub use weft_core::RenderMode;
