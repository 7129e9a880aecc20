//! Component marker serialization.
//!
//! A component invocation is written into the page as an HTML comment:
//!
//! ```text
//! <!--Blazor:{"type":"webassembly","assembly":"App","typeName":"Counter",
//!             "parameterDefinitions":"...","parameterValues":"...",
//!             "prerenderId":"..."}-->
//! ...prerendered markup...
//! <!--Blazor:{"prerenderId":"..."}-->
//! ```
//!
//! Parameter definitions and values are each JSON-encoded and then
//! base64-encoded on their own. Raw values can contain `--` or `-->`,
//! which would end the comment early; base64 output cannot.

use std::fmt;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::trace;
use weft_core::{ComponentsConfig, RenderMode};

use crate::component::ComponentType;
use crate::error::MarkerResult;
use crate::json;
use crate::marker::ComponentMarker;
use crate::parameters::{ComponentParameter, ParameterView};

pub const MARKER_PREFIX: &str = "<!--Blazor:";
pub const MARKER_SUFFIX: &str = "-->";

/// The three text chunks of one marker comment: prefix, JSON payload,
/// suffix. Iterating always yields the same chunks from the start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerChunks {
    payload: String,
}

impl MarkerChunks {
    fn new(payload: String) -> Self {
        Self { payload }
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn iter(&self) -> std::array::IntoIter<&str, 3> {
        [MARKER_PREFIX, self.payload.as_str(), MARKER_SUFFIX].into_iter()
    }

    pub fn to_markup(&self) -> String {
        self.iter().collect()
    }
}

impl<'a> IntoIterator for &'a MarkerChunks {
    type Item = &'a str;
    type IntoIter = std::array::IntoIter<&'a str, 3>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for MarkerChunks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in self {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}

/// Turns component invocations into marker comments tagged with one
/// render mode. Stateless; every call stands alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComponentSerializer {
    render_mode: RenderMode,
}

impl ComponentSerializer {
    pub fn new(render_mode: RenderMode) -> Self {
        Self { render_mode }
    }

    pub fn from_config(config: &ComponentsConfig) -> Self {
        Self::new(config.render_mode)
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn serialize_invocation(
        &self,
        component: &ComponentType,
        parameters: &ParameterView,
        prerendered: bool,
    ) -> MarkerResult<ComponentMarker> {
        let (definitions, values) = ComponentParameter::from_parameter_view(parameters)?;

        let serialized_definitions = STANDARD.encode(json::to_vec(&definitions)?);
        let serialized_values = STANDARD.encode(json::to_vec(&values)?);

        trace!(
            type_name = component.type_name().unwrap_or_default(),
            parameters = parameters.len(),
            prerendered,
            "serialized component invocation"
        );

        Ok(if prerendered {
            ComponentMarker::prerendered(
                self.render_mode,
                component,
                serialized_definitions,
                serialized_values,
            )
        } else {
            ComponentMarker::non_prerendered(
                self.render_mode,
                component,
                serialized_definitions,
                serialized_values,
            )
        })
    }

    /// The comment opening a component. Same shape whether or not the
    /// marker is prerendered; only the payload differs.
    pub fn preamble(&self, marker: &ComponentMarker) -> MarkerResult<MarkerChunks> {
        Ok(MarkerChunks::new(json::to_string(marker)?))
    }

    /// The comment closing a prerendered component.
    pub fn epilogue(&self, marker: &ComponentMarker) -> MarkerResult<MarkerChunks> {
        let end = marker.end_record()?;
        Ok(MarkerChunks::new(json::to_string(&end)?))
    }
}

/// [`ComponentSerializer::serialize_invocation`] with the default
/// (WebAssembly) render mode.
pub fn serialize_invocation(
    component: &ComponentType,
    parameters: &ParameterView,
    prerendered: bool,
) -> MarkerResult<ComponentMarker> {
    ComponentSerializer::default().serialize_invocation(component, parameters, prerendered)
}

pub fn get_preamble(marker: &ComponentMarker) -> MarkerResult<MarkerChunks> {
    ComponentSerializer::default().preamble(marker)
}

pub fn get_epilogue(marker: &ComponentMarker) -> MarkerResult<MarkerChunks> {
    ComponentSerializer::default().epilogue(marker)
}
