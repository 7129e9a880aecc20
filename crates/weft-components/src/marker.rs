//! Component marker records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use weft_core::RenderMode;

use crate::component::ComponentType;
use crate::error::{MarkerError, MarkerResult};

/// A record embedded in generated markup so the client runtime can find
/// a component and rebuild it with its parameters.
///
/// Start records carry the type identity and both base64 parameter
/// payloads. A prerendered start record also carries a prerender id,
/// and is closed by an end record holding only that id. Absent fields
/// are left out of the JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMarker {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    marker_type: Option<RenderMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assembly: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameter_definitions: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameter_values: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    prerender_id: Option<String>,
}

impl ComponentMarker {
    /// A start record paired with a later end record through a freshly
    /// generated prerender id.
    pub fn prerendered(
        render_mode: RenderMode,
        component: &ComponentType,
        parameter_definitions: String,
        parameter_values: String,
    ) -> Self {
        Self::start(
            render_mode,
            component,
            parameter_definitions,
            parameter_values,
            Some(Uuid::new_v4().simple().to_string()),
        )
    }

    /// A standalone record with no prerendered content to close.
    pub fn non_prerendered(
        render_mode: RenderMode,
        component: &ComponentType,
        parameter_definitions: String,
        parameter_values: String,
    ) -> Self {
        Self::start(
            render_mode,
            component,
            parameter_definitions,
            parameter_values,
            None,
        )
    }

    fn start(
        render_mode: RenderMode,
        component: &ComponentType,
        parameter_definitions: String,
        parameter_values: String,
        prerender_id: Option<String>,
    ) -> Self {
        Self {
            marker_type: Some(render_mode),
            assembly: component.assembly.clone(),
            type_name: component.type_name.clone(),
            parameter_definitions: Some(parameter_definitions),
            parameter_values: Some(parameter_values),
            prerender_id,
        }
    }

    /// The record closing this prerendered start record.
    pub fn end_record(&self) -> MarkerResult<ComponentMarker> {
        let prerender_id = self
            .prerender_id
            .clone()
            .ok_or(MarkerError::NotPrerendered)?;
        Ok(Self {
            marker_type: None,
            assembly: None,
            type_name: None,
            parameter_definitions: None,
            parameter_values: None,
            prerender_id: Some(prerender_id),
        })
    }

    pub fn is_prerendered(&self) -> bool {
        self.prerender_id.is_some()
    }

    pub fn marker_type(&self) -> Option<RenderMode> {
        self.marker_type
    }

    pub fn assembly(&self) -> Option<&str> {
        self.assembly.as_deref()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    pub fn parameter_definitions(&self) -> Option<&str> {
        self.parameter_definitions.as_deref()
    }

    pub fn parameter_values(&self) -> Option<&str> {
        self.parameter_values.as_deref()
    }

    pub fn prerender_id(&self) -> Option<&str> {
        self.prerender_id.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> ComponentType {
        ComponentType::new("App", "Counter")
    }

    #[test]
    fn prerendered_marker_gets_a_simple_uuid() {
        let marker = ComponentMarker::prerendered(
            RenderMode::WebAssembly,
            &counter(),
            "W10=".into(),
            "W10=".into(),
        );
        let id = marker.prerender_id().unwrap();
        assert_eq!(id.len(), 32);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(marker.is_prerendered());
    }

    #[test]
    fn prerender_ids_are_unique() {
        let a = ComponentMarker::prerendered(
            RenderMode::Server,
            &counter(),
            String::new(),
            String::new(),
        );
        let b = ComponentMarker::prerendered(
            RenderMode::Server,
            &counter(),
            String::new(),
            String::new(),
        );
        assert_ne!(a.prerender_id(), b.prerender_id());
    }

    #[test]
    fn non_prerendered_marker_has_no_id_or_end_record() {
        let marker = ComponentMarker::non_prerendered(
            RenderMode::WebAssembly,
            &counter(),
            "W10=".into(),
            "W10=".into(),
        );
        assert_eq!(marker.prerender_id(), None);
        assert!(matches!(marker.end_record(), Err(MarkerError::NotPrerendered)));
    }

    #[test]
    fn end_record_keeps_only_the_id() {
        let marker = ComponentMarker::prerendered(
            RenderMode::WebAssembly,
            &counter(),
            "W10=".into(),
            "W10=".into(),
        );
        let end = marker.end_record().unwrap();
        assert_eq!(end.prerender_id(), marker.prerender_id());
        assert_eq!(end.marker_type(), None);
        assert_eq!(end.type_name(), None);
        assert_eq!(end.parameter_values(), None);
    }

    #[test]
    fn json_field_order_and_names() {
        let marker = ComponentMarker::non_prerendered(
            RenderMode::Server,
            &counter(),
            "W10=".into(),
            "W10=".into(),
        );
        assert_eq!(
            serde_json::to_string(&marker).unwrap(),
            r#"{"type":"server","assembly":"App","typeName":"Counter","parameterDefinitions":"W10=","parameterValues":"W10="}"#
        );
    }

    #[test]
    fn missing_type_name_is_omitted() {
        let component = ComponentType {
            assembly: Some("App".into()),
            type_name: None,
        };
        let marker = ComponentMarker::non_prerendered(
            RenderMode::WebAssembly,
            &component,
            "W10=".into(),
            "W10=".into(),
        );
        let json = serde_json::to_string(&marker).unwrap();
        assert!(!json.contains("typeName"));
        assert!(json.contains(r#""assembly":"App""#));
    }
}
