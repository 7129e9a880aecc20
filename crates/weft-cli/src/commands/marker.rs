use std::path::Path;

use anyhow::{Context, bail};
use serde_json::Value;
use tracing::debug;
use weft_components::{ComponentSerializer, ComponentType, ParameterView, RenderMode};
use weft_core::WeftConfig;

pub struct MarkerRequest {
    pub assembly: Option<String>,
    pub type_name: Option<String>,
    pub params: Vec<String>,
    pub prerendered: bool,
    pub render_mode: Option<String>,
    pub config: Option<String>,
}

/// Render the marker comments for one invocation, one comment per line.
pub fn render(request: &MarkerRequest) -> anyhow::Result<String> {
    let config = match &request.config {
        Some(path) => WeftConfig::from_file(Path::new(path))
            .with_context(|| format!("failed to load {path}"))?,
        None => WeftConfig::default(),
    };

    let render_mode = match &request.render_mode {
        Some(mode) => mode.parse::<RenderMode>().map_err(anyhow::Error::msg)?,
        None => config.components.render_mode,
    };

    let component = ComponentType {
        assembly: request.assembly.clone(),
        type_name: request.type_name.clone(),
    };
    let parameters = parse_params(&request.params)?;
    debug!(%render_mode, parameters = parameters.len(), "rendering marker");

    let serializer = ComponentSerializer::new(render_mode);
    let marker = serializer.serialize_invocation(&component, &parameters, request.prerendered)?;

    let mut out = serializer.preamble(&marker)?.to_markup();
    out.push('\n');
    if marker.is_prerendered() {
        out.push_str(&serializer.epilogue(&marker)?.to_markup());
        out.push('\n');
    }
    Ok(out)
}

fn parse_params(params: &[String]) -> anyhow::Result<ParameterView> {
    let mut view = ParameterView::empty();
    for param in params {
        let Some((name, raw)) = param.split_once('=') else {
            bail!("parameter must be NAME=VALUE: {param}");
        };
        if name.is_empty() {
            bail!("parameter name is empty: {param}");
        }
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        insert_json(&mut view, name, value);
    }
    Ok(view)
}

/// Scalars are inserted as the matching Rust type so their definitions
/// name it. Arrays and objects have no single type and carry none.
fn insert_json(view: &mut ParameterView, name: &str, value: Value) {
    match value {
        Value::Bool(b) => view.insert(name, b),
        Value::String(s) => view.insert(name, s),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                view.insert(name, i);
            } else if let Some(u) = n.as_u64() {
                view.insert(name, u);
            } else {
                view.insert(name, n.as_f64().unwrap_or_default());
            }
        }
        other => view.insert_with_type(name, other, ComponentType::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_components::ComponentParameter;

    fn request(params: &[&str], prerendered: bool) -> MarkerRequest {
        MarkerRequest {
            assembly: Some("App".into()),
            type_name: Some("Counter".into()),
            params: params.iter().map(|p| p.to_string()).collect(),
            prerendered,
            render_mode: None,
            config: None,
        }
    }

    #[test]
    fn renders_single_comment_when_not_prerendered() {
        let out = render(&request(&["IncrementAmount=5"], false)).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.starts_with(
            r#"<!--Blazor:{"type":"webassembly","assembly":"App","typeName":"Counter""#
        ));
    }

    #[test]
    fn renders_start_and_end_when_prerendered() {
        let out = render(&request(&[], true)).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with(r#"<!--Blazor:{"prerenderId":""#));
    }

    #[test]
    fn params_fall_back_to_strings() {
        let view = parse_params(&["Count=5".into(), "Title=hello world".into()]).unwrap();
        assert_eq!(view.names().collect::<Vec<_>>(), vec!["Count", "Title"]);
    }

    #[test]
    fn param_definitions_name_the_json_kind() {
        let view = parse_params(&[
            "Count=5".into(),
            "Ratio=0.5".into(),
            "Enabled=true".into(),
            "Title=hello".into(),
            "Tags=[\"a\"]".into(),
            "Missing=null".into(),
        ])
        .unwrap();

        let (definitions, _) = ComponentParameter::from_parameter_view(&view).unwrap();
        let types: Vec<Option<&str>> =
            definitions.iter().map(|d| d.type_name.as_deref()).collect();
        assert_eq!(
            types,
            vec![
                Some("i64"),
                Some("f64"),
                Some("bool"),
                Some("alloc::string::String"),
                None,
                None,
            ]
        );
        assert!(definitions.iter().all(|d| d.assembly.as_deref() != Some("serde_json")));
    }

    #[test]
    fn malformed_param_is_rejected() {
        assert!(parse_params(&["NoEquals".into()]).is_err());
        assert!(parse_params(&["=5".into()]).is_err());
    }

    #[test]
    fn render_mode_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("weft.toml");
        std::fs::write(&path, "[components]\nrender_mode = \"webassembly\"\n").unwrap();

        let mut req = request(&[], false);
        req.config = Some(path.display().to_string());
        req.render_mode = Some("server".into());
        assert!(render(&req).unwrap().contains(r#""type":"server""#));
    }

    #[test]
    fn unknown_render_mode_is_an_error() {
        let mut req = request(&[], false);
        req.render_mode = Some("client".into());
        assert!(render(&req).is_err());
    }
}
