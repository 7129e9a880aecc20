//! Component parameters and their wire decomposition.
//!
//! Values are held unserialized until a marker is produced, so a value
//! whose `Serialize` impl fails makes marker serialization fail rather
//! than parameter construction.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::component::ComponentType;
use crate::error::MarkerResult;

trait ErasedValue: Send + Sync {
    fn to_json(&self) -> serde_json::Result<Value>;
}

impl<T> ErasedValue for T
where
    T: Serialize + Send + Sync,
{
    fn to_json(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

#[derive(Clone)]
struct Parameter {
    name: String,
    value_type: ComponentType,
    value: Arc<dyn ErasedValue>,
}

/// Ordered set of named parameters passed to a component.
///
/// Names are unique; inserting an existing name replaces its value in place.
#[derive(Clone, Default)]
pub struct ParameterView {
    parameters: Vec<Parameter>,
}

impl ParameterView {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> ParameterViewBuilder {
        ParameterViewBuilder {
            view: Self::default(),
        }
    }

    pub fn insert<V>(&mut self, name: impl Into<String>, value: V)
    where
        V: Serialize + Send + Sync + 'static,
    {
        self.insert_with_type(name, value, ComponentType::of::<V>());
    }

    /// Insert a value whose definition carries `value_type` instead of the
    /// Rust type's identity. An empty [`ComponentType`] leaves the type out
    /// of the definition.
    pub fn insert_with_type<V>(
        &mut self,
        name: impl Into<String>,
        value: V,
        value_type: ComponentType,
    ) where
        V: Serialize + Send + Sync + 'static,
    {
        let parameter = Parameter {
            name: name.into(),
            value_type,
            value: Arc::new(value),
        };
        match self.parameters.iter_mut().find(|p| p.name == parameter.name) {
            Some(existing) => *existing = parameter,
            None => self.parameters.push(parameter),
        }
    }

    pub fn len(&self) -> usize {
        self.parameters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.name.as_str())
    }
}

impl fmt::Debug for ParameterView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.parameters
                    .iter()
                    .map(|p| (&p.name, p.value_type.type_name().unwrap_or("?"))),
            )
            .finish()
    }
}

pub struct ParameterViewBuilder {
    view: ParameterView,
}

impl ParameterViewBuilder {
    pub fn add<V>(mut self, name: impl Into<String>, value: V) -> Self
    where
        V: Serialize + Send + Sync + 'static,
    {
        self.view.insert(name, value);
        self
    }

    pub fn build(self) -> ParameterView {
        self.view
    }
}

/// Definition half of a serialized parameter: its name and, for
/// non-null values, the value's type identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentParameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assembly: Option<String>,
}

impl ComponentParameter {
    /// Split a view into parallel definition and value sequences.
    pub fn from_parameter_view(
        parameters: &ParameterView,
    ) -> MarkerResult<(Vec<ComponentParameter>, Vec<Value>)> {
        let mut definitions = Vec::with_capacity(parameters.len());
        let mut values = Vec::with_capacity(parameters.len());

        for parameter in &parameters.parameters {
            let value = parameter.value.to_json()?;
            let definition = if value.is_null() {
                ComponentParameter {
                    name: parameter.name.clone(),
                    type_name: None,
                    assembly: None,
                }
            } else {
                ComponentParameter {
                    name: parameter.name.clone(),
                    type_name: parameter.value_type.type_name.clone(),
                    assembly: parameter.value_type.assembly.clone(),
                }
            };
            definitions.push(definition);
            values.push(value);
        }

        Ok((definitions, values))
    }
}
