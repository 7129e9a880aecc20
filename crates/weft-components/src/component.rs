//! Component type identity.

use serde::{Deserialize, Serialize};

/// Identifies a component type for the client runtime: the module
/// (assembly) it lives in and its fully-qualified name.
///
/// Either piece may be missing; absent pieces are carried through to the
/// marker as absent fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentType {
    pub assembly: Option<String>,
    pub type_name: Option<String>,
}

impl ComponentType {
    pub fn new(assembly: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            assembly: Some(assembly.into()),
            type_name: Some(type_name.into()),
        }
    }

    /// Identity of a Rust type: the crate is the first path segment of
    /// its type name, and the type name is the full path.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::from_type_path(std::any::type_name::<T>())
    }

    pub fn from_type_path(path: &str) -> Self {
        let path = path.trim();
        if path.is_empty() {
            return Self::default();
        }
        Self {
            assembly: crate_of(path).map(str::to_string),
            type_name: Some(path.to_string()),
        }
    }

    pub fn assembly(&self) -> Option<&str> {
        self.assembly.as_deref()
    }

    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }
}

/// Crate that defines the type named by `path`, as printed by
/// `std::any::type_name`. References, raw pointers, slices, arrays and
/// trait objects resolve to the type they wrap. Tuples, function
/// pointers, primitives and qualified paths have no crate.
fn crate_of(path: &str) -> Option<&str> {
    let mut rest = path.trim_start();
    loop {
        let stripped = ["&mut ", "&", "*const ", "*mut ", "[", "dyn "]
            .iter()
            .find_map(|prefix| rest.strip_prefix(prefix));
        match stripped {
            Some(inner) => rest = inner.trim_start(),
            None => break,
        }
    }
    // Generic arguments may contain their own paths; only the outer
    // type decides the crate.
    let outer = rest.split('<').next().unwrap_or(rest);
    let (krate, _) = outer.split_once("::")?;
    let is_ident = !krate.is_empty() && krate.chars().all(|c| c.is_alphanumeric() || c == '_');
    is_ident.then_some(krate)
}
