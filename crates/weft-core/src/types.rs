//! Shared types used across Weft crates.

use serde::{Deserialize, Serialize};

/// How a component is hosted once the client runtime picks up its marker.
///
/// Serialized as the `type` tag of a component marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// The component runs inside the browser's WebAssembly runtime.
    #[default]
    WebAssembly,
    /// The component runs on the server over a persistent circuit.
    Server,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::WebAssembly => "webassembly",
            RenderMode::Server => "server",
        }
    }
}

impl std::fmt::Display for RenderMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "webassembly" | "wasm" => Ok(RenderMode::WebAssembly),
            "server" => Ok(RenderMode::Server),
            other => Err(format!("unknown render mode: {other}")),
        }
    }
}
