use serde::Deserialize;
use std::path::Path;

use crate::FluffyError;

/// Contents of an optional `fluffy.toml`.
///
/// ```toml
/// [eval]
/// parallel_list_bind = true
/// parallel_threshold = 64
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FluffyToml {
    #[serde(default)]
    pub eval: EvalOptions,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EvalOptions {
    /// Run the continuations of a `List` bind on the rayon pool.
    #[serde(default)]
    pub parallel_list_bind: bool,
    /// Smallest list that is bound in parallel when `parallel_list_bind` is set.
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            parallel_list_bind: false,
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

impl EvalOptions {
    pub fn parallel(threshold: usize) -> Self {
        Self {
            parallel_list_bind: true,
            parallel_threshold: threshold,
        }
    }

    pub(crate) fn parallelize(&self, len: usize) -> bool {
        self.parallel_list_bind && len >= self.parallel_threshold
    }
}

fn default_parallel_threshold() -> usize {
    256
}

pub fn parse_fluffy_toml(text: &str) -> Result<FluffyToml, FluffyError> {
    toml::from_str(text).map_err(|err| FluffyError::Config(format!("failed to parse: {err}")))
}

pub fn read_fluffy_toml(path: &Path) -> Result<FluffyToml, FluffyError> {
    let text = std::fs::read_to_string(path)?;
    toml::from_str(&text)
        .map_err(|err| FluffyError::Config(format!("failed to parse {}: {err}", path.display())))
}
