use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::input::{EventKind, NormalizedEvent};

mod registry;
pub use registry::{ToolHandler, ToolRegistry};

/// Feature settings forwarded to a tool, e.g. a shape name or a line color
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolFeatures(pub BTreeMap<String, Value>);

impl ToolFeatures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }
}

/// Tool trait defines the capabilities every interaction tool provides
pub trait Tool {
    /// Called once when the toolbox is initialised
    fn init(&mut self) {
        // default: do nothing
    }

    /// Called with `true` when the tool gets selected and `false` when it is
    /// deselected. Can be used to reset or clean up tool state.
    fn activate(&mut self, active: bool);

    /// Apply feature settings
    fn set_features(&mut self, _features: &ToolFeatures) {
        // default: no configurable features
    }

    /// Whether the tool has a handler for events of `kind`
    fn handles(&self, kind: EventKind) -> bool;

    /// Handle an event of a kind for which [`Tool::handles`] returned true
    fn handle_event(&mut self, event: &NormalizedEvent);
}
