use std::collections::BTreeMap;

use log::{debug, info, warn};

use super::{Tool, ToolFeatures};
use crate::error::{ToolError, ToolResult};
use crate::input::{EventKind, KeyboardRegistration, NormalizedEvent, SharedSource, SurfaceBinder};

/// A resolved event handler: a tool together with the kind it handles
pub struct ToolHandler<'a> {
    name: &'a str,
    tool: &'a mut Box<dyn Tool>,
}

impl ToolHandler<'_> {
    pub fn tool_name(&self) -> &str {
        self.name
    }

    pub fn handle(self, event: &NormalizedEvent) {
        self.tool.handle_event(event);
    }
}

/// Catalogue of tools with at most one selected (and active) tool
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
    selected: Option<String>,
    keyboard: Option<KeyboardRegistration>,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.tools.keys().collect::<Vec<_>>())
            .field("selected", &self.selected)
            .field("keyboard", &self.keyboard)
            .finish()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under `name`.
    ///
    /// Replacing the selected tool deactivates the old instance and activates the new one.
    pub fn add_tool(&mut self, name: impl Into<String>, mut tool: Box<dyn Tool>) {
        let name = name.into();
        let is_selected = self.selected.as_deref() == Some(name.as_str());
        if let Some(mut previous) = self.tools.remove(&name) {
            warn!("Replacing registered tool '{}'", name);
            if is_selected {
                previous.activate(false);
                tool.activate(true);
            }
        }
        self.tools.insert(name, tool);
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.keys().map(String::as_str).collect()
    }

    pub fn selected_tool_name(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn is_initialized(&self) -> bool {
        self.keyboard.is_some()
    }

    /// Initialise every tool, then route key-down events of `keyboard` to the selected tool
    pub fn init(&mut self, binder: &mut SurfaceBinder, keyboard: SharedSource) {
        for tool in self.tools.values_mut() {
            tool.init();
        }
        // Release a previous registration first: the handle is memoized per source
        self.keyboard = None;
        self.keyboard = Some(binder.attach_keyboard(keyboard));
        debug!("Initialised {} tools", self.tools.len());
    }

    /// Release the keyboard listener acquired by [`ToolRegistry::init`]
    pub fn teardown(&mut self) {
        if self.keyboard.take().is_some() {
            debug!("Released keyboard source");
        }
    }

    /// Select a tool: deactivates the current tool, then activates the new one
    pub fn set_selected_tool(&mut self, name: &str) -> ToolResult<()> {
        if !self.tools.contains_key(name) {
            return Err(ToolError::UnknownTool(name.to_string()));
        }
        if let Some(previous) = self.selected.take() {
            if let Some(tool) = self.tools.get_mut(&previous) {
                tool.activate(false);
            }
        }
        if let Some(tool) = self.tools.get_mut(name) {
            tool.activate(true);
        }
        self.selected = Some(name.to_string());
        info!("Selected tool: {}", name);
        Ok(())
    }

    /// Handler of the selected tool for `kind`, if any
    pub fn selected_tool_event_handler(&mut self, kind: EventKind) -> Option<ToolHandler<'_>> {
        let selected = self.selected.as_deref()?;
        Self::find_handler(&mut self.tools, selected, kind)
    }

    /// Handler of the tool registered under `name` for `kind`, regardless of the selection
    pub fn tool_event_handler(&mut self, name: &str, kind: EventKind) -> Option<ToolHandler<'_>> {
        Self::find_handler(&mut self.tools, name, kind)
    }

    fn find_handler<'a>(
        tools: &'a mut BTreeMap<String, Box<dyn Tool>>,
        name: &str,
        kind: EventKind,
    ) -> Option<ToolHandler<'a>> {
        let (name, tool) = tools.iter_mut().find(|(key, _)| key.as_str() == name)?;
        if !tool.handles(kind) {
            return None;
        }
        Some(ToolHandler {
            name: name.as_str(),
            tool,
        })
    }

    /// Forward features to the selected tool; no-op when nothing is selected
    pub fn set_tool_features(&mut self, features: &ToolFeatures) {
        let Some(selected) = self.selected.as_deref() else {
            return;
        };
        if let Some(tool) = self.tools.get_mut(selected) {
            tool.set_features(features);
        }
    }
}
