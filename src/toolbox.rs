//! Session-facing entry point for tools and input.
//!
//! The controller owns the tool registry and the surface binder, and is the
//! single writer of both during a session.

use log::info;

use crate::config::SessionConfig;
use crate::error::ToolResult;
use crate::input::{GroupId, ListenerHandle, RawEvent, SharedSource, SharedSurface, SurfaceBinder};
use crate::tools::{Tool, ToolFeatures, ToolRegistry};

#[derive(Debug)]
pub struct ToolboxController {
    registry: ToolRegistry,
    binder: SurfaceBinder,
    default_tool: Option<String>,
}

impl Default for ToolboxController {
    fn default() -> Self {
        Self::new(&SessionConfig::default())
    }
}

impl ToolboxController {
    pub fn new(config: &SessionConfig) -> Self {
        let mut binder = SurfaceBinder::new().with_override_tool(config.override_tool.clone());
        binder.set_suppress_context_menu(config.suppress_context_menu);
        Self {
            registry: ToolRegistry::new(),
            binder,
            default_tool: config.default_tool.clone(),
        }
    }

    pub fn add_tool(&mut self, name: impl Into<String>, tool: Box<dyn Tool>) {
        self.registry.add_tool(name, tool);
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut ToolRegistry {
        &mut self.registry
    }

    pub fn binder(&self) -> &SurfaceBinder {
        &self.binder
    }

    /// Initialise the tools, attach the keyboard and select the configured default tool
    pub fn init(&mut self, keyboard: SharedSource) -> ToolResult<()> {
        self.registry.init(&mut self.binder, keyboard);
        if let Some(name) = self.default_tool.clone() {
            self.registry.set_selected_tool(&name)?;
        }
        info!("Toolbox ready: {:?}", self.registry.tool_names());
        Ok(())
    }

    /// Release the keyboard and unbind every bound surface
    pub fn teardown(&mut self) {
        self.registry.teardown();
        self.binder.unbind_all();
    }

    pub fn set_selected_tool(&mut self, name: &str) -> ToolResult<()> {
        self.registry.set_selected_tool(name)
    }

    pub fn selected_tool_name(&self) -> Option<&str> {
        self.registry.selected_tool_name()
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.registry.has_tool(name)
    }

    pub fn set_tool_features(&mut self, features: &ToolFeatures) {
        self.registry.set_tool_features(features);
    }

    pub fn bind_layer(&mut self, surface: SharedSurface, group: impl Into<GroupId>) {
        self.binder.bind_layer(surface, group);
    }

    pub fn unbind_layer(&mut self, group: &GroupId) -> Option<SharedSurface> {
        self.binder.unbind_layer(group)
    }

    /// Entry point for host input: `handle` is the token the event was registered under
    pub fn dispatch(&mut self, handle: ListenerHandle, raw: RawEvent) {
        self.binder.dispatch(handle, raw, &mut self.registry);
    }
}
