#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod data;
pub mod error;
pub mod event;
pub mod input;
pub mod toolbox;
pub mod tools;

mod id_generator;

pub use config::SessionConfig;
pub use data::{DataEntry, DataId, DataStore, FrameStack, MetadataKind, RawMetadata, SliceImage};
pub use error::{ConfigError, DataError, ToolError};
pub use event::{DataEvent, DataEventKind, EventBus, ImageChange};
pub use input::{EventKind, GroupId, NormalizedEvent, RawEvent, RenderSurface, SurfaceBinder, SurfaceId};
pub use toolbox::ToolboxController;
pub use tools::{Tool, ToolFeatures, ToolRegistry};
