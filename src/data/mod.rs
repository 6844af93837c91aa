use serde::{Deserialize, Serialize};
use std::fmt;

mod image;
pub mod metadata;
mod store;

pub use image::{Frame, FrameStack, SliceImage};
pub use metadata::{MetadataKind, MetadataMap, MetadataNormalizer, RawMetadata, TagFlattener};
pub use store::{DataEntry, DataStore};

/// Caller-supplied identifier of a data entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DataId(pub u32);

impl DataId {
    pub fn new(index: u32) -> Self {
        Self(index)
    }

    pub fn index(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for DataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
