use crate::data::DataId;
use crate::event::Event;

/// Change notifications emitted by an image on its own bus
#[derive(Debug, Clone, PartialEq)]
pub enum ImageChange {
    /// A slice/frame was appended at the given index
    SliceAppended { slice_index: usize },
    /// Pixel content of a slice changed
    ContentChanged { slice_index: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageChangeKind {
    SliceAppended,
    ContentChanged,
}

impl ImageChangeKind {
    pub const ALL: [ImageChangeKind; 2] = [ImageChangeKind::SliceAppended, ImageChangeKind::ContentChanged];
}

impl Event for ImageChange {
    type Kind = ImageChangeKind;

    fn kind(&self) -> ImageChangeKind {
        match self {
            ImageChange::SliceAppended { .. } => ImageChangeKind::SliceAppended,
            ImageChange::ContentChanged { .. } => ImageChangeKind::ContentChanged,
        }
    }
}

/// Dataset-scoped events published by the data store
#[derive(Debug, Clone, PartialEq)]
pub enum DataEvent {
    /// A new entry was stored
    DataAdded { data_id: DataId },
    /// The image of an entry was replaced.
    ///
    /// Emitted while the store is still mutably borrowed by `set_image`, so
    /// listeners only get the id and slice count. Read the image through
    /// `DataStore::get` once `set_image` has returned.
    ImageSet { data_id: DataId, slice_count: usize },
    /// An image change re-fired with the id of its owning entry
    ImageChange { data_id: DataId, change: ImageChange },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataEventKind {
    DataAdded,
    ImageSet,
    ImageChange,
}

impl Event for DataEvent {
    type Kind = DataEventKind;

    fn kind(&self) -> DataEventKind {
        match self {
            DataEvent::DataAdded { .. } => DataEventKind::DataAdded,
            DataEvent::ImageSet { .. } => DataEventKind::ImageSet,
            DataEvent::ImageChange { .. } => DataEventKind::ImageChange,
        }
    }
}

impl DataEvent {
    pub fn data_id(&self) -> DataId {
        match self {
            DataEvent::DataAdded { data_id }
            | DataEvent::ImageSet { data_id, .. }
            | DataEvent::ImageChange { data_id, .. } => *data_id,
        }
    }
}
