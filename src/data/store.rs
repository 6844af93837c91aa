use std::collections::BTreeMap;
use std::rc::Rc;

use log::{debug, info};

use super::metadata::{self, MetadataMap, MetadataNormalizer, RawMetadata, TagFlattener};
use super::{DataId, SliceImage};
use crate::error::{DataError, DataResult};
use crate::event::{DataEvent, DataEventKind, EventBus, EventHandler, ImageChange, ImageChangeKind, ListenerId};

/// One image and its metadata
#[derive(Debug)]
pub struct DataEntry<I> {
    pub image: I,
    pub meta: MetadataMap,
}

/// Indexed collection of image + metadata entries.
///
/// Image change notifications are re-published on the store's bus tagged with
/// the id of the owning entry.
pub struct DataStore<I> {
    entries: BTreeMap<DataId, DataEntry<I>>,
    events: Rc<EventBus<DataEvent>>,
    normalizer: Box<dyn MetadataNormalizer>,
}

impl<I: std::fmt::Debug> std::fmt::Debug for DataStore<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataStore")
            .field("entries", &self.entries)
            .field("events", &self.events)
            .finish()
    }
}

impl<I: SliceImage> Default for DataStore<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: SliceImage> DataStore<I> {
    pub fn new() -> Self {
        Self::with_normalizer(TagFlattener::default())
    }

    pub fn with_normalizer(normalizer: impl MetadataNormalizer + 'static) -> Self {
        Self {
            entries: BTreeMap::new(),
            events: Rc::new(EventBus::new()),
            normalizer: Box::new(normalizer),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry. No per-entry events are fired.
    pub fn reset(&mut self) {
        debug!("Resetting data store ({} entries)", self.entries.len());
        self.entries.clear();
    }

    pub fn get(&self, id: DataId) -> Option<&DataEntry<I>> {
        self.entries.get(&id)
    }

    pub fn get_mut(&mut self, id: DataId) -> Option<&mut DataEntry<I>> {
        self.entries.get_mut(&id)
    }

    pub fn contains(&self, id: DataId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn data_ids(&self) -> Vec<DataId> {
        self.entries.keys().copied().collect()
    }

    /// Replace the image of an existing entry
    pub fn set_image(&mut self, id: DataId, image: I) -> DataResult<()> {
        let entry = self.entries.get_mut(&id).ok_or(DataError::MissingEntry(id))?;
        forward_image_changes(&self.events, id, &image);
        entry.image = image;
        let slice_count = entry.image.slice_count();

        self.events.emit(DataEvent::ImageSet {
            data_id: id,
            slice_count,
        });
        Ok(())
    }

    /// Store a new entry. Fails without touching the store if `id` is taken.
    pub fn add_new(&mut self, id: DataId, image: I, raw_meta: RawMetadata) -> DataResult<()> {
        if self.entries.contains_key(&id) {
            return Err(DataError::DuplicateIndex(id));
        }
        let meta = self.normalizer.normalize(raw_meta);
        forward_image_changes(&self.events, id, &image);
        info!("Adding data {} ({} slices)", id, image.slice_count());
        self.entries.insert(id, DataEntry { image, meta });

        self.events.emit(DataEvent::DataAdded { data_id: id });
        Ok(())
    }

    /// Append `image` to an existing entry and merge its metadata.
    ///
    /// The identity key of the merge depends on the metadata kind. Nothing is
    /// modified when the merge fails.
    pub fn update(&mut self, id: DataId, image: I, raw_meta: RawMetadata) -> DataResult<()> {
        let entry = self.entries.get_mut(&id).ok_or(DataError::MissingEntry(id))?;
        let id_key = raw_meta.identity_key();
        let incoming = self.normalizer.normalize(raw_meta);
        let meta = metadata::merge_metadata(&entry.meta, &incoming, id_key)?;

        entry.image.append_slice(image)?;
        entry.meta = meta;
        debug!("Updated data {} (now {} slices)", id, entry.image.slice_count());
        Ok(())
    }

    pub fn add_event_listener(&self, kind: DataEventKind, handler: impl EventHandler<DataEvent> + 'static) -> ListenerId {
        self.events.subscribe(kind, handler)
    }

    pub fn remove_event_listener(&self, kind: DataEventKind, id: ListenerId) -> bool {
        self.events.unsubscribe(kind, id)
    }
}

/// Re-fire every change of `image` on the store bus. The image only holds a
/// weak reference to the bus.
fn forward_image_changes<I: SliceImage>(events: &Rc<EventBus<DataEvent>>, data_id: DataId, image: &I) {
    let hub = Rc::downgrade(events);
    for kind in ImageChangeKind::ALL {
        let hub = hub.clone();
        image.change_bus().subscribe(kind, move |change: &ImageChange| {
            if let Some(hub) = hub.upgrade() {
                hub.emit(DataEvent::ImageChange {
                    data_id,
                    change: change.clone(),
                });
            }
        });
    }
}
