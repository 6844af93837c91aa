//! Metadata normalization and incremental merging.
//!
//! Stored metadata is a flat, ordered map from keyword to a JSON value. Most
//! values follow the `{ "value": ... }` shape produced by the tag flattener.
//! Merging several observations of the same field produces
//! `{ "merged": true, "value": ... }` records keyed by identity value.

use serde_json::{Map, Value, json};
use std::collections::BTreeMap;

use crate::error::{DataError, DataResult};

pub type MetadataMap = BTreeMap<String, Value>;

/// Identity key used to merge DICOM metadata
pub const INSTANCE_NUMBER_KEY: &str = "InstanceNumber";
/// Identity key used to merge generic metadata
pub const IMAGE_UID_KEY: &str = "imageUid";

const MERGED: &str = "merged";
const VALUE: &str = "value";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataKind {
    /// Tag-keyed metadata that must be flattened before storage
    Dicom,
    /// Already flat metadata, stored as is
    Generic,
}

/// Metadata as handed over by a loader, tagged with its shape
#[derive(Debug, Clone, PartialEq)]
pub enum RawMetadata {
    Dicom(MetadataMap),
    Generic(MetadataMap),
}

impl RawMetadata {
    pub fn kind(&self) -> MetadataKind {
        match self {
            RawMetadata::Dicom(_) => MetadataKind::Dicom,
            RawMetadata::Generic(_) => MetadataKind::Generic,
        }
    }

    /// The field used to reconcile observations of this metadata during a merge
    pub fn identity_key(&self) -> &'static str {
        match self.kind() {
            MetadataKind::Dicom => INSTANCE_NUMBER_KEY,
            MetadataKind::Generic => IMAGE_UID_KEY,
        }
    }
}

/// Turns raw metadata into the flat form kept by the data store
pub trait MetadataNormalizer {
    /// Flatten a tag-keyed mapping
    fn flatten(&self, tags: MetadataMap) -> MetadataMap;

    fn normalize(&self, raw: RawMetadata) -> MetadataMap {
        match raw {
            RawMetadata::Dicom(tags) => self.flatten(tags),
            RawMetadata::Generic(meta) => meta,
        }
    }
}

/// Flattens tag-keyed metadata by renaming known tags to their keyword.
///
/// Tags are matched in the `xGGGGEEEE` form. Unknown tags keep their key.
#[derive(Debug, Clone)]
pub struct TagFlattener {
    keywords: BTreeMap<String, String>,
}

impl Default for TagFlattener {
    fn default() -> Self {
        const KNOWN: [(&str, &str); 12] = [
            ("x00020010", "TransferSyntaxUID"),
            ("x00080016", "SOPClassUID"),
            ("x00080018", "SOPInstanceUID"),
            ("x00080060", "Modality"),
            ("x0020000D", "StudyInstanceUID"),
            ("x0020000E", "SeriesInstanceUID"),
            ("x00200013", "InstanceNumber"),
            ("x00200032", "ImagePositionPatient"),
            ("x00280010", "Rows"),
            ("x00280011", "Columns"),
            ("x00281050", "WindowCenter"),
            ("x00281051", "WindowWidth"),
        ];
        Self {
            keywords: KNOWN
                .iter()
                .map(|(tag, keyword)| (tag.to_string(), keyword.to_string()))
                .collect(),
        }
    }
}

impl TagFlattener {
    /// A flattener that keeps every key as is
    pub fn empty() -> Self {
        Self {
            keywords: BTreeMap::new(),
        }
    }

    pub fn with_keyword(mut self, tag: impl Into<String>, keyword: impl Into<String>) -> Self {
        self.keywords.insert(normalize_tag(&tag.into()), keyword.into());
        self
    }

    pub fn keyword(&self, tag: &str) -> Option<&str> {
        self.keywords.get(&normalize_tag(tag)).map(String::as_str)
    }
}

impl MetadataNormalizer for TagFlattener {
    fn flatten(&self, tags: MetadataMap) -> MetadataMap {
        tags.into_iter()
            .map(|(tag, value)| {
                let key = self.keyword(&tag).map(str::to_string).unwrap_or(tag);
                (key, value)
            })
            .collect()
    }
}

// `x0020000d` and `x0020000D` name the same tag
fn normalize_tag(tag: &str) -> String {
    match tag.strip_prefix('x') {
        Some(digits) if digits.len() == 8 => format!("x{}", digits.to_ascii_uppercase()),
        _ => tag.to_string(),
    }
}

fn is_merged(field: &Value) -> bool {
    field.get(MERGED).and_then(Value::as_bool).unwrap_or(false)
}

/// The observed value of a field: its `value` member when present
fn observed(field: &Value) -> &Value {
    field.get(VALUE).unwrap_or(field)
}

fn identity_string(field: &Value) -> String {
    match observed(field) {
        Value::String(s) => s.clone(),
        Value::Array(items) if items.len() == 1 => match &items[0] {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        },
        other => other.to_string(),
    }
}

fn merged_record(value: Value) -> Value {
    json!({ "merged": true, "value": value })
}

/// Per-identity record, collapsed to the plain value when every identity shares it
fn per_identity(observations: Map<String, Value>, ids: &[String]) -> Value {
    let covers_all = ids.iter().all(|id| observations.contains_key(id));
    let mut values = observations.values();
    if covers_all {
        if let Some(first) = values.next() {
            if values.all(|v| v == first) {
                return first.clone();
            }
        }
    }
    merged_record(Value::Object(observations))
}

/// Merge `incoming` into `existing`, reconciling fields on `id_key`.
///
/// Identity observations accumulate in order. A field equal on both sides is
/// kept; a differing field is recorded per identity value, the incoming value
/// winning when its identity was already observed. Fields only present in
/// `existing` are preserved unchanged.
pub fn merge_metadata(existing: &MetadataMap, incoming: &MetadataMap, id_key: &str) -> DataResult<MetadataMap> {
    let old_id = existing.get(id_key).ok_or_else(|| DataError::MissingIdentityKey {
        key: id_key.to_string(),
        side: "existing",
    })?;
    let new_id_field = incoming.get(id_key).ok_or_else(|| DataError::MissingIdentityKey {
        key: id_key.to_string(),
        side: "incoming",
    })?;

    let old_merged = is_merged(old_id);
    let old_ids: Vec<String> = if old_merged {
        observed(old_id)
            .as_array()
            .map(|ids| ids.iter().map(identity_string).collect())
            .unwrap_or_default()
    } else {
        vec![identity_string(old_id)]
    };
    let new_id = identity_string(new_id_field);

    let mut ids = old_ids.clone();
    if !ids.contains(&new_id) {
        ids.push(new_id.clone());
    }

    let mut result = MetadataMap::new();
    if ids.len() == 1 {
        result.insert(id_key.to_string(), new_id_field.clone());
    } else {
        let values = ids.iter().cloned().map(Value::String).collect();
        result.insert(id_key.to_string(), merged_record(Value::Array(values)));
    }

    let keys = existing.keys().chain(incoming.keys().filter(|k| !existing.contains_key(*k)));
    for key in keys {
        if key == id_key {
            continue;
        }
        let merged = match (existing.get(key), incoming.get(key)) {
            (Some(old), None) => old.clone(),
            (None, Some(new)) => {
                let mut observations = Map::new();
                observations.insert(new_id.clone(), new.clone());
                per_identity(observations, &ids)
            }
            (Some(old), Some(new)) if is_merged(old) => {
                let mut observations = observed(old).as_object().cloned().unwrap_or_default();
                observations.insert(new_id.clone(), new.clone());
                per_identity(observations, &ids)
            }
            (Some(old), Some(new)) => {
                if old == new {
                    old.clone()
                } else {
                    let mut observations: Map<String, Value> =
                        old_ids.iter().map(|id| (id.clone(), old.clone())).collect();
                    observations.insert(new_id.clone(), new.clone());
                    per_identity(observations, &ids)
                }
            }
            (None, None) => continue,
        };
        result.insert(key.clone(), merged);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(pairs: &[(&str, Value)]) -> MetadataMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    #[test]
    fn test_identity_key_follows_kind() {
        assert_eq!(RawMetadata::Dicom(MetadataMap::new()).identity_key(), "InstanceNumber");
        assert_eq!(RawMetadata::Generic(MetadataMap::new()).identity_key(), "imageUid");
    }

    #[test]
    fn test_flatten_renames_known_tags() {
        let flattener = TagFlattener::default().with_keyword("x00100010", "PatientName");
        let raw = RawMetadata::Dicom(meta(&[
            ("x00200013", json!({"value": ["3"]})),
            ("x0020000d", json!({"value": ["1.2.3"]})),
            ("x00100010", json!({"value": ["Doe"]})),
            ("x7FE00010", json!({"value": []})),
        ]));

        let flat = flattener.normalize(raw);

        assert_eq!(flat["InstanceNumber"], json!({"value": ["3"]}));
        assert_eq!(flat["StudyInstanceUID"], json!({"value": ["1.2.3"]}));
        assert_eq!(flat["PatientName"], json!({"value": ["Doe"]}));
        assert!(flat.contains_key("x7FE00010"));
    }

    #[test]
    fn test_generic_passes_through() {
        let raw = meta(&[("x00200013", json!({"value": "1"}))]);
        let flat = TagFlattener::default().normalize(RawMetadata::Generic(raw.clone()));
        assert_eq!(flat, raw);
    }

    #[test]
    fn test_merge_two_instances() {
        let first = meta(&[
            ("InstanceNumber", json!({"value": "1"})),
            ("Modality", json!({"value": "CT"})),
            ("SliceLocation", json!({"value": 0.5})),
            ("OnlyOld", json!({"value": "kept"})),
        ]);
        let second = meta(&[
            ("InstanceNumber", json!({"value": "2"})),
            ("Modality", json!({"value": "CT"})),
            ("SliceLocation", json!({"value": 1.5})),
            ("OnlyNew", json!({"value": "x"})),
        ]);

        let merged = merge_metadata(&first, &second, INSTANCE_NUMBER_KEY).unwrap();

        assert_eq!(merged["InstanceNumber"], json!({"merged": true, "value": ["1", "2"]}));
        assert_eq!(merged["Modality"], json!({"value": "CT"}));
        assert_eq!(
            merged["SliceLocation"],
            json!({"merged": true, "value": {"1": {"value": 0.5}, "2": {"value": 1.5}}})
        );
        assert_eq!(merged["OnlyOld"], json!({"value": "kept"}));
        assert_eq!(merged["OnlyNew"], json!({"merged": true, "value": {"2": {"value": "x"}}}));
    }

    #[test]
    fn test_merge_accumulates_over_three_instances() {
        let first = meta(&[
            ("InstanceNumber", json!({"value": ["1"]})),
            ("SliceLocation", json!({"value": 0})),
            ("Modality", json!({"value": "MR"})),
        ]);
        let second = meta(&[
            ("InstanceNumber", json!({"value": ["2"]})),
            ("SliceLocation", json!({"value": 1})),
            ("Modality", json!({"value": "MR"})),
        ]);
        let third = meta(&[
            ("InstanceNumber", json!({"value": ["3"]})),
            ("SliceLocation", json!({"value": 2})),
            ("Modality", json!({"value": "CT"})),
        ]);

        let merged = merge_metadata(&first, &second, INSTANCE_NUMBER_KEY).unwrap();
        let merged = merge_metadata(&merged, &third, INSTANCE_NUMBER_KEY).unwrap();

        assert_eq!(merged["InstanceNumber"], json!({"merged": true, "value": ["1", "2", "3"]}));
        assert_eq!(
            merged["SliceLocation"],
            json!({"merged": true, "value": {"1": {"value": 0}, "2": {"value": 1}, "3": {"value": 2}}})
        );
        assert_eq!(
            merged["Modality"],
            json!({"merged": true, "value": {"1": {"value": "MR"}, "2": {"value": "MR"}, "3": {"value": "CT"}}})
        );
    }

    #[test]
    fn test_merge_same_identity_new_value_wins() {
        let first = meta(&[
            ("imageUid", json!({"value": "a"})),
            ("label", json!({"value": "old"})),
            ("extra", json!({"value": 1})),
        ]);
        let again = meta(&[("imageUid", json!({"value": "a"})), ("label", json!({"value": "new"}))]);

        let merged = merge_metadata(&first, &again, IMAGE_UID_KEY).unwrap();

        assert_eq!(merged["imageUid"], json!({"value": "a"}));
        assert_eq!(merged["label"], json!({"value": "new"}));
        assert_eq!(merged["extra"], json!({"value": 1}));
    }

    #[test]
    fn test_merge_requires_identity_key() {
        let with_key = meta(&[("imageUid", json!({"value": "a"}))]);
        let without = meta(&[("label", json!({"value": "x"}))]);

        assert_eq!(
            merge_metadata(&without, &with_key, IMAGE_UID_KEY),
            Err(DataError::MissingIdentityKey {
                key: "imageUid".to_string(),
                side: "existing"
            })
        );
        assert_eq!(
            merge_metadata(&with_key, &without, IMAGE_UID_KEY),
            Err(DataError::MissingIdentityKey {
                key: "imageUid".to_string(),
                side: "incoming"
            })
        );
    }
}
