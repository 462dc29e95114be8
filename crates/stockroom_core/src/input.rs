//! Conversion of request bodies into validated values.

use crate::asset::{
    AssetChanges, AssetDraft, AssetId, Category, DESCRIPTION_MAX_LEN, IMAGE_KEY_MAX_LEN,
    NAME_MAX_LEN,
};
use crate::error::ValidationError;
use crate::records::{RecordKind, TAG_MAX_LEN};
use crate::validation::*;
use serde_json::{Map, Value};

pub const FILENAME_MAX_LEN: usize = 255;

/// Parses raw body bytes into a JSON object.
pub fn json_object(body: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(ValidationError::new("Request body must be a JSON object")),
    }
}

/// Validated fields of a create request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    pub owner_id: String,
    pub name: String,
    pub category: Category,
    pub description: Option<String>,
    pub image_key: Option<String>,
}

impl NewAsset {
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        let owner_id = require_non_empty_string(body.get("ownerId"), "ownerId")?;
        let name = parse_name(body.get("name"))?;
        let category = parse_category(body.get("category"))?;
        let description = parse_description(body.get("description"))?;
        let image_key = parse_image_key(body.get("imageKey"), &owner_id)?;

        Ok(Self {
            owner_id,
            name,
            category,
            description,
            image_key,
        })
    }

    pub fn into_draft(self, id: AssetId) -> AssetDraft {
        AssetDraft {
            id,
            owner_id: self.owner_id,
            name: self.name,
            description: self.description,
            category: self.category,
            image_key: self.image_key,
        }
    }
}

/// Builds a partial update from whichever mutable fields are present in `body`.
/// Every present field is validated with the same rules as on create.
pub fn parse_changes(
    body: &Map<String, Value>,
    owner_id: &str,
) -> Result<AssetChanges, ValidationError> {
    let mut changes = AssetChanges::default();

    if body.contains_key("name") {
        changes.name = Some(parse_name(body.get("name"))?);
    }
    if body.contains_key("category") {
        changes.category = Some(parse_category(body.get("category"))?);
    }
    if body.contains_key("description") {
        changes.description = Some(parse_description(body.get("description"))?);
    }
    if body.contains_key("imageKey") {
        changes.image_key = Some(parse_image_key(body.get("imageKey"), owner_id)?);
    }

    Ok(changes)
}

fn parse_name(value: Option<&Value>) -> Result<String, ValidationError> {
    let name = require_non_empty_string(value, "name")?;
    require_length(&name, "name", 1, NAME_MAX_LEN)?;
    Ok(name)
}

pub fn parse_category(value: Option<&Value>) -> Result<Category, ValidationError> {
    let name = require_enum(value, &Category::NAMES, "category")?;
    Category::from_name(name).ok_or_else(|| {
        ValidationError::for_field("category", format!("unknown category '{name}'"))
    })
}

fn parse_description(value: Option<&Value>) -> Result<Option<String>, ValidationError> {
    let description = optional_string(value, "description")?;
    if let Some(d) = &description {
        require_length(d, "description", 0, DESCRIPTION_MAX_LEN)?;
    }
    Ok(description)
}

/// Only the shape is checked: the key must live under the owner's prefix.
fn parse_image_key(value: Option<&Value>, owner_id: &str) -> Result<Option<String>, ValidationError> {
    let Some(key) = optional_string(value, "imageKey")? else {
        return Ok(None);
    };
    require_length(&key, "imageKey", 1, IMAGE_KEY_MAX_LEN)?;

    if key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
        return Err(ValidationError::for_field(
            "imageKey",
            "imageKey must be a relative storage path",
        ));
    }
    if !key.starts_with(&format!("{owner_id}/")) {
        return Err(ValidationError::for_field(
            "imageKey",
            "imageKey must reference a blob owned by the asset owner",
        ));
    }
    Ok(Some(key))
}

/// Validates an upload filename so it can be used as a single path segment.
pub fn parse_filename(value: Option<&str>) -> Result<String, ValidationError> {
    let name = value.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(ValidationError::for_field("filename", "filename is required"));
    }
    require_length(name, "filename", 1, FILENAME_MAX_LEN)?;
    if name == "."
        || name.contains("..")
        || name.contains(['/', '\\'])
        || name.chars().any(char::is_control)
    {
        return Err(ValidationError::for_field(
            "filename",
            "filename must be a plain file name",
        ));
    }
    Ok(name.to_string())
}

/// Validated body of an auxiliary record request.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub kind: RecordKind,
    pub data: Value,
}

impl NewRecord {
    pub fn from_json(body: &Map<String, Value>) -> Result<Self, ValidationError> {
        let kind = require_enum(body.get("kind"), &RecordKind::NAMES, "kind")?;
        let kind = RecordKind::from_name(kind)
            .ok_or_else(|| ValidationError::for_field("kind", format!("unknown kind '{kind}'")))?;

        let data = match kind {
            RecordKind::Tag => {
                let tag = require_non_empty_string(body.get("data"), "data")?.to_lowercase();
                require_length(&tag, "data", 1, TAG_MAX_LEN)?;
                Value::String(tag)
            }
            RecordKind::Status => {
                let status = require_enum(body.get("data"), &RecordKind::STATUSES, "data")?;
                Value::String(status.to_string())
            }
            RecordKind::Activity => match body.get("data") {
                Some(Value::Object(map)) => Value::Object(map.clone()),
                _ => {
                    return Err(ValidationError::for_field(
                        "data",
                        "data must be an object for activity records",
                    ));
                }
            },
        };

        Ok(Self { kind, data })
    }
}
