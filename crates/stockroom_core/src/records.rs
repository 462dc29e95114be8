use crate::asset::AssetId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const TAG_MAX_LEN: usize = 64;

/// Kinds of loosely typed records kept next to an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Tag,
    Status,
    Activity,
}

impl RecordKind {
    pub const NAMES: [&'static str; 3] = ["tag", "status", "activity"];

    /// Values accepted as the `data` of a status record.
    pub const STATUSES: [&'static str; 3] = ["active", "archived", "deleted"];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Tag => "tag",
            RecordKind::Status => "status",
            RecordKind::Activity => "activity",
        }
    }

    pub fn from_name(name: &str) -> Option<RecordKind> {
        match name {
            "tag" => Some(RecordKind::Tag),
            "status" => Some(RecordKind::Status),
            "activity" => Some(RecordKind::Activity),
            _ => None,
        }
    }
}

/// A tag, status entry or activity entry keyed by the asset it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuxiliaryRecord {
    pub id: Uuid,
    pub asset_id: AssetId,
    pub kind: RecordKind,
    pub data: Value,
    pub created_at: DateTime<Utc>,
}
