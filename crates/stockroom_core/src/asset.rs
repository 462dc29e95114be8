use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

pub type AssetId = Uuid;

pub const NAME_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 5000;
pub const IMAGE_KEY_MAX_LEN: usize = 1024;

pub const DEFAULT_PAGE_LIMIT: u64 = 10;
pub const MAX_PAGE_LIMIT: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Image,
    Document,
    Video,
    Other,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Image,
        Category::Document,
        Category::Video,
        Category::Other,
    ];

    pub const NAMES: [&'static str; 4] = ["image", "document", "video", "other"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Image => "image",
            Category::Document => "document",
            Category::Video => "video",
            Category::Other => "other",
        }
    }

    /// Looks up an already normalized (lowercase) name.
    pub fn from_name(name: &str) -> Option<Category> {
        Self::ALL.into_iter().find(|c| c.as_str() == name)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tracked item owned by exactly one principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    /// Generated at creation, never reused.
    pub id: AssetId,

    /// The creating principal. Never changes.
    pub owner_id: String,

    pub name: String,

    pub description: Option<String>,

    pub category: Category,

    /// Storage location token of an attached blob, e.g. `u1/<asset id>/photo.png`.
    pub image_key: Option<String>,

    /// Set by the repository.
    pub created_at: DateTime<Utc>,

    /// Set by the repository.
    pub updated_at: DateTime<Utc>,
}

/// A validated asset waiting to be inserted. Timestamps are assigned by the repository.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetDraft {
    pub id: AssetId,
    pub owner_id: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Category,
    pub image_key: Option<String>,
}

impl AssetDraft {
    pub fn into_asset(self, now: DateTime<Utc>) -> Asset {
        Asset {
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            description: self.description,
            category: self.category,
            image_key: self.image_key,
            created_at: now,
            updated_at: now,
        }
    }
}

/// A partial update. `None` leaves the field untouched; for the nullable fields
/// `Some(None)` clears the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetChanges {
    pub name: Option<String>,
    pub category: Option<Category>,
    pub description: Option<Option<String>>,
    pub image_key: Option<Option<String>>,
}

impl AssetChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.description.is_none()
            && self.image_key.is_none()
    }

    pub fn image_key(key: impl Into<String>) -> Self {
        Self {
            image_key: Some(Some(key.into())),
            ..Default::default()
        }
    }

    /// Applies the changes in place. `id`, `owner_id` and `created_at` are never touched.
    pub fn apply(self, asset: &mut Asset, now: DateTime<Utc>) {
        if let Some(name) = self.name {
            asset.name = name;
        }
        if let Some(category) = self.category {
            asset.category = category;
        }
        if let Some(description) = self.description {
            asset.description = description;
        }
        if let Some(image_key) = self.image_key {
            asset.image_key = image_key;
        }
        // updated_at strictly increases, even for an empty change set
        asset.updated_at = now.max(asset.updated_at + chrono::Duration::microseconds(1));
    }
}

/// Conjunctive list filter. The owner is mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFilter {
    pub owner_id: String,
    /// Lowercased; a value outside the enumeration matches nothing.
    pub category: Option<String>,
}

impl AssetFilter {
    pub fn owned_by(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            category: None,
        }
    }

    pub fn matches(&self, asset: &Asset) -> bool {
        asset.owner_id == self.owner_id
            && self
                .category
                .as_deref()
                .is_none_or(|c| c == asset.category.as_str())
    }
}

/// One page of assets as returned by a repository, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetPage {
    pub assets: Vec<Asset>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
    pub current_page: u64,
    pub total_pages: u64,
    pub has_more: bool,
}

impl Pagination {
    /// `limit` must be positive; [`PageRequest`] guarantees it.
    pub fn new(total: u64, limit: u64, offset: u64) -> Self {
        let limit = limit.max(1);
        Self {
            total,
            limit,
            offset,
            current_page: offset / limit + 1,
            total_pages: total.div_ceil(limit),
            has_more: offset.saturating_add(limit) < total,
        }
    }
}

/// Leniently parsed `limit`/`offset` pair. Bad input falls back to the defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u64,
    pub offset: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl PageRequest {
    pub fn parse(limit: Option<&str>, offset: Option<&str>) -> Self {
        let limit = match limit.and_then(|l| l.trim().parse::<i64>().ok()) {
            Some(l) if l > 0 => (l as u64).min(MAX_PAGE_LIMIT),
            _ => DEFAULT_PAGE_LIMIT,
        };
        let offset = match offset.and_then(|o| o.trim().parse::<i64>().ok()) {
            Some(o) if o >= 0 => o as u64,
            _ => 0,
        };
        Self { limit, offset }
    }
}
