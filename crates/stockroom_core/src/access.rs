//! The ownership rule.
//!
//! A principal may only read, update or delete an asset it owns. Existence is always
//! checked before ownership, so a missing asset is reported as not found rather than
//! forbidden.

use crate::asset::{Asset, AssetId};
use crate::error::AssetError;
use crate::traits::Principal;

/// Who may read a single asset by id. Mutations are always owner-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadPolicy {
    #[default]
    OwnerOnly,
    AnyAuthenticated,
}

impl ReadPolicy {
    /// Accepts `owner` / `owner_only` and `any` / `any_authenticated`.
    pub fn from_name(name: &str) -> Option<ReadPolicy> {
        match name.trim().to_lowercase().as_str() {
            "owner" | "owner_only" => Some(ReadPolicy::OwnerOnly),
            "any" | "any_authenticated" => Some(ReadPolicy::AnyAuthenticated),
            _ => None,
        }
    }
}

pub fn ensure_owner(principal: &Principal, asset: &Asset) -> Result<(), AssetError> {
    if asset.owner_id == principal.id {
        Ok(())
    } else {
        Err(AssetError::Forbidden)
    }
}

pub fn ensure_readable(
    principal: &Principal,
    asset: &Asset,
    policy: ReadPolicy,
) -> Result<(), AssetError> {
    match policy {
        ReadPolicy::OwnerOnly => ensure_owner(principal, asset),
        ReadPolicy::AnyAuthenticated => Ok(()),
    }
}

/// Resolves a fetched row: absent is [`AssetError::NotFound`], a foreign owner is
/// [`AssetError::Forbidden`].
pub fn owned(principal: &Principal, asset: Option<Asset>) -> Result<Asset, AssetError> {
    let asset = asset.ok_or(AssetError::NotFound)?;
    ensure_owner(principal, &asset)?;
    Ok(asset)
}

/// Path ids that are not valid UUIDs cannot name an asset.
pub fn parse_asset_id(raw: &str) -> Result<AssetId, AssetError> {
    AssetId::parse_str(raw.trim()).map_err(|_| AssetError::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{AssetDraft, Category};
    use chrono::Utc;
    use uuid::Uuid;

    fn asset_of(owner: &str) -> Asset {
        AssetDraft {
            id: Uuid::new_v4(),
            owner_id: owner.into(),
            name: "Laptop".into(),
            description: None,
            category: Category::Other,
            image_key: None,
        }
        .into_asset(Utc::now())
    }

    #[test]
    fn owner_passes_others_are_forbidden() {
        let asset = asset_of("u1");
        assert!(ensure_owner(&Principal::new("u1"), &asset).is_ok());
        assert!(matches!(
            ensure_owner(&Principal::new("u2"), &asset),
            Err(AssetError::Forbidden)
        ));
    }

    #[test]
    fn read_policy_controls_single_reads() {
        let asset = asset_of("u1");
        let other = Principal::new("u2");
        assert!(ensure_readable(&other, &asset, ReadPolicy::OwnerOnly).is_err());
        assert!(ensure_readable(&other, &asset, ReadPolicy::AnyAuthenticated).is_ok());
    }

    #[test]
    fn not_found_wins_over_forbidden() {
        assert!(matches!(
            owned(&Principal::new("u2"), None),
            Err(AssetError::NotFound)
        ));
        assert!(matches!(
            owned(&Principal::new("u2"), Some(asset_of("u1"))),
            Err(AssetError::Forbidden)
        ));
    }

    #[test]
    fn malformed_ids_are_not_found() {
        assert!(matches!(parse_asset_id("nope"), Err(AssetError::NotFound)));
        let id = Uuid::new_v4();
        assert_eq!(parse_asset_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn policy_names() {
        assert_eq!(ReadPolicy::from_name("Owner"), Some(ReadPolicy::OwnerOnly));
        assert_eq!(ReadPolicy::from_name("any"), Some(ReadPolicy::AnyAuthenticated));
        assert_eq!(ReadPolicy::from_name("public"), None);
        assert_eq!(ReadPolicy::default(), ReadPolicy::OwnerOnly);
    }
}
