//! FragmentRecord - メタデータストアに保存される形

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::{FragmentId, OwnerId};

/// Metadata for one fragment. Payload bytes live in a separate store under the same key.
///
/// Serialized with camelCase names (`id, ownerId, created, updated, type, size`),
/// which is also the shape returned by the "info" and expanded listing views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentRecord {
    pub id: FragmentId,
    pub owner_id: OwnerId,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(rename = "type")]
    pub fragment_type: String,
    pub size: u64,
}
