//! FragmentRepository - 型付き record と KeyedStore の値の橋渡し
//!
//! 2 つの独立したストアを使います:
//! - metadata: `(ownerId, id) -> JSON エンコードした FragmentRecord`
//! - data:     `(ownerId, id) -> 生のペイロード bytes`
//!
//! すべての操作は owner をキーにするため、ある owner が別の owner の
//! エントリを観測・変更することはありません。

use std::sync::Arc;

use serde::Serialize;

use crate::domain::{FragmentError, FragmentId, FragmentRecord, OwnerId};
use crate::ports::{KeyedStore, StoreError};

/// Result of [`FragmentRepository::list_fragments`].
///
/// Serializes as a bare array of ids or of full records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FragmentList {
    Ids(Vec<FragmentId>),
    Expanded(Vec<FragmentRecord>),
}

impl FragmentList {
    pub fn len(&self) -> usize {
        match self {
            FragmentList::Ids(ids) => ids.len(),
            FragmentList::Expanded(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ids(&self) -> Vec<&FragmentId> {
        match self {
            FragmentList::Ids(ids) => ids.iter().collect(),
            FragmentList::Expanded(records) => records.iter().map(|r| &r.id).collect(),
        }
    }
}

#[derive(Clone)]
pub struct FragmentRepository {
    metadata: Arc<dyn KeyedStore>,
    data: Arc<dyn KeyedStore>,
}

impl FragmentRepository {
    pub fn new(metadata: Arc<dyn KeyedStore>, data: Arc<dyn KeyedStore>) -> Self {
        Self { metadata, data }
    }

    pub async fn write_fragment(&self, record: &FragmentRecord) -> Result<(), FragmentError> {
        let owner = record.owner_id.require()?;
        let id = record.id.require()?;
        let bytes = serde_json::to_vec(record).map_err(|e| StoreError::Corrupt {
            namespace: owner.to_string(),
            key: id.to_string(),
            reason: format!("json encode: {e}"),
        })?;
        self.metadata.put(owner, id, bytes).await?;
        Ok(())
    }

    pub async fn read_fragment(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> Result<Option<FragmentRecord>, FragmentError> {
        let owner = owner_id.require()?;
        let key = id.require()?;
        match self.metadata.get(owner, key).await? {
            Some(bytes) => Ok(Some(decode_record(owner, Some(key), &bytes)?)),
            None => Ok(None),
        }
    }

    pub async fn write_fragment_data(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        data: Vec<u8>,
    ) -> Result<(), FragmentError> {
        let owner = owner_id.require()?;
        let key = id.require()?;
        self.data.put(owner, key, data).await?;
        Ok(())
    }

    pub async fn read_fragment_data(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> Result<Option<Vec<u8>>, FragmentError> {
        let owner = owner_id.require()?;
        let key = id.require()?;
        Ok(self.data.get(owner, key).await?)
    }

    /// All fragments recorded under `owner_id`, in no particular order.
    pub async fn list_fragments(
        &self,
        owner_id: &OwnerId,
        expand: bool,
    ) -> Result<FragmentList, FragmentError> {
        let owner = owner_id.require()?;
        let records = self
            .metadata
            .query(owner)
            .await?
            .iter()
            .map(|bytes| decode_record(owner, None, bytes))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(if expand {
            FragmentList::Expanded(records)
        } else {
            FragmentList::Ids(records.into_iter().map(|r| r.id).collect())
        })
    }

    /// Removes metadata and data for the key. Missing entries are not an error,
    /// so this returns `true` once both removals have been attempted.
    pub async fn delete_fragment(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> Result<bool, FragmentError> {
        let owner = owner_id.require()?;
        let key = id.require()?;

        let metadata = self.metadata.delete(owner, key).await;
        let data = self.data.delete(owner, key).await;
        metadata?;
        data?;
        Ok(true)
    }
}

/// `key` is `None` for values coming from `query`, which carries no keys.
/// The id is then recovered from the value itself when it is readable.
fn decode_record(
    owner: &str,
    key: Option<&str>,
    bytes: &[u8],
) -> Result<FragmentRecord, StoreError> {
    let record: FragmentRecord = serde_json::from_slice(bytes).map_err(|e| StoreError::Corrupt {
        namespace: owner.to_string(),
        key: key.map_or_else(|| stored_id(bytes), str::to_string),
        reason: e.to_string(),
    })?;
    // A record filed under another owner's namespace is corruption, never a leak.
    if record.owner_id.as_str() != owner {
        return Err(StoreError::Corrupt {
            namespace: owner.to_string(),
            key: record.id.to_string(),
            reason: format!("record belongs to owner {}", record.owner_id),
        });
    }
    Ok(record)
}

/// Best-effort `id` of an undecodable record, `?` when even that is unreadable.
fn stored_id(bytes: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(bytes)
        .ok()
        .and_then(|value| value.get("id")?.as_str().map(str::to_string))
        .unwrap_or_else(|| "?".to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::ValidationError;
    use crate::impls::InMemoryKeyedStore;
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};

    pub(crate) fn memory_repository() -> FragmentRepository {
        FragmentRepository::new(
            Arc::new(InMemoryKeyedStore::new()),
            Arc::new(InMemoryKeyedStore::new()),
        )
    }

    /// Store double whose every call fails.
    pub(crate) struct UnavailableStore;

    #[async_trait]
    impl KeyedStore for UnavailableStore {
        async fn put(&self, _: &str, _: &str, _: Vec<u8>) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }
        async fn get(&self, _: &str, _: &str) -> Result<Option<Vec<u8>>, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }
        async fn query(&self, _: &str) -> Result<Vec<Vec<u8>>, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }
        async fn delete(&self, _: &str, _: &str) -> Result<bool, StoreError> {
            Err(StoreError::Unavailable("offline".into()))
        }
    }

    fn record(owner: &str, id: &str) -> FragmentRecord {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        FragmentRecord {
            id: FragmentId::new(id),
            owner_id: OwnerId::new(owner),
            created: at,
            updated: at,
            fragment_type: "text/plain".into(),
            size: 0,
        }
    }

    #[tokio::test]
    async fn read_fragment_missing_is_none() {
        let repo = memory_repository();
        let found = repo
            .read_fragment(&OwnerId::new("owner"), &FragmentId::new("non-existent-id"))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn write_then_read_fragment() {
        let repo = memory_repository();
        let rec = record("user-123", "test-fragment-1");
        repo.write_fragment(&rec).await.unwrap();

        let found = repo
            .read_fragment(&rec.owner_id, &rec.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, rec);
    }

    #[tokio::test]
    async fn write_fragment_requires_owner_and_id() {
        let repo = memory_repository();

        let err = repo.write_fragment(&record("", "f1")).await.unwrap_err();
        assert!(matches!(
            err,
            FragmentError::Validation(ValidationError::MissingOwnerId)
        ));

        let err = repo.write_fragment(&record("owner", "")).await.unwrap_err();
        assert!(matches!(
            err,
            FragmentError::Validation(ValidationError::MissingFragmentId)
        ));
    }

    #[tokio::test]
    async fn fragment_data_roundtrip() {
        let repo = memory_repository();
        let owner = OwnerId::new("user1");
        let id = FragmentId::new("frag1");

        assert!(repo.read_fragment_data(&owner, &id).await.unwrap().is_none());
        repo.write_fragment_data(&owner, &id, b"Hello world".to_vec())
            .await
            .unwrap();
        assert_eq!(
            repo.read_fragment_data(&owner, &id).await.unwrap(),
            Some(b"Hello world".to_vec())
        );
    }

    #[tokio::test]
    async fn list_fragments_ids_and_expanded() {
        let repo = memory_repository();
        repo.write_fragment(&record("U", "f1")).await.unwrap();
        repo.write_fragment(&record("U", "f2")).await.unwrap();
        repo.write_fragment(&record("someone-else", "f3")).await.unwrap();
        let owner = OwnerId::new("U");

        let FragmentList::Ids(mut ids) = repo.list_fragments(&owner, false).await.unwrap() else {
            panic!("expected ids");
        };
        ids.sort();
        assert_eq!(ids, vec![FragmentId::new("f1"), FragmentId::new("f2")]);

        let FragmentList::Expanded(mut records) = repo.list_fragments(&owner, true).await.unwrap()
        else {
            panic!("expected records");
        };
        records.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(records, vec![record("U", "f1"), record("U", "f2")]);
    }

    #[tokio::test]
    async fn list_fragments_for_unknown_owner_is_empty() {
        let repo = memory_repository();
        let list = repo
            .list_fragments(&OwnerId::new("nobody"), false)
            .await
            .unwrap();
        assert!(list.is_empty());
        assert_eq!(serde_json::to_string(&list).unwrap(), "[]");
    }

    #[tokio::test]
    async fn delete_fragment_removes_metadata_and_data() {
        let repo = memory_repository();
        let rec = record("owner", "fragment-to-delete");
        repo.write_fragment(&rec).await.unwrap();
        repo.write_fragment_data(&rec.owner_id, &rec.id, b"test data".to_vec())
            .await
            .unwrap();

        assert!(repo.delete_fragment(&rec.owner_id, &rec.id).await.unwrap());
        assert!(repo.read_fragment(&rec.owner_id, &rec.id).await.unwrap().is_none());
        assert!(
            repo.read_fragment_data(&rec.owner_id, &rec.id)
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn delete_of_never_existing_fragment_still_succeeds() {
        let repo = memory_repository();
        let deleted = repo
            .delete_fragment(&OwnerId::new("owner"), &FragmentId::new("non-existent-id"))
            .await
            .unwrap();
        assert!(deleted);
    }

    #[tokio::test]
    async fn delete_is_scoped_by_owner() {
        let repo = memory_repository();
        let rec = record("A", "X");
        repo.write_fragment(&rec).await.unwrap();

        repo.delete_fragment(&OwnerId::new("B"), &rec.id).await.unwrap();
        assert!(repo.read_fragment(&rec.owner_id, &rec.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn corrupt_metadata_surfaces_as_storage_failure() {
        let metadata = Arc::new(InMemoryKeyedStore::new());
        metadata.put("owner", "f1", b"not json".to_vec()).await.unwrap();
        let repo = FragmentRepository::new(metadata, Arc::new(InMemoryKeyedStore::new()));

        let err = repo
            .read_fragment(&OwnerId::new("owner"), &FragmentId::new("f1"))
            .await
            .unwrap_err();
        assert!(matches!(err, FragmentError::Storage(StoreError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn corrupt_listing_reports_the_stored_id() {
        let metadata = Arc::new(InMemoryKeyedStore::new());
        metadata
            .put("owner", "f1", br#"{"id":"f1","ownerId":"owner","size":-1}"#.to_vec())
            .await
            .unwrap();
        let repo = FragmentRepository::new(metadata.clone(), Arc::new(InMemoryKeyedStore::new()));

        let err = repo.list_fragments(&OwnerId::new("owner"), false).await.unwrap_err();
        let FragmentError::Storage(StoreError::Corrupt { namespace, key, .. }) = err else {
            panic!("expected a corrupt record");
        };
        assert_eq!(namespace, "owner");
        assert_eq!(key, "f1");

        metadata.put("owner", "f1", b"not json".to_vec()).await.unwrap();
        let err = repo.list_fragments(&OwnerId::new("owner"), true).await.unwrap_err();
        assert!(matches!(
            err,
            FragmentError::Storage(StoreError::Corrupt { ref key, .. }) if key == "?"
        ));
    }

    #[tokio::test]
    async fn unavailable_store_propagates() {
        let repo = FragmentRepository::new(Arc::new(UnavailableStore), Arc::new(UnavailableStore));

        let err = repo.write_fragment(&record("owner", "f1")).await.unwrap_err();
        assert!(matches!(err, FragmentError::Storage(StoreError::Unavailable(_))));

        let err = repo
            .delete_fragment(&OwnerId::new("owner"), &FragmentId::new("f1"))
            .await
            .unwrap_err();
        assert!(matches!(err, FragmentError::Storage(_)));
    }
}
