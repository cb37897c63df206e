//! Fragment - 集約（ID、type 検証、size 管理、永続化）
//!
//! # ライフサイクル
//! - `Fragment::new`: 検証し、id / タイムスタンプを割り当て
//! - `save`: メタデータを保存
//! - `set_data`: ペイロード、続いて新しい size のメタデータを保存
//! - `get_data` / `by_id` / `by_user`: 何度でも
//! - `delete`: メタデータとペイロードを削除

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::conversion::ConversionEngine;
use crate::domain::media_type;
use crate::domain::{FragmentError, FragmentId, FragmentRecord, OwnerId, ValidationError};
use crate::ports::{Clock, IdGenerator, StoreError};
use crate::repository::FragmentRepository;

/// Everything a fragment needs to reach its stores. Cheap to clone.
#[derive(Clone)]
pub struct FragmentContext {
    pub(crate) repository: FragmentRepository,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) ids: Arc<dyn IdGenerator>,
    pub(crate) engine: Arc<ConversionEngine>,
}

impl FragmentContext {
    pub fn new(
        repository: FragmentRepository,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        engine: Arc<ConversionEngine>,
    ) -> Self {
        Self {
            repository,
            clock,
            ids,
            engine,
        }
    }

    pub fn repository(&self) -> &FragmentRepository {
        &self.repository
    }

    pub fn engine(&self) -> &ConversionEngine {
        &self.engine
    }
}

/// Input for [`Fragment::new`]. Unset optional fields are generated.
#[derive(Debug, Clone, Default)]
pub struct NewFragment {
    pub id: Option<FragmentId>,
    pub owner_id: OwnerId,
    pub fragment_type: String,
    pub size: u64,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl NewFragment {
    pub fn new(owner_id: impl Into<OwnerId>, fragment_type: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            fragment_type: fragment_type.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<FragmentId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }
}

pub struct Fragment {
    record: FragmentRecord,
    ctx: FragmentContext,
}

impl Fragment {
    /// Validate and build a new fragment. Nothing is persisted until `save`/`set_data`.
    pub fn new(ctx: &FragmentContext, input: NewFragment) -> Result<Self, ValidationError> {
        input.owner_id.require()?;
        if input.fragment_type.trim().is_empty() {
            return Err(ValidationError::MissingType);
        }
        if !ctx.engine.is_supported_type(&input.fragment_type) {
            return Err(ValidationError::UnsupportedType(input.fragment_type));
        }

        let now = ctx.clock.now();
        let id = match input.id {
            Some(id) if !id.is_empty() => id,
            _ => ctx.ids.generate_fragment_id(),
        };
        let created = input.created.unwrap_or(now);
        let record = FragmentRecord {
            id,
            owner_id: input.owner_id,
            created,
            updated: input.updated.unwrap_or(created),
            fragment_type: input.fragment_type,
            size: input.size,
        };
        tracing::debug!(owner = %record.owner_id, id = %record.id, fragment_type = %record.fragment_type, "fragment created");

        Ok(Self {
            record,
            ctx: ctx.clone(),
        })
    }

    /// Rehydrate a stored record. The creation type gate is not re-applied,
    /// so fragments of any stored type stay readable.
    fn from_record(ctx: &FragmentContext, record: FragmentRecord) -> Result<Self, StoreError> {
        if record.owner_id.is_empty() || record.fragment_type.trim().is_empty() {
            return Err(StoreError::Corrupt {
                namespace: record.owner_id.to_string(),
                key: record.id.to_string(),
                reason: "record is missing owner or type".to_string(),
            });
        }
        Ok(Self {
            record,
            ctx: ctx.clone(),
        })
    }

    /// All fragments of `owner_id`. Entries deleted between listing and loading are skipped.
    pub async fn by_user(
        ctx: &FragmentContext,
        owner_id: &OwnerId,
    ) -> Result<Vec<Fragment>, FragmentError> {
        let listed = ctx.repository.list_fragments(owner_id, false).await?;
        let mut fragments = Vec::with_capacity(listed.len());
        for id in listed.ids() {
            if let Some(record) = ctx.repository.read_fragment(owner_id, id).await? {
                fragments.push(Self::from_record(ctx, record)?);
            }
        }
        Ok(fragments)
    }

    pub async fn by_id(
        ctx: &FragmentContext,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> Result<Option<Fragment>, FragmentError> {
        id.require()?;
        match ctx.repository.read_fragment(owner_id, id).await? {
            Some(record) => Ok(Some(Self::from_record(ctx, record)?)),
            None => Ok(None),
        }
    }

    /// Refresh `updated` and persist the metadata record.
    pub async fn save(&mut self) -> Result<(), FragmentError> {
        let mut next = self.record.clone();
        next.updated = self.ctx.clock.now();
        self.ctx.repository.write_fragment(&next).await?;
        self.record = next;
        Ok(())
    }

    /// `None` if no payload has ever been written for this fragment.
    pub async fn get_data(&self) -> Result<Option<Vec<u8>>, FragmentError> {
        self.ctx
            .repository
            .read_fragment_data(&self.record.owner_id, &self.record.id)
            .await
    }

    /// Write the payload, then the metadata carrying its size.
    ///
    /// The two writes are not atomic together. The new size and timestamp are
    /// only applied to `self` once both have succeeded; if the metadata write
    /// fails the stored size may lag the stored payload until the next
    /// successful `set_data`/`save`.
    pub async fn set_data(&mut self, data: impl Into<Vec<u8>>) -> Result<(), FragmentError> {
        let data = data.into();
        let mut next = self.record.clone();
        next.size = data.len() as u64;
        next.updated = self.ctx.clock.now();

        self.ctx
            .repository
            .write_fragment_data(&next.owner_id, &next.id, data)
            .await?;
        self.ctx.repository.write_fragment(&next).await?;

        tracing::debug!(owner = %next.owner_id, id = %next.id, size = next.size, "fragment data written");
        self.record = next;
        Ok(())
    }

    pub async fn delete(&self) -> Result<bool, FragmentError> {
        let deleted = self
            .ctx
            .repository
            .delete_fragment(&self.record.owner_id, &self.record.id)
            .await?;
        tracing::debug!(owner = %self.record.owner_id, id = %self.record.id, "fragment deleted");
        Ok(deleted)
    }

    pub fn id(&self) -> &FragmentId {
        &self.record.id
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.record.owner_id
    }

    /// The full content type, parameters included.
    pub fn fragment_type(&self) -> &str {
        &self.record.fragment_type
    }

    pub fn size(&self) -> u64 {
        self.record.size
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.record.created
    }

    pub fn updated(&self) -> DateTime<Utc> {
        self.record.updated
    }

    /// The content type without parameters.
    pub fn mime_type(&self) -> String {
        media_type::essence(&self.record.fragment_type)
    }

    pub fn is_text(&self) -> bool {
        media_type::is_text(&self.record.fragment_type)
    }

    /// Representations this fragment can be read as without an extension.
    pub fn formats(&self) -> Vec<String> {
        if self.is_text() {
            vec![self.mime_type()]
        } else {
            Vec::new()
        }
    }

    pub fn record(&self) -> &FragmentRecord {
        &self.record
    }

    pub fn into_record(self) -> FragmentRecord {
        self.record
    }
}

impl std::fmt::Debug for Fragment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Fragment").field(&self.record).finish()
    }
}
