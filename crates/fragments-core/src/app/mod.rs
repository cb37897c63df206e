//! App - アプリケーション層
//!
//! 境界層（HTTP など）から呼ばれる入口です。ownerId は検証済みの
//! 不透明な文字列として受け取り、ここでは解釈しません。
//!
//! # 主要コンポーネント
//! - **FragmentsBuilder**: ストア・時計・変換表のワイヤリング
//! - **Fragments**: 作成 / 取得 / 一覧 / 変換付き読み出し / 削除

pub mod builder;

pub use self::builder::{BuildError, FragmentsBuilder};

use crate::config::FragmentsConfig;
use crate::conversion::{ConversionEngine, Converted, split_extension};
use crate::domain::{FragmentError, FragmentId, OwnerId, ValidationError};
use crate::fragment::{Fragment, FragmentContext, NewFragment};
use crate::repository::FragmentList;

pub struct Fragments {
    ctx: FragmentContext,
    config: FragmentsConfig,
}

impl Fragments {
    pub fn new(ctx: FragmentContext, config: FragmentsConfig) -> Self {
        Self { ctx, config }
    }

    pub fn builder() -> FragmentsBuilder {
        FragmentsBuilder::new()
    }

    pub fn context(&self) -> &FragmentContext {
        &self.ctx
    }

    pub fn config(&self) -> &FragmentsConfig {
        &self.config
    }

    pub fn engine(&self) -> &ConversionEngine {
        self.ctx.engine()
    }

    /// Reject payloads over the configured limit before they reach the core.
    pub fn check_payload_size(&self, len: usize) -> Result<(), ValidationError> {
        if len > self.config.max_payload_bytes {
            return Err(ValidationError::InvalidPayload(format!(
                "payload of {len} bytes exceeds the {} byte limit",
                self.config.max_payload_bytes
            )));
        }
        Ok(())
    }

    /// Create a fragment from a raw `Content-Type` and body, and store both.
    pub async fn create(
        &self,
        owner_id: &OwnerId,
        content_type: &str,
        data: Vec<u8>,
    ) -> Result<Fragment, FragmentError> {
        if content_type.trim().is_empty() {
            return Err(ValidationError::MissingType.into());
        }
        if data.is_empty() {
            return Err(ValidationError::InvalidPayload("fragment data is required".into()).into());
        }
        self.check_payload_size(data.len())?;

        let mut fragment =
            Fragment::new(&self.ctx, NewFragment::new(owner_id.clone(), content_type))?;
        fragment.set_data(data).await?;
        Ok(fragment)
    }

    pub async fn get(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
    ) -> Result<Option<Fragment>, FragmentError> {
        Fragment::by_id(&self.ctx, owner_id, id).await
    }

    /// Ids only, or full records when `expand` is set.
    pub async fn list(&self, owner_id: &OwnerId, expand: bool) -> Result<FragmentList, FragmentError> {
        let fragments = Fragment::by_user(&self.ctx, owner_id).await?;
        Ok(if expand {
            FragmentList::Expanded(fragments.into_iter().map(Fragment::into_record).collect())
        } else {
            FragmentList::Ids(fragments.iter().map(|f| f.id().clone()).collect())
        })
    }

    /// Read a fragment's payload, converted when `extension` is given.
    ///
    /// `Ok(None)` when the fragment does not exist for this owner. A fragment
    /// whose payload was never written reads as an empty body.
    pub async fn read(
        &self,
        owner_id: &OwnerId,
        id: &FragmentId,
        extension: Option<&str>,
    ) -> Result<Option<Converted>, FragmentError> {
        let Some(fragment) = self.get(owner_id, id).await? else {
            return Ok(None);
        };
        let data = fragment.get_data().await?.unwrap_or_default();
        self.engine()
            .convert(fragment.fragment_type(), data, extension)
            .map(Some)
    }

    /// Like [`Fragments::read`], taking a path segment such as `abc.html`.
    pub async fn read_path(
        &self,
        owner_id: &OwnerId,
        segment: &str,
    ) -> Result<Option<Converted>, FragmentError> {
        let (id, ext) = split_extension(segment);
        self.read(owner_id, &FragmentId::new(id), ext.as_deref()).await
    }

    pub async fn delete(&self, owner_id: &OwnerId, id: &FragmentId) -> Result<bool, FragmentError> {
        match self.get(owner_id, id).await? {
            Some(fragment) => fragment.delete().await,
            None => Ok(false),
        }
    }
}
