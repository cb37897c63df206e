//! Domain identifiers (strongly-typed, opaque IDs).
//!
//! Owner と Fragment の ID はどちらも不透明な文字列です。
//! core は中身を解釈・ハッシュしません（それは identity 層の責務）。
//!
//! ## Phantom Type パターン
//! `Id<T>` で共通実装を提供し、`T` はコンパイル時の型安全性のためだけに使う
//! マーカー型です。`OwnerId` と `FragmentId` は混同できません。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

use super::errors::ValidationError;

/// IdMarker は各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// 空の ID を受け取ったときに返すエラー
    fn missing() -> ValidationError;
}

/// ジェネリック ID 型
///
/// 空文字列も表現できますが、ストアに触れる操作はすべて
/// [`Id::require`] で非空を検証します。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    value: String,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            _marker: PhantomData,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Returns the raw key, or the marker's validation error when empty.
    pub fn require(&self) -> Result<&str, ValidationError> {
        if self.value.is_empty() {
            Err(T::missing())
        } else {
            Ok(&self.value)
        }
    }
}

impl<T: IdMarker> Default for Id<T> {
    fn default() -> Self {
        Self::new(String::new())
    }
}

impl<T: IdMarker> From<&str> for Id<T> {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<String> for Id<T> {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::new(ulid.to_string())
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Owner のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Owner {}

impl IdMarker for Owner {
    fn missing() -> ValidationError {
        ValidationError::MissingOwnerId
    }
}

/// Fragment のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Frag {}

impl IdMarker for Frag {
    fn missing() -> ValidationError {
        ValidationError::MissingFragmentId
    }
}

/// Opaque, already-verified identity of the principal owning fragments.
pub type OwnerId = Id<Owner>;

/// Identifier of a fragment, unique across all owners.
pub type FragmentId = Id<Frag>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::TypeId;

    #[test]
    fn ids_are_distinct_types() {
        let owner = OwnerId::new("a1b2");
        let fragment = FragmentId::new("a1b2");

        // 文字列は同じでも型が異なる
        assert_eq!(owner.as_str(), fragment.as_str());
        assert_ne!(TypeId::of::<OwnerId>(), TypeId::of::<FragmentId>());
        assert_ne!(
            OwnerId::default().require().unwrap_err(),
            FragmentId::default().require().unwrap_err()
        );
    }

    #[test]
    fn require_rejects_empty_values() {
        assert!(matches!(
            OwnerId::new("").require(),
            Err(ValidationError::MissingOwnerId)
        ));
        assert!(matches!(
            FragmentId::new("").require(),
            Err(ValidationError::MissingFragmentId)
        ));
        assert_eq!(FragmentId::new("f1").require().unwrap(), "f1");
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let id = FragmentId::new("f1");
        let serialized = serde_json::to_string(&id).unwrap();
        assert_eq!(serialized, "\"f1\"");

        let back: FragmentId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_is_the_raw_value() {
        let ulid = Ulid::new();
        let id: FragmentId = ulid.into();
        assert_eq!(id.to_string(), ulid.to_string());
    }
}
