//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::ids::FragmentId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は owner をまたいで一意な fragment ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数のリクエストハンドラから使える）
pub trait IdGenerator: Send + Sync {
    fn generate_fragment_id(&self) -> FragmentId;
}

/// UlidGenerator は Clock の現在時刻を timestamp 部に使う
///
/// テストでは FixedClock を渡しても、ランダム部分があるため ID は衝突しません。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_fragment_id(&self) -> FragmentId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        let ulid = Ulid::from_parts(timestamp_ms, rand::random());
        FragmentId::from(ulid)
    }
}
