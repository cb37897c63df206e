//! Ports - 抽象化レイヤー
//!
//! core が依存する trait を定義します。Fragment / ConversionEngine のロジックは
//! 具体的な HashMap ではなくこれらの trait にのみ依存するため、
//! 永続ストアへの差し替えがロジックに影響しません。

pub mod clock;
pub mod id_generator;
pub mod keyed_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::keyed_store::{KeyedStore, StoreError};
