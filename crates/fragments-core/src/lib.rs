//! fragments-core
//!
//! Owner-scoped storage of typed byte payloads ("fragments") with
//! read-time format conversion.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, record, media_type, errors, response）
//! - **ports**: 抽象化レイヤー（KeyedStore, Clock, IdGenerator）
//! - **impls**: 実装（InMemoryKeyedStore）
//! - **repository**: record <-> KeyedStore の変換（FragmentRepository）
//! - **fragment**: Fragment 集約（save / get_data / set_data / delete）
//! - **conversion**: 拡張子による変換表（ConversionEngine）
//! - **app**: 境界層から呼ばれる入口（FragmentsBuilder, Fragments）
//!
//! core 自身はスレッドもタスクも起動しない受動的なライブラリです。
//! 失敗はすべて呼び出し側に返し、ログには出しません。

pub mod app;
pub mod config;
pub mod conversion;
pub mod domain;
pub mod fragment;
pub mod impls;
pub mod ports;
pub mod repository;

pub use crate::app::{BuildError, Fragments, FragmentsBuilder};
pub use crate::config::FragmentsConfig;
pub use crate::conversion::{ConversionEngine, Converted, split_extension};
pub use crate::domain::{
    ErrorKind, ErrorResponse, FragmentError, FragmentId, FragmentRecord, OwnerId,
    SuccessResponse, ValidationError,
};
pub use crate::fragment::{Fragment, FragmentContext, NewFragment};
pub use crate::repository::{FragmentList, FragmentRepository};
