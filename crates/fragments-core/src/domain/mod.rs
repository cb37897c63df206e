//! Domain - ドメインモデル（ids, record, media_type, errors, response）

pub mod errors;
pub mod ids;
pub mod media_type;
pub mod record;
pub mod response;

pub use self::errors::{ErrorKind, FragmentError, ValidationError};
pub use self::ids::{FragmentId, OwnerId};
pub use self::record::FragmentRecord;
pub use self::response::{ErrorResponse, SuccessResponse};
