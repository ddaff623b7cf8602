//! Rust counterparts of the PostgreSQL enum types.

mod model_type;
mod record_status;

pub use self::model_type::ModelType;
pub use self::record_status::RecordStatus;
