mod classify;
mod fields;
mod record;
mod row;

pub(crate) use record::json_kind;
pub use record::WorkloadRecord;
pub use row::{ClassifiedRow, RowError};
