pub mod error;
pub mod frame;
pub mod types;
pub mod value;

pub use error::{CoerceError, ConvertError};
pub use frame::{Column, ColumnValues, Frame, FrameMeta, Labels, Notice, NoticeSeverity};
pub use types::{ColumnDescriptor, ColumnType, TypedValue, ValueKind};
pub use value::{RawRow, RawValue};
