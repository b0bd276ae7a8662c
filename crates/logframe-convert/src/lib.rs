pub mod builder;
pub mod coerce;
pub mod query;
pub mod reshape;
pub mod response;
pub mod schema;
pub mod series;

pub use builder::build_frame;
pub use coerce::coerce;
pub use query::{process_response, ResultFormat};
pub use reshape::{long_to_wide, FillMode, ReshapeOptions, TimeAxis};
pub use response::{ResponseError, TableResponse};
pub use schema::{schema_from_slice, TableSchema};
pub use series::{expand_series, SeriesLayout};
