// Pipeline processing: schema validation, date coercion, filtering and aggregation

pub mod aggregate;
pub mod filter;
pub mod normalize;
pub mod schema;

pub use aggregate::{Aggregation, DailyVolume, Metrics};
pub use filter::CategorySelection;
pub use normalize::NormalizedRecord;
pub use schema::Record;
