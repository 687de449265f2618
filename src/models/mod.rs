pub mod query;
pub mod rows;
pub mod table;

pub use query::{Dimensions, Metric, ReportQuery, Source};
pub use rows::{or_zero, DueSoonRow, HeaderRow, ItemRow, LowStockRow, DEFAULT_CURRENCY};
pub use table::{Cell, ReportTable};
