pub mod category;
pub mod report;

pub use category::Category;
pub use report::{AggregateSummary, CategoryReport, ExtractionResult, RunSnapshot};
