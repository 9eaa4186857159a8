mod report;
mod summary;

pub use report::Aggregator;
pub use summary::write_summary;
