/// Table cleaning

pub mod table_cleaner;

pub use table_cleaner::{quantile, IqrBounds, TableCleaner};
