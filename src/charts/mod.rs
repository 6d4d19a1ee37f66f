//! Charts of income and expenses by category and by month.

mod api;
mod options;
mod page;

pub use api::get_charts_api;
pub use page::get_charts_page;
