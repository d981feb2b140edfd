pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{error, header, info, number, status, success, summary_row, warn};
pub use table::{TableBuilder, attributes_table, records_table, stats_table};
pub use theme::{theme, Theme};
