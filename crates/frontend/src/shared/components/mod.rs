pub mod table;
pub mod table_totals_row;

pub use table_totals_row::TableTotalsRow;
