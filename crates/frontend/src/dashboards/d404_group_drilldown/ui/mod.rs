mod breadcrumb_trail;
mod dashboard;
mod filter_bar;
mod leaf_detail_table;
mod panel_column;

pub use breadcrumb_trail::BreadcrumbTrail;
pub use dashboard::GroupDrilldownDashboard;
pub use filter_bar::FilterBar;
pub use leaf_detail_table::LeafDetailTable;
pub use panel_column::PanelColumn;
