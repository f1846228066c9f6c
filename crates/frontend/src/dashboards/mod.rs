pub mod d404_group_drilldown;

pub use d404_group_drilldown::ui::GroupDrilldownDashboard;
