pub mod d404_group_drilldown;
