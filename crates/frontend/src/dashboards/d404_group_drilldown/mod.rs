pub mod api;
pub mod breadcrumbs;
pub mod leaf_detail;
pub mod panel_stack;
pub mod resolver;
pub mod ui;
