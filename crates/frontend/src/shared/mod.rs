pub mod api_utils;
pub mod components;
pub mod filter_context;
pub mod page_frame;
pub mod page_standard;
