pub mod dto;
pub mod taxonomy;

pub use dto::*;
pub use taxonomy::*;
