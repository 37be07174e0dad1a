pub mod data_source;
pub mod app;

pub use data_source::*;
pub use app::*;
