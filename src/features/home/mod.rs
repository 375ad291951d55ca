pub mod handler;
pub mod renderer;

pub use handler::create_home_router;
pub use renderer::{INDEX_TEMPLATE, IndexContext, PageRenderer};
