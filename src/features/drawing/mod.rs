pub mod handler;
pub mod models;
pub mod picker;
pub mod storage;

pub use handler::create_drawing_router;
pub use models::{DrawingRecord, SaveDrawingRequest, SaveDrawingResponse, SaveStatus};
pub use picker::DigitPicker;
pub use storage::DrawingStore;
