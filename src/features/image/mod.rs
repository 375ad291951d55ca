pub mod normalizer;
pub mod types;

pub use normalizer::{data_uri_to_array, decode_to_gray, normalize_data_uri, split_data_uri};
pub use types::{DEFAULT_SCHEME_TAG, GrayRaster, TargetSize};
