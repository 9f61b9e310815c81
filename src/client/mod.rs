pub mod http;
pub mod short_id;
pub mod trait_def;

pub use http::HttpShortenerClient;
pub use short_id::normalize_short_id;
pub use trait_def::{ApiError, ApiResult, ShortenerApi};
