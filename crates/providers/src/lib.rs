pub mod anthropic;
pub mod traits;
pub mod util;

pub use traits::{GenerateRequest, GenerateResponse, TextProvider};
