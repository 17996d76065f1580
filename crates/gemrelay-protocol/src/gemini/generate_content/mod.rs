pub mod types;
pub mod request;
pub mod response;

pub use request::{GenerateContentRequest, GenerationConfig};
pub use response::GenerateContentResponse;
pub use types::*;
