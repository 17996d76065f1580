pub mod request;
pub mod response;

pub use request::{ChatMessage, CreateChatCompletionRequest};
pub use response::CreateChatCompletionResponse;
