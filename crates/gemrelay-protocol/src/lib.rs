pub mod api;
pub mod gemini;
pub mod openai;
pub mod turnstile;
