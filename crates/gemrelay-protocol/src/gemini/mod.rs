pub mod error;
pub mod generate_content;
