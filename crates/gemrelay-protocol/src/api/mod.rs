pub mod analyze;
pub mod error;
pub mod health;

pub use analyze::{AnalyzeMetadata, AnalyzeResponse, RefusalResponse};
pub use error::ErrorBody;
pub use health::HealthResponse;
