pub mod aistudio;
pub mod siliconflow;

pub use aistudio::AistudioClient;
pub use siliconflow::SiliconFlowClient;
