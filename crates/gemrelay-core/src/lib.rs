pub mod assets;
pub mod client_ip;
pub mod core;
pub mod cors;
pub mod denylist;
pub mod error;
pub mod gate;
pub mod handler;
pub mod prompt;

pub use assets::{Asset, AssetSource};
pub use self::core::{Core, CoreState};
pub use denylist::Denylist;
pub use error::ApiError;
pub use gate::{Admission, CHALLENGE_THRESHOLD, GateError, ThrottleGate};
