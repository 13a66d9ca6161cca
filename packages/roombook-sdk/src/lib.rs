pub mod client;
pub mod error;

pub use client::RoombookClient;
pub use error::{SdkError, SdkResult};
pub use roombook_core::*;
