//! Sync module containing settings management, match providers and planning

pub mod core;
pub mod matcher;
pub mod plan;
pub mod settings;
pub mod username;

pub use self::core::*;
pub use matcher::*;
pub use plan::*;
pub use settings::*;
pub use username::*;
