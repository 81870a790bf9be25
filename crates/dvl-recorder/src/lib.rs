pub mod config;
pub mod doctor;
pub mod error;
pub mod recorder;

pub use config::*;
pub use doctor::*;
pub use error::*;
pub use recorder::*;
