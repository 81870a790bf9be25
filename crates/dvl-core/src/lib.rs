pub mod error;
pub mod ids;
pub mod parse;
pub mod record;
pub mod render;
pub mod time;

pub use error::*;
pub use ids::*;
pub use parse::*;
pub use record::*;
pub use render::*;
pub use time::*;
