pub mod builder;
pub mod summary;

pub use builder::*;
pub use summary::*;
