pub mod checkpoint;
pub mod collection;

pub use checkpoint::*;
pub use collection::*;
