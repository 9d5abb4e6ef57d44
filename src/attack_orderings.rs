pub mod store;
pub use store::*;

pub mod centralities;
pub use centralities::*;

pub mod sequences;
pub use sequences::*;
