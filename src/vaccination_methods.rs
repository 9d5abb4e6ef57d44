pub mod vaccinations;
pub use vaccinations::*;
