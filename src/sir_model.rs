pub mod sir_states;
pub use sir_states::*;

pub mod network;
pub use network::*;

pub mod simple_prop;
pub use simple_prop::*;

pub mod sir_writer;
pub use sir_writer::*;
