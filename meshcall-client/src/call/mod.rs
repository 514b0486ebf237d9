mod call;
mod call_behavior;
mod call_command;
mod connection_table;
mod negotiator;

pub use call::*;
pub use call_behavior::*;
pub use call_command::*;
pub use connection_table::*;
pub use negotiator::*;
