mod signaling_channel;

pub use signaling_channel::*;
