pub mod communicator;
pub mod map_reduce;
pub mod source;

pub use communicator::Communicator;
pub use map_reduce::{Mapper, Reducer};
pub use source::{EventSource, EventStream};
