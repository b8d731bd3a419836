pub mod command;
pub mod event;
pub mod minefield;
pub mod store;

pub use command::Command;
pub use event::Event;
pub use store::{Key, Value};
