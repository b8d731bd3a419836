pub mod minefield;
pub mod service;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;

mod layer;

mod state;

pub use layer::Layer;
pub use service::Engine;
pub use state::{Memory, State, Status};
