pub mod await_value;
pub mod change_feed;
pub mod collections;
pub mod errors;
pub mod main_context;
pub mod observable;

pub use await_value::await_value;
pub use change_feed::ChangeFeed;
pub use errors::{DomainError, DomainResult, MainContextError, ObservableError};
pub use main_context::MainContext;
pub use observable::{Observable, ObservableSource, Observation, Observer, ObserverId};
