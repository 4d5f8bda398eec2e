mod dispatch;
mod errors;
mod events;
mod focus;
mod frames;
mod membership;
mod spaces;
mod store;
mod switcher;
mod types;

pub use dispatch::Coordinator;
pub use errors::DispatchError;
pub use events::Event;
pub use store::Store;
pub use switcher::SwitcherSession;
pub use types::{ArrowDirection, Command};
