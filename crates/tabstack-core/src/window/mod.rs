mod separator;
mod types;

pub use separator::{SEPARATOR_ID_BASE, SeparatorIds};
pub use types::{GroupId, SpaceId, WindowId, WindowRef, WindowSnapshot};
