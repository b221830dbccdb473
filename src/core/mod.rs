//! Pure models: provider payloads, usage bars, and popup placement

mod payload;
mod placement;
mod provider;
mod usage_window;

pub use payload::*;
pub use placement::*;
pub use provider::*;
pub use usage_window::*;
