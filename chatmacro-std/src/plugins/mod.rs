//! Standard plugins

mod text;
mod args;
mod counter;

pub use text::{Echo, Upper, Lower};
pub use args::Split;
pub use counter::Counter;
