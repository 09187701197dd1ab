//! In-memory encode/decode building blocks shared by every element kind.

mod buf;
mod coding;

pub use buf::*;
pub use coding::*;
