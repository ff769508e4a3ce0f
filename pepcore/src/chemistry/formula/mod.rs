#[macro_use]
mod structure;
mod formula;

pub use structure::*;
