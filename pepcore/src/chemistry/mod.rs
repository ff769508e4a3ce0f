mod element;
#[macro_use]
mod formula;
mod mass_mode;

pub use element::*;
pub use formula::*;
pub use mass_mode::*;
