mod amino_acid;
mod annotated;
mod check;
mod modification;

pub use amino_acid::*;
pub use annotated::*;
pub use check::*;
pub use modification::*;
