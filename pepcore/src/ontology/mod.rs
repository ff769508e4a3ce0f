mod modification_table;

pub use modification_table::*;
