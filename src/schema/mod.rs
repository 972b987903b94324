pub mod derive;
pub mod types;

pub use derive::derive_types;
pub use types::{Cell, Column, ColumnType, Table};
