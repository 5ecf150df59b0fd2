pub mod loader;
pub mod table;

pub use loader::{load_clean_and_rename, LoadedSource};
pub use table::Table;
