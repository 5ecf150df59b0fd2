pub mod derived_inputs;
pub mod duplicates;
pub mod keys;
pub mod manager;
pub mod matcher;
pub mod name;
pub mod url;
