// Utilities

pub mod file;
pub mod open;

pub use file::FileUtils;
