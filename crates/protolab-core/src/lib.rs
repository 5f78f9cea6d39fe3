pub mod error;
pub mod fileset;
pub mod screen;

// Re-export common types
pub use error::{ProtolabError, Result};
pub use fileset::{FileSet, GeneratedPrototype};
pub use screen::{ScreenImage, ScreenSequence};
