//! Screen domain model.
//!
//! A "screen" is one UI screenshot in the user-ordered sequence that
//! drives prototype generation. The sequence order is the navigation
//! order of the generated application.

pub mod model;
pub mod sequence;

pub use model::ScreenImage;
pub use sequence::ScreenSequence;
