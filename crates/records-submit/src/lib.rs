pub mod contracts;
pub mod submitter;

pub use contracts::*;
pub use submitter::*;
