pub mod actions;
pub mod catalog;
pub mod catalog_source;
pub mod config;
pub mod error;
pub mod folder_factory;
pub mod persistence;
pub mod reducer;
pub mod request_builder;
pub mod selection;
pub mod state;
pub mod workflow;

pub use actions::*;
pub use catalog::*;
pub use error::*;
pub use folder_factory::*;
pub use reducer::*;
pub use request_builder::*;
pub use selection::*;
pub use state::*;
pub use workflow::*;

pub use persistence::*;
