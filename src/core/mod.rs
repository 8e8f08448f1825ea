// Core engine exports
pub mod engine;
pub mod validate;

pub use engine::SwipeEngine;
pub use validate::SwipeCommand;
