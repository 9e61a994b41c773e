pub mod author;
pub mod comment;
pub mod post;
pub mod vote;

pub use author::*;
pub use comment::*;
pub use post::*;
pub use vote::*;
