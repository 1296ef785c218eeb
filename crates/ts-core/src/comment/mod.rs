//! Comment module
//!
//! Comments as loaded from the platform, the per-video comment store and the
//! flagged subset under review.

pub mod flagged;
pub mod model;
pub mod store;

pub use flagged::FlaggedSet;
pub use model::{Comment, CommentPage};
pub use store::CommentSet;
