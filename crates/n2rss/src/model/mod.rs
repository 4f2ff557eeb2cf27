//! Core content types: newsletters, their publications and articles.

pub mod newsletter;
pub mod publication;

pub use newsletter::Newsletter;
pub use publication::{Article, Publication};
