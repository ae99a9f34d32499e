pub mod content;
pub mod media;
