pub mod discover;
pub mod fits;
