pub mod composer;
pub mod theme;
