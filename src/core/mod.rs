pub mod completion;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod filter;
pub mod insertion;
pub mod registry;
pub mod serializer;
pub mod trigger;
