//! Setting handlers for different configuration patterns.

pub mod simple;
pub mod string;

pub use simple::*;
pub use string::*;
