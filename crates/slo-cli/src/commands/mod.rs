//! Command implementations.

pub mod check;
pub mod decode;
pub mod logout;

pub use check::run_check;
pub use decode::run_decode;
pub use logout::run_logout;
