//! Infrastructure layer
//!
//! Everything that touches the outside world: subprocess execution,
//! version control, the filesystem, and the smoke-test launcher.

pub mod fs;
pub mod git;
pub mod process;
pub mod smoke;
