//! CLI commands implementation

pub mod crawl;
pub mod fetch;
pub mod index;
pub mod init;
pub mod repair;
pub mod search;
pub mod status;

pub use crawl::*;
pub use fetch::*;
pub use index::*;
pub use init::*;
pub use repair::*;
pub use search::*;
pub use status::*;
