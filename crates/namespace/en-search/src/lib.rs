//! Global search path for Enclave namespaces
//!
//! Top-level code resolves unqualified names against its own bindings and
//! then against an ordered list of attached namespaces. Attaching and
//! detaching are atomic with respect to concurrent lookups.

pub mod error;
pub mod global;
pub mod resolver;
pub mod search_path;

pub use error::NotAttachedError;
pub use global::GlobalEnv;
pub use resolver::{ResolutionContext, Resolver};
pub use search_path::{EntryContents, SearchPath, SearchPathEntry};
