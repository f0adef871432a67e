//! Entity loading
//!
//! `find`/`get` fetch entities through the executor boundary; the preload
//! engine populates relations on a batch of already-loaded entities in a
//! bounded number of queries.

pub mod find;
pub mod preload;

pub use find::{find, get, FindOptions, JoinSpec};
pub use preload::{Preload, PreloadConfig, Preloader};
