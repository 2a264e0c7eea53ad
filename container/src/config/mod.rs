//! Persisted configuration stores.
//!
//! Each store pins one JSON file under the layout's `etc/` directory and
//! shares the [`store::Store`] load-on-open / mutate-in-memory /
//! save-on-demand core. The resolver consults [`Rewrites`] and
//! [`DefaultValues`]; the rest exist for the configuration CLI.

pub mod application;
pub mod caches;
pub mod configs;
pub mod default_values;
pub mod environments;
pub mod rewrites;
pub mod store;

pub use application::Application;
pub use caches::Caches;
pub use configs::Configs;
pub use default_values::DefaultValues;
pub use environments::Environments;
pub use rewrites::Rewrites;
pub use store::Store;
