//! Domain model（asset_key, node, config, state, errors, paths, margin）

pub mod asset_key;
pub mod config;
pub mod errors;
pub mod margin;
pub mod node;
pub mod paths;
pub mod state;

pub use self::asset_key::AssetKey;
pub use self::config::{AssetEntry, AssetPaths, Config, CssPolicy, FilePrefix, WatcherConfig};
pub use self::errors::{
    ActivationError, ConfigError, ErrorKind, FetchError, InvocationError,
};
pub use self::margin::{Length, RootMargin};
pub use self::node::{CandidateNode, Element, MarkerSelector, NodeId};
pub use self::state::ActivationState;
