//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてローダー本体を実装します。
//!
//! # 主要コンポーネント
//! - **Registry**: asset key → module loader descriptor
//! - **CssLoader**: bundle / component / skip の stylesheet ポリシー
//! - **VisibilityWatcher**: intersection report → activation
//! - **ActivationController**: ノードごとに一度だけ fetch → invoke → mark
//! - **LazyLoader**（bootstrap）: scan、eager 指定、watcher または fallback
//! - **LoaderBuilder**: ワイヤリングと起動時検証
//! - **EntryAnimation**: 完全に表示されたノードへの class 付与

pub mod bootstrap;
pub mod builder;
pub mod controller;
pub mod css_loader;
pub mod entry_animation;
pub mod registry;
pub mod status;
pub mod watcher;

pub use self::bootstrap::{FallbackReason, InitReport, LazyLoader, LoaderSession, LoadingMode};
pub use self::builder::{BuildError, LoaderBuilder};
pub use self::controller::{ActivationController, ActivationOutcome};
pub use self::css_loader::{CssDecision, CssLoader};
pub use self::entry_animation::EntryAnimation;
pub use self::registry::{AssetDescriptor, ModuleLoader, Registry};
pub use self::status::ActivationCounts;
pub use self::watcher::VisibilityWatcher;
