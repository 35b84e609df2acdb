//! lazyblock-core
//!
//! ページ上のブロックを遅延アクティベートする仕組み。ブロックが viewport に
//! 近づいて初めて behavior module（と stylesheet）を fetch し、そのノードに
//! 対して一度だけ実行する。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（asset_key, node, config, state, errors, paths, margin）
//! - **ports**: 抽象化レイヤー（Document, Viewport, ModuleFetcher, StylesheetFetcher, CriticalCss）
//! - **app**: アプリケーションロジック（registry, css_loader, watcher, controller, bootstrap, builder）
//! - **impls**: 実装（InMemoryDocument, ManualViewport など開発・テスト用）

pub mod app;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{LazyLoader, LoaderBuilder, LoaderSession};
