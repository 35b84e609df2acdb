//! Ports - 抽象化レイヤー
//!
//! このモジュールはローダーが受け取る capability を定義します。
//! 各 trait はホストページが持つもの（DOM, viewport-intersection primitive,
//! module loader, stylesheet 挿入, critical CSS）へのインターフェースです。
//!
//! # 設計原則
//! - グローバルには触らず、すべて注入する
//! - `impls` に全 port のインメモリ実装がある

pub mod critical_css;
pub mod document;
pub mod module_fetcher;
pub mod stylesheet;
pub mod viewport;

pub use self::critical_css::{CriticalCss, CriticalCssSet};
pub use self::document::Document;
pub use self::module_fetcher::{BlockContext, BlockModule, ModuleFetcher};
pub use self::stylesheet::StylesheetFetcher;
pub use self::viewport::{IntersectionEntry, IntersectionObserver, IntersectionReports, Viewport};
