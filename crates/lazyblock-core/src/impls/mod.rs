//! Impls - ports のインメモリ実装
//!
//! # 含まれるもの
//! - **InMemoryDocument**: element 一覧 + class 一覧
//! - **ManualViewport**: 明示的な report で動く intersection primitive
//! - **StaticModuleFetcher** / **RecordingModule**: module テーブルと呼び出しを記録するブロック
//! - **RecordingStylesheetFetcher**: stylesheet リクエストの記録（失敗も指定可能）
//!
//! ブラウザ側の実装はホストページが持つ。

pub mod inmem_document;
pub mod manual_viewport;
pub mod recording_stylesheets;
pub mod static_modules;

pub use self::inmem_document::InMemoryDocument;
pub use self::manual_viewport::ManualViewport;
pub use self::recording_stylesheets::RecordingStylesheetFetcher;
pub use self::static_modules::{RecordingModule, StaticModuleFetcher};
