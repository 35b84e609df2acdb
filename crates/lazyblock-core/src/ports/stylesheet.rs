//! StylesheetFetcher port - ページへの stylesheet 追加

use async_trait::async_trait;

use crate::domain::FetchError;

/// StylesheetFetcher requests a stylesheet and settles once it is applied
/// (or failed).
#[async_trait]
pub trait StylesheetFetcher: Send + Sync {
    async fn fetch(&self, href: &str) -> Result<(), FetchError>;
}
