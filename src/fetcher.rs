use anyhow::{Context, Result};
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use crate::error::ExploreError;

// rust 的 async trait 还没有稳定，可以用async_trait 宏
#[async_trait]
pub trait Fetch {
    type Error;
    async fn fetch(&self) -> Result<String, Self::Error>;
}

/// 从文件源或者 http 源中获取原始文本
pub async fn retrieve_data(source: impl AsRef<str>) -> Result<String> {
    let name = source.as_ref();
    let text = if name.starts_with("http://") || name.starts_with("https://") {
        UrlFetcher(name).fetch().await?
    } else if let Some(path) = name.strip_prefix("file://") {
        FileFetcher(path).fetch().await?
    } else {
        return Err(ExploreError::UnsupportedSource(name.to_string()).into());
    };

    if text.trim().is_empty() {
        return Err(ExploreError::EmptySource(name.to_string()).into());
    }
    debug!(bytes = text.len(), "retrieved {}", name);
    Ok(text)
}

struct UrlFetcher<'a>(pub(crate) &'a str);

#[async_trait]
impl<'a> Fetch for UrlFetcher<'a> {
    type Error = anyhow::Error;

    async fn fetch(&self) -> Result<String, Self::Error> {
        let resp = reqwest::get(self.0)
            .await
            .with_context(|| format!("GET {}", self.0))?
            .error_for_status()?;
        Ok(resp.text().await?)
    }
}

struct FileFetcher<'a>(pub(crate) &'a str);

#[async_trait]
impl<'a> Fetch for FileFetcher<'a> {
    type Error = anyhow::Error;

    async fn fetch(&self) -> Result<String, Self::Error> {
        fs::read_to_string(self.0)
            .await
            .with_context(|| format!("reading {}", self.0))
    }
}
