//! `nextLink` pagination

use crate::client::ArmRestClient;
use armhelpers::{ArmError, Pager, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use url::Url;

/// One page of a list response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArmList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(default)]
    pub next_link: Option<String>,
}

enum Cursor {
    Next(Url),
    /// Building the first URL failed; reported by the first fetch
    Invalid(ArmError),
    Done,
}

/// Follows `nextLink` until the service stops returning one
pub struct NextLinkPager<T> {
    client: ArmRestClient,
    cursor: Cursor,
    _item: std::marker::PhantomData<fn() -> T>,
}

impl<T> NextLinkPager<T> {
    pub(crate) fn new(client: ArmRestClient, first: Result<Url>) -> Self {
        let cursor = match first {
            Ok(url) => Cursor::Next(url),
            Err(e) => Cursor::Invalid(e),
        };
        Self {
            client,
            cursor,
            _item: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<T: DeserializeOwned + Send + 'static> Pager<T> for NextLinkPager<T> {
    fn more(&self) -> bool {
        !matches!(self.cursor, Cursor::Done)
    }

    async fn next_page(&mut self) -> Result<Vec<T>> {
        let url = match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Next(url) => url,
            Cursor::Invalid(e) => return Err(e),
            Cursor::Done => return Ok(Vec::new()),
        };

        let page: ArmList<T> = self.client.get_json(url).await?;
        if let Some(link) = page.next_link.as_deref().filter(|l| !l.trim().is_empty()) {
            let next = Url::parse(link)
                .map_err(|e| ArmError::Transport(format!("invalid nextLink {:?}: {}", link, e)))?;
            self.cursor = Cursor::Next(next);
        }
        Ok(page.value)
    }
}
