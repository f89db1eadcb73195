//! Paginated listing

use crate::context::CallContext;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::VecDeque;

/// Cursor over a paginated list endpoint
#[async_trait]
pub trait Pager<T: Send>: Send {
    /// Whether another page can be fetched
    fn more(&self) -> bool;

    /// Fetch the next page
    async fn next_page(&mut self) -> Result<Vec<T>>;
}

pub type BoxPager<T> = Box<dyn Pager<T>>;

/// Pager over pages that are already in memory
pub struct StaticPager<T> {
    pages: VecDeque<Vec<T>>,
}

impl<T> StaticPager<T> {
    pub fn new(pages: Vec<Vec<T>>) -> Self {
        Self {
            pages: pages.into(),
        }
    }

    pub fn single(items: Vec<T>) -> Self {
        Self::new(vec![items])
    }
}

impl<T: Send + 'static> StaticPager<T> {
    pub fn boxed(pages: Vec<Vec<T>>) -> BoxPager<T> {
        Box::new(Self::new(pages))
    }
}

#[async_trait]
impl<T: Send> Pager<T> for StaticPager<T> {
    fn more(&self) -> bool {
        !self.pages.is_empty()
    }

    async fn next_page(&mut self) -> Result<Vec<T>> {
        Ok(self.pages.pop_front().unwrap_or_default())
    }
}

/// Drain every page in order into one vector
pub async fn collect_all<T: Send>(
    ctx: &CallContext,
    what: &str,
    mut pager: BoxPager<T>,
) -> Result<Vec<T>> {
    let mut all = Vec::new();
    let mut pages = 0usize;
    while pager.more() {
        let page = ctx.run(what, pager.next_page()).await?;
        pages += 1;
        all.extend(page);
    }
    tracing::debug!("{}: {} items over {} pages", what, all.len(), pages);
    Ok(all)
}
