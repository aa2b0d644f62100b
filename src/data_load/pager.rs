//! On-demand paging over a loader.

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::events::DataLoadResult;

/// Fetches one page of items.
#[async_trait]
pub trait PageLoader: Send + Sync {
    type Item: Send;

    async fn load_page(&self, offset: usize, count: usize) -> DataLoadResult<Vec<Self::Item>>;
}

/// Outcome of one page load.
enum Step {
    Appended(usize),
    /// Another load filled this offset first
    Stale,
    /// The pager was reset while the page loaded
    Reset,
}

#[derive(Debug)]
struct PagerState<T> {
    items: Vec<T>,
    has_more: bool,
    generation: u64,
}

/// Accumulates pages from a [`PageLoader`] as they are requested.
///
/// A short page ends the data. [`LazyPager::reset`] starts over and bumps
/// the generation; a load that was in flight across a reset is discarded.
pub struct LazyPager<L: PageLoader> {
    loader: L,
    page_size: usize,
    state: Mutex<PagerState<L::Item>>,
}

impl<L: PageLoader> LazyPager<L> {
    pub fn new(loader: L, page_size: usize) -> Self {
        Self {
            loader,
            page_size: page_size.max(1),
            state: Mutex::new(PagerState {
                items: Vec::new(),
                has_more: true,
                generation: 0,
            }),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Load the next page. Returns how many items were appended.
    pub async fn load_next(&self) -> DataLoadResult<usize> {
        match self.step().await? {
            Step::Appended(loaded) => Ok(loaded),
            Step::Stale | Step::Reset => Ok(0),
        }
    }

    async fn step(&self) -> DataLoadResult<Step> {
        let (generation, offset) = {
            let state = self.state.lock().await;
            if !state.has_more {
                return Ok(Step::Appended(0));
            }
            (state.generation, state.items.len())
        };

        let page = self.loader.load_page(offset, self.page_size).await?;

        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!(generation, offset, "discarding page loaded before reset");
            return Ok(Step::Reset);
        }
        if state.items.len() != offset {
            debug!(generation, offset, "discarding page already loaded");
            return Ok(Step::Stale);
        }
        let loaded = page.len();
        state.has_more = loaded == self.page_size;
        state.items.extend(page);
        Ok(Step::Appended(loaded))
    }

    /// Load pages until at least `count` items are held or the data ends.
    ///
    /// Stops early if the pager is reset while a page is loading.
    pub async fn ensure(&self, count: usize) -> DataLoadResult<usize> {
        loop {
            let (len, has_more) = {
                let state = self.state.lock().await;
                (state.items.len(), state.has_more)
            };
            if len >= count || !has_more {
                return Ok(len);
            }
            if let Step::Reset = self.step().await? {
                return Ok(self.len().await);
            }
        }
    }

    /// Drop everything loaded and start from the first page again.
    pub async fn reset(&self) {
        let mut state = self.state.lock().await;
        state.items.clear();
        state.has_more = true;
        state.generation += 1;
        debug!(generation = state.generation, "pager reset");
    }

    pub async fn has_more(&self) -> bool {
        self.state.lock().await.has_more
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.items.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn generation(&self) -> u64 {
        self.state.lock().await.generation
    }
}

impl<L> LazyPager<L>
where
    L: PageLoader,
    L::Item: Clone,
{
    /// Copy of the items loaded so far.
    pub async fn items(&self) -> Vec<L::Item> {
        self.state.lock().await.items.clone()
    }
}
