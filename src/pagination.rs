//! Generic pagination over remote collections.
//!
//! List endpoints differ in how the next page is addressed: some take a
//! numeric page number, others an opaque continuation token. [`Paginator`]
//! hides both behind one pull-style interface, fetching pages lazily through
//! a caller-supplied [`PageFetcher`] closure. The paginator knows nothing
//! about HTTP or wire field names — resource modules translate between their
//! endpoint's query/response shapes and [`PageRequest`]/[`PageResponse`].
//!
//! # Example
//!
//! ```no_run
//! # async fn example(client: palaver::PalaverClient) -> palaver::Result<()> {
//! let mut bots = client.bots().list(Default::default()).await?;
//! while bots.next().await {
//!     if let Some(bot) = bots.current() {
//!         println!("{}", bot.name);
//!     }
//! }
//! if let Some(err) = bots.err() {
//!     eprintln!("listing failed: {err}");
//! }
//! # Ok(())
//! # }
//! ```

use futures::future::BoxFuture;
use futures::Stream;

use crate::error::{Error, Result};

/// Page size used when a caller passes 0.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// How many fetches with a non-advancing continuation token are tolerated
/// before the paginator gives up. Guards against servers that keep returning
/// `has_more = true` with an empty or repeated token.
const MAX_CURSOR_STALLS: u32 = 2;

/// Cursor for one page fetch. Exactly one cursor style is populated per
/// paginator instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRequest {
    /// Continuation token from the previous response (token-style).
    pub page_token: Option<String>,
    /// 1-based page number (numeric-style); 0 when token-style.
    pub page_num: usize,
    /// Items per page.
    pub page_size: usize,
}

/// One fetched batch.
#[derive(Debug, Clone)]
pub struct PageResponse<T> {
    /// Items in this batch, in server order.
    pub items: Vec<T>,
    /// Whether the server reported more data beyond this batch. `false` is
    /// terminal even when `next_token` is present.
    pub has_more: bool,
    /// Server-reported total count for the whole collection; 0 when the
    /// endpoint does not report one (typical for token-style endpoints).
    pub total: usize,
    /// Continuation token for the next fetch (token-style endpoints).
    pub next_token: Option<String>,
    /// Request log id, when the server reported one.
    pub log_id: Option<String>,
}

impl<T> Default for PageResponse<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            has_more: false,
            total: 0,
            next_token: None,
            log_id: None,
        }
    }
}

/// Performs one page fetch. Supplied by each resource module.
pub type PageFetcher<T> =
    Box<dyn Fn(PageRequest) -> BoxFuture<'static, Result<PageResponse<T>>> + Send + Sync>;

/// The two cursor derivation strategies. Kept in one place so the numeric and
/// token flavors share the whole iteration algorithm.
enum Cursor {
    /// Next page number to request.
    Number(usize),
    /// Continuation token for the next request.
    Token(Option<String>),
}

/// Lazy iterator over a paginated remote collection.
///
/// Single-pass and not restartable: the constructor fetches the first page
/// eagerly, `next()` pulls items and transparently fetches further pages, and
/// a fetch error is sticky — `next()` returns `false` from then on and the
/// error stays readable via [`err`](Paginator::err).
///
/// Not internally synchronized; drive one instance from one task at a time.
pub struct Paginator<T> {
    fetcher: PageFetcher<T>,
    page_size: usize,
    cursor: Cursor,
    page: PageResponse<T>,
    /// Iteration index into `page.items`; points one past the last yielded
    /// item. Independent of `items()`, which always exposes the whole batch.
    index: usize,
    err: Option<Error>,
    stalls: u32,
}

impl<T> Paginator<T> {
    /// Create a numeric-cursor paginator and fetch the first page.
    ///
    /// `page_size` 0 is normalized to [`DEFAULT_PAGE_SIZE`]; `page_num` 0
    /// starts from page 1.
    pub async fn by_number(
        fetcher: PageFetcher<T>,
        page_size: usize,
        page_num: usize,
    ) -> Result<Self> {
        let mut pager = Self {
            fetcher,
            page_size: normalize_page_size(page_size),
            cursor: Cursor::Number(page_num.max(1)),
            page: PageResponse::default(),
            index: 0,
            err: None,
            stalls: 0,
        };
        pager.fetch_next().await?;
        Ok(pager)
    }

    /// Create a token-cursor paginator and fetch the first page.
    ///
    /// `token` of `None` starts from the beginning of the collection.
    pub async fn by_token(
        fetcher: PageFetcher<T>,
        page_size: usize,
        token: Option<String>,
    ) -> Result<Self> {
        let mut pager = Self {
            fetcher,
            page_size: normalize_page_size(page_size),
            cursor: Cursor::Token(token),
            page: PageResponse::default(),
            index: 0,
            err: None,
            stalls: 0,
        };
        pager.fetch_next().await?;
        Ok(pager)
    }

    /// Advance to the next item, fetching the next page when the current
    /// batch is exhausted and the server reported more data.
    ///
    /// Returns `false` when the collection is exhausted, when a fetch failed
    /// (see [`err`](Paginator::err)), or when a fetch returned zero items
    /// despite `has_more` — treated as exhaustion, not retried.
    pub async fn next(&mut self) -> bool {
        if self.err.is_some() {
            return false;
        }
        if self.index < self.page.items.len() {
            self.index += 1;
            return true;
        }
        if !self.page.has_more {
            return false;
        }
        match self.fetch_next().await {
            Ok(()) => {
                if self.page.items.is_empty() {
                    return false;
                }
                self.index = 1;
                true
            }
            Err(err) => {
                self.err = Some(err);
                false
            }
        }
    }

    /// The item yielded by the last successful `next()`, or `None` before
    /// the first call.
    pub fn current(&self) -> Option<&T> {
        if self.index == 0 {
            None
        } else {
            self.page.items.get(self.index - 1)
        }
    }

    /// The current batch in full, regardless of iteration position. Intended
    /// for manual page-by-page use; don't mix with `next()`/`current()`
    /// iteration over the same instance.
    pub fn items(&self) -> &[T] {
        &self.page.items
    }

    /// Whether the current batch's server flag indicated more data exists.
    pub fn has_more(&self) -> bool {
        self.page.has_more
    }

    /// Server-reported total item count, or 0 when unreported.
    pub fn total(&self) -> usize {
        self.page.total
    }

    /// Log id of the most recent page fetch, if reported.
    pub fn log_id(&self) -> Option<&str> {
        self.page.log_id.as_deref()
    }

    /// Sticky fetch error, if any.
    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    /// Fetch the next page and advance the cursor.
    async fn fetch_next(&mut self) -> Result<()> {
        let request = match &self.cursor {
            Cursor::Number(num) => PageRequest {
                page_token: None,
                page_num: *num,
                page_size: self.page_size,
            },
            Cursor::Token(token) => PageRequest {
                page_token: token.clone(),
                page_num: 0,
                page_size: self.page_size,
            },
        };
        let page = (self.fetcher)(request).await?;

        match &mut self.cursor {
            Cursor::Number(num) => *num += 1,
            Cursor::Token(token) => {
                let next = page.next_token.clone().filter(|t| !t.is_empty());
                // An empty token with has_more set re-fetches from the start;
                // bound how often that is allowed to repeat.
                if page.has_more && next == *token {
                    self.stalls += 1;
                    if self.stalls >= MAX_CURSOR_STALLS {
                        return Err(Error::Pagination(
                            "continuation token did not advance".to_string(),
                        ));
                    }
                } else {
                    self.stalls = 0;
                }
                *token = next;
            }
        }

        self.page = page;
        self.index = 0;
        Ok(())
    }
}

impl<T> Paginator<T>
where
    T: Clone,
{
    /// Consume the paginator into an async `Stream` of items.
    ///
    /// A sticky fetch error is yielded as the final `Err` item.
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> {
        futures::stream::unfold(Some(self), |state| async move {
            let mut pager = state?;
            if pager.next().await {
                let item = pager.current().cloned()?;
                Some((Ok(item), Some(pager)))
            } else if let Some(err) = pager.err.take() {
                Some((Err(err), None))
            } else {
                None
            }
        })
    }
}

fn normalize_page_size(page_size: usize) -> usize {
    if page_size == 0 {
        DEFAULT_PAGE_SIZE
    } else {
        page_size
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use futures::{FutureExt, StreamExt};

    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct TestItem {
        id: usize,
    }

    fn make_items(total: usize) -> Vec<TestItem> {
        (1..=total).map(|id| TestItem { id }).collect()
    }

    /// Numeric-cursor fetcher over a fixed dataset, recording every request.
    fn number_fetcher(
        total: usize,
        requests: Arc<Mutex<Vec<PageRequest>>>,
    ) -> PageFetcher<TestItem> {
        let data = make_items(total);
        Box::new(move |request: PageRequest| {
            let data = data.clone();
            let requests = requests.clone();
            async move {
                requests.lock().unwrap().push(request.clone());
                let start = (request.page_num - 1) * request.page_size;
                let end = (start + request.page_size).min(data.len());
                let items = if start >= data.len() {
                    Vec::new()
                } else {
                    data[start..end].to_vec()
                };
                Ok(PageResponse {
                    has_more: end < data.len(),
                    total: data.len(),
                    items,
                    next_token: None,
                    log_id: None,
                })
            }
            .boxed()
        })
    }

    /// Token-cursor fetcher: the token is the id of the last item served.
    fn token_fetcher(total: usize, requests: Arc<Mutex<Vec<PageRequest>>>) -> PageFetcher<TestItem> {
        let data = make_items(total);
        Box::new(move |request: PageRequest| {
            let data = data.clone();
            let requests = requests.clone();
            async move {
                requests.lock().unwrap().push(request.clone());
                let start = match &request.page_token {
                    Some(token) => token.parse::<usize>().unwrap(),
                    None => 0,
                };
                let end = (start + request.page_size).min(data.len());
                let items = data[start.min(data.len())..end].to_vec();
                let has_more = end < data.len();
                Ok(PageResponse {
                    has_more,
                    total: 0,
                    items,
                    next_token: has_more.then(|| end.to_string()),
                    log_id: None,
                })
            }
            .boxed()
        })
    }

    #[tokio::test]
    async fn test_number_paged_exhaustion_in_order() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let mut pager = Paginator::by_number(number_fetcher(25, requests.clone()), 10, 0)
            .await
            .unwrap();

        assert!(pager.current().is_none());
        assert_eq!(pager.total(), 25);

        let mut seen = Vec::new();
        while pager.next().await {
            seen.push(pager.current().unwrap().id);
        }

        assert_eq!(seen, (1..=25).collect::<Vec<_>>());
        assert!(!pager.has_more());
        assert!(pager.err().is_none());
        // Pages 1, 2, 3 were fetched, in order.
        let nums: Vec<usize> = requests.lock().unwrap().iter().map(|r| r.page_num).collect();
        assert_eq!(nums, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_token_paged_cursor_propagation() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let mut pager = Paginator::by_token(token_fetcher(25, requests.clone()), 10, None)
            .await
            .unwrap();

        let mut count = 0;
        while pager.next().await {
            count += 1;
        }

        assert_eq!(count, 25);
        assert!(pager.err().is_none());
        let tokens: Vec<Option<String>> = requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.page_token.clone())
            .collect();
        assert_eq!(
            tokens,
            vec![None, Some("10".to_string()), Some("20".to_string())]
        );
    }

    #[tokio::test]
    async fn test_zero_page_size_normalized() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let _pager = Paginator::by_number(number_fetcher(5, requests.clone()), 0, 1)
            .await
            .unwrap();

        assert_eq!(requests.lock().unwrap()[0].page_size, DEFAULT_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_fetch_error_is_sticky() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher: PageFetcher<TestItem> = Box::new(move |_request: PageRequest| {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) > 0 {
                    return Err(Error::Stream("boom".to_string()));
                }
                Ok(PageResponse {
                    items: vec![TestItem { id: 1 }],
                    has_more: true,
                    total: 2,
                    next_token: None,
                    log_id: None,
                })
            }
            .boxed()
        });

        let mut pager = Paginator::by_number(fetcher, 1, 1).await.unwrap();
        assert!(pager.next().await);
        assert_eq!(pager.current().unwrap().id, 1);

        // Second fetch fails; failure is permanent.
        assert!(!pager.next().await);
        assert!(matches!(pager.err(), Some(Error::Stream(msg)) if msg == "boom"));
        assert!(!pager.next().await);
        assert!(pager.err().is_some());
    }

    #[tokio::test]
    async fn test_construction_fetch_error_returns_no_instance() {
        let fetcher: PageFetcher<TestItem> = Box::new(|_request| {
            async { Err(Error::Stream("unreachable host".to_string())) }.boxed()
        });

        let result = Paginator::by_number(fetcher, 10, 1).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_page_with_has_more_terminates() {
        let calls = Arc::new(AtomicUsize::new(0));
        let fetcher: PageFetcher<TestItem> = Box::new(move |_request| {
            let calls = calls.clone();
            async move {
                let first = calls.fetch_add(1, Ordering::SeqCst) == 0;
                Ok(PageResponse {
                    items: if first { vec![TestItem { id: 1 }] } else { Vec::new() },
                    has_more: true,
                    total: 0,
                    next_token: first.then(|| "t1".to_string()),
                    log_id: None,
                })
            }
            .boxed()
        });

        let mut pager = Paginator::by_token(fetcher, 10, None).await.unwrap();
        assert!(pager.next().await);
        assert!(!pager.next().await);
        assert!(pager.err().is_none());
    }

    #[tokio::test]
    async fn test_stalled_token_cursor_aborts() {
        // Server keeps claiming more data but never advances the token.
        let fetcher: PageFetcher<TestItem> = Box::new(|_request| {
            async {
                Ok(PageResponse {
                    items: vec![TestItem { id: 1 }],
                    has_more: true,
                    total: 0,
                    next_token: None,
                    log_id: None,
                })
            }
            .boxed()
        });

        let mut pager = Paginator::by_token(fetcher, 10, None).await.unwrap();
        let mut yielded = 0;
        while pager.next().await {
            yielded += 1;
            assert!(yielded < 100, "paginator looped on a stalled cursor");
        }
        assert!(matches!(pager.err(), Some(Error::Pagination(_))));
    }

    #[tokio::test]
    async fn test_items_exposes_whole_batch_independent_of_iteration() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let mut pager = Paginator::by_number(number_fetcher(5, requests), 10, 1)
            .await
            .unwrap();

        assert_eq!(pager.items().len(), 5);
        assert!(pager.next().await);
        assert!(pager.next().await);
        // Iterating does not shrink the batch view.
        assert_eq!(pager.items().len(), 5);
        assert_eq!(pager.current().unwrap().id, 2);
    }

    #[tokio::test]
    async fn test_into_stream_yields_all_items() {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let pager = Paginator::by_number(number_fetcher(7, requests), 3, 1)
            .await
            .unwrap();

        let items: Vec<usize> = pager
            .into_stream()
            .map(|item| item.unwrap().id)
            .collect()
            .await;
        assert_eq!(items, vec![1, 2, 3, 4, 5, 6, 7]);
    }
}
