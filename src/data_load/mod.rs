//! Query result loading: streamed events, a result cache and paging.
//!
//! ```text
//! DataLoadService::load(query)
//!     │ key = sha256(query - queryGuid)
//!     ├─ hit  → replay task ──────────────┐
//!     └─ miss → QueryExecutor::execute    │
//!                  └─ forward + record ───┴→ mpsc::Receiver<LoadEvent>
//! ```

mod events;
mod hash;
mod pager;
mod service;

pub use events::{
    load_result, DataLoadError, DataLoadResult, LoadEvent, QueryExecutor, QueryResult,
};
pub use hash::query_key;
pub use pager::{LazyPager, PageLoader};
pub use service::DataLoadService;
