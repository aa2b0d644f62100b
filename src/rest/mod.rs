//! REST client for the analytics server.
//!
//! [`HttpTransport`] is the seam: [`ReqwestTransport`] talks HTTP, tests
//! substitute their own. [`RestApi`] adds the typed endpoints on top and
//! [`RestQueryExecutor`] plugs it into the data-load service.

mod api;
mod error;
mod executor;
mod transport;

pub use api::{JaqlResponse, NarrativeRequest, RestApi};
pub use error::{RestError, RestResult};
pub use executor::RestQueryExecutor;
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};
