pub mod locator;
pub mod model;
pub mod retry;

pub use locator::{DEFAULT_PAGE_DELAY, DEFAULT_PAGE_LIMIT, LaunchLocator, LedgerQuery};
pub use model::{SignatureRecord, TimestampOutcome};
pub use retry::{Backoff, RetryPolicy, retry_operation};
