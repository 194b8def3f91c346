use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::model::{SignatureRecord, TimestampOutcome};
use crate::retry::{RetryPolicy, retry_operation};

pub const DEFAULT_PAGE_LIMIT: usize = 1000;
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(100);

/// Read-only view of the remote ledger. Results are newest-first and assumed
/// stable for a given address while one traversal is running.
#[async_trait]
pub trait LedgerQuery {
    /// Up to `limit` signature records strictly older than `before`,
    /// newest first. `None` means "start from the newest record".
    async fn signatures_for_address(
        &self,
        address: &str,
        limit: usize,
        before: Option<&str>,
    ) -> anyhow::Result<Vec<SignatureRecord>>;

    /// Block time of one transaction. Outer `None`: no such record.
    /// Inner `None`: the record exists but carries no block time.
    async fn transaction_block_time(
        &self,
        signature: &str,
    ) -> anyhow::Result<Option<Option<i64>>>;
}

/// Walks an address's signature history backward, one cursor-bounded page at
/// a time, until the ledger origin is reached.
pub struct LaunchLocator<Q> {
    query: Q,
    page_limit: usize,
    page_delay: Duration,
    retry: RetryPolicy,
}

impl<Q: LedgerQuery> LaunchLocator<Q> {
    pub fn new(query: Q) -> Self {
        Self {
            query,
            page_limit: DEFAULT_PAGE_LIMIT,
            page_delay: DEFAULT_PAGE_DELAY,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_page_limit(mut self, page_limit: usize) -> Self {
        self.page_limit = page_limit;
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the signature of the oldest record in the address's history,
    /// or `None` when the history is empty or the ledger stayed unreachable
    /// through every retry. The cursor strictly decreases in ledger order:
    /// each page's oldest signature becomes the next query's exclusive
    /// `before` bound, so the walk terminates and never skips or repeats an
    /// entry. A full page always triggers one more query, since only a short
    /// or empty page proves the origin was reached.
    pub async fn locate_oldest(&self, address: &str) -> Option<String> {
        let mut cursor: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let fetch = || {
                let before = cursor.clone();
                async move {
                    self.query
                        .signatures_for_address(address, self.page_limit, before.as_deref())
                        .await
                }
            };
            let page = match retry_operation(fetch, &self.retry).await {
                Ok(page) => page,
                Err(err) => {
                    warn!(address, error = %err, "signature paging failed");
                    return None;
                }
            };

            // Client-side rate limiting between page requests.
            tokio::time::sleep(self.page_delay).await;
            pages += 1;

            let Some(oldest) = page.last() else {
                break;
            };
            let short = page.len() < self.page_limit;
            cursor = Some(oldest.signature.clone());
            if short {
                break;
            }
        }

        debug!(address, pages, oldest = cursor.as_deref().unwrap_or("-"), "traversal finished");
        cursor
    }

    /// Resolves one record's block time. Exhausted retries are logged and
    /// reported as `Unavailable`, never propagated.
    pub async fn resolve_timestamp(&self, signature: &str) -> TimestampOutcome {
        let lookup = || async move { self.query.transaction_block_time(signature).await };
        match retry_operation(lookup, &self.retry).await {
            Ok(Some(Some(timestamp))) => TimestampOutcome::Found(timestamp),
            Ok(Some(None)) => TimestampOutcome::MissingBlockTime,
            Ok(None) => TimestampOutcome::Unavailable,
            Err(err) => {
                warn!(signature, error = %err, "transaction lookup failed");
                TimestampOutcome::Unavailable
            }
        }
    }

    /// Earliest on-chain activity timestamp for `address`. `Unavailable`
    /// when no oldest signature could be located; otherwise the resolution
    /// outcome for that signature.
    pub async fn first_deployment_timestamp(&self, address: &str) -> TimestampOutcome {
        let Some(oldest) = self.locate_oldest(address).await else {
            return TimestampOutcome::Unavailable;
        };
        info!(address, signature = %oldest, "located oldest signature");
        self.resolve_timestamp(&oldest).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    type BlockTimeReply = anyhow::Result<Option<Option<i64>>>;

    #[derive(Default)]
    struct ScriptedLedger {
        pages: Mutex<VecDeque<anyhow::Result<Vec<SignatureRecord>>>>,
        cursors: Mutex<Vec<Option<String>>>,
        block_times: Mutex<VecDeque<BlockTimeReply>>,
        lookups: Mutex<Vec<String>>,
    }

    impl ScriptedLedger {
        fn push_page(&self, page: Vec<SignatureRecord>) {
            self.pages.lock().unwrap().push_back(Ok(page));
        }

        fn push_page_failure(&self, message: &str) {
            self.pages
                .lock()
                .unwrap()
                .push_back(Err(anyhow::anyhow!(message.to_string())));
        }

        fn push_block_time(&self, reply: BlockTimeReply) {
            self.block_times.lock().unwrap().push_back(reply);
        }

        fn cursors(&self) -> Vec<Option<String>> {
            self.cursors.lock().unwrap().clone()
        }

        fn lookups(&self) -> Vec<String> {
            self.lookups.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LedgerQuery for ScriptedLedger {
        async fn signatures_for_address(
            &self,
            _address: &str,
            _limit: usize,
            before: Option<&str>,
        ) -> anyhow::Result<Vec<SignatureRecord>> {
            self.cursors
                .lock()
                .unwrap()
                .push(before.map(ToString::to_string));
            match self.pages.lock().unwrap().pop_front() {
                Some(page) => page,
                None => anyhow::bail!("no scripted page left"),
            }
        }

        async fn transaction_block_time(
            &self,
            signature: &str,
        ) -> anyhow::Result<Option<Option<i64>>> {
            self.lookups.lock().unwrap().push(signature.to_string());
            match self.block_times.lock().unwrap().pop_front() {
                Some(reply) => reply,
                None => anyhow::bail!("no scripted block time left"),
            }
        }
    }

    fn record(signature: &str) -> SignatureRecord {
        SignatureRecord {
            signature: signature.to_string(),
            err: None,
            block_time: None,
            slot: 0,
        }
    }

    fn page(range: std::ops::RangeInclusive<usize>) -> Vec<SignatureRecord> {
        range.map(|n| record(&format!("sig{n}"))).collect()
    }

    fn locator(ledger: ScriptedLedger) -> LaunchLocator<ScriptedLedger> {
        LaunchLocator::new(ledger)
            .with_page_limit(3)
            .with_page_delay(Duration::from_millis(1))
            .with_retry_policy(RetryPolicy::fixed(1, Duration::from_millis(1)))
    }

    #[tokio::test]
    async fn short_first_page_answers_in_one_query() {
        let ledger = ScriptedLedger::default();
        ledger.push_page(page(1..=2));
        let locator = locator(ledger);

        let oldest = locator.locate_oldest("addr").await;

        assert_eq!(oldest.as_deref(), Some("sig2"));
        assert_eq!(locator.query.cursors(), vec![None]);
    }

    #[tokio::test]
    async fn full_pages_walk_backward_with_the_previous_oldest_as_cursor() {
        let ledger = ScriptedLedger::default();
        ledger.push_page(page(1..=3));
        ledger.push_page(page(4..=6));
        ledger.push_page(page(7..=7));
        let locator = locator(ledger);

        let oldest = locator.locate_oldest("addr").await;

        assert_eq!(oldest.as_deref(), Some("sig7"));
        assert_eq!(
            locator.query.cursors(),
            vec![None, Some("sig3".to_string()), Some("sig6".to_string())]
        );
    }

    #[tokio::test]
    async fn empty_first_page_returns_none_after_one_query() {
        let ledger = ScriptedLedger::default();
        ledger.push_page(Vec::new());
        let locator = locator(ledger);

        let oldest = locator.locate_oldest("addr").await;

        assert_eq!(oldest, None);
        assert_eq!(locator.query.cursors(), vec![None]);
    }

    #[tokio::test]
    async fn empty_page_after_a_full_page_keeps_the_last_cursor() {
        let ledger = ScriptedLedger::default();
        ledger.push_page(page(1..=3));
        ledger.push_page(Vec::new());
        let locator = locator(ledger);

        let oldest = locator.locate_oldest("addr").await;

        assert_eq!(oldest.as_deref(), Some("sig3"));
        assert_eq!(locator.query.cursors(), vec![None, Some("sig3".to_string())]);
    }

    #[tokio::test]
    async fn exhausted_retries_during_paging_yield_none() {
        let ledger = ScriptedLedger::default();
        ledger.push_page_failure("rate limited");
        ledger.push_page_failure("rate limited");
        let locator = locator(ledger);

        let oldest = locator.locate_oldest("addr").await;

        assert_eq!(oldest, None);
        // One initial attempt plus one retry, each hitting the ledger.
        assert_eq!(locator.query.cursors().len(), 2);
    }

    #[tokio::test]
    async fn paging_recovers_from_a_transient_failure() {
        let ledger = ScriptedLedger::default();
        ledger.push_page_failure("rate limited");
        ledger.push_page(page(1..=2));
        let locator = locator(ledger);

        let oldest = locator.locate_oldest("addr").await;

        assert_eq!(oldest.as_deref(), Some("sig2"));
    }

    #[tokio::test]
    async fn resolve_timestamp_maps_the_trichotomy() {
        let ledger = ScriptedLedger::default();
        ledger.push_block_time(Ok(Some(Some(1617123456))));
        ledger.push_block_time(Ok(Some(None)));
        ledger.push_block_time(Ok(None));
        let locator = locator(ledger);

        assert_eq!(
            locator.resolve_timestamp("sigA").await,
            TimestampOutcome::Found(1617123456)
        );
        assert_eq!(
            locator.resolve_timestamp("sigB").await,
            TimestampOutcome::MissingBlockTime
        );
        assert_eq!(
            locator.resolve_timestamp("sigC").await,
            TimestampOutcome::Unavailable
        );
    }

    #[tokio::test]
    async fn resolve_timestamp_reports_exhausted_retries_as_unavailable() {
        let ledger = ScriptedLedger::default();
        ledger.push_block_time(Err(anyhow::anyhow!("timeout")));
        ledger.push_block_time(Err(anyhow::anyhow!("timeout")));
        let locator = locator(ledger);

        assert_eq!(
            locator.resolve_timestamp("sigA").await,
            TimestampOutcome::Unavailable
        );
        assert_eq!(locator.query.lookups().len(), 2);
    }

    #[tokio::test]
    async fn first_deployment_timestamp_is_unavailable_without_history() {
        let ledger = ScriptedLedger::default();
        ledger.push_page(Vec::new());
        let locator = locator(ledger);

        assert_eq!(
            locator.first_deployment_timestamp("addr").await,
            TimestampOutcome::Unavailable
        );
        assert!(locator.query.lookups().is_empty());
    }

    #[tokio::test]
    async fn first_deployment_timestamp_resolves_the_oldest_signature() {
        let ledger = ScriptedLedger::default();
        ledger.push_page(vec![record("sigB"), record("sigA")]);
        ledger.push_block_time(Ok(Some(Some(1617123456))));
        let locator = locator(ledger);

        assert_eq!(
            locator.first_deployment_timestamp("addr").await,
            TimestampOutcome::Found(1617123456)
        );
        assert_eq!(locator.query.lookups(), vec!["sigA".to_string()]);
    }
}
