//! Store query metrics.

use metrics::{counter, histogram};
use std::time::Instant;

/// Times one store query.
///
/// ```ignore
/// let timer = QueryTimer::new("list_entries");
/// let result = query.fetch_all(&pool).await;
/// timer.record(&result);
/// ```
pub struct QueryTimer {
    query: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query: &'static str) -> Self {
        Self {
            query,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time, labelled with the query outcome.
    ///
    /// Failed queries also bump `store_query_errors_total`.
    pub fn record<T, E>(self, result: &Result<T, E>) {
        let outcome = outcome(result);
        histogram!(
            "store_query_duration_seconds",
            "query" => self.query,
            "outcome" => outcome
        )
        .record(self.start.elapsed().as_secs_f64());

        if result.is_err() {
            counter!("store_query_errors_total", "query" => self.query).increment(1);
        }
    }
}

fn outcome<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() {
        "ok"
    } else {
        "error"
    }
}
