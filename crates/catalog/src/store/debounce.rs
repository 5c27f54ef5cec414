//! Debounced search input.
//!
//! An explicit deadline-based timer: each keystroke pushes the latest text
//! and arms (or re-arms) the quiet-window deadline; `settled()` completes
//! once the input has been quiet long enough and yields the query — unless
//! it matches the previously emitted one, in which case it is suppressed to
//! avoid redundant state churn.

use std::time::Duration;

use tokio::time::Instant;

/// Default quiet window before a search query is applied.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Deadline-based search debouncer with duplicate suppression.
#[derive(Debug)]
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<String>,
    deadline: Option<Instant>,
    last_emitted: Option<String>,
}

impl SearchDebouncer {
    /// Create a debouncer with the given quiet window.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            deadline: None,
            last_emitted: None,
        }
    }

    /// Record the latest input and re-arm the quiet-window deadline.
    pub fn push(&mut self, query: impl Into<String>) {
        self.pending = Some(query.into());
        self.deadline = Some(Instant::now() + self.delay);
    }

    /// Whether input is waiting for its quiet window to elapse.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Wait out the quiet window and yield the settled query.
    ///
    /// Returns `None` when no input is pending or when the settled query is
    /// identical to the previously emitted one.
    pub async fn settled(&mut self) -> Option<String> {
        let deadline = self.deadline?;
        tokio::time::sleep_until(deadline).await;
        self.deadline = None;

        let query = self.pending.take()?;
        if self.last_emitted.as_deref() == Some(query.as_str()) {
            return None;
        }
        self.last_emitted = Some(query.clone());
        Some(query)
    }
}

impl Default for SearchDebouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAST: Duration = Duration::from_millis(20);

    #[tokio::test]
    async fn test_emits_after_quiet_window() {
        let mut debouncer = SearchDebouncer::new(FAST);
        debouncer.push("ph");
        debouncer.push("phone");
        assert_eq!(debouncer.settled().await.as_deref(), Some("phone"));
        assert!(!debouncer.is_armed());
    }

    #[tokio::test]
    async fn test_idle_debouncer_yields_nothing() {
        let mut debouncer = SearchDebouncer::new(FAST);
        assert!(debouncer.settled().await.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_query_suppressed() {
        let mut debouncer = SearchDebouncer::new(FAST);
        debouncer.push("phone");
        assert_eq!(debouncer.settled().await.as_deref(), Some("phone"));

        debouncer.push("phone");
        assert!(debouncer.settled().await.is_none());

        debouncer.push("laptop");
        assert_eq!(debouncer.settled().await.as_deref(), Some("laptop"));
    }

    #[tokio::test]
    async fn test_rearming_extends_deadline() {
        let mut debouncer = SearchDebouncer::new(Duration::from_millis(50));
        debouncer.push("a");
        tokio::time::sleep(Duration::from_millis(20)).await;
        debouncer.push("ab");

        let start = Instant::now();
        let settled = debouncer.settled().await;
        assert_eq!(settled.as_deref(), Some("ab"));
        // the second push reset the clock, so at least ~50ms elapse from it
        assert!(start.elapsed() >= Duration::from_millis(25));
    }
}
