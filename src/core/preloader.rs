//! Page preloader: warms lazily-loaded page bundles ahead of navigation.
//!
//! **Architecture**: an explicitly constructed object (the shell owns it and
//! clones hand it around), never a process global, so tests can build and
//! reset isolated instances.
//!
//! **Why**: the first visit to a page pays its bundle-build cost at
//! navigation time. Warming the likely-next pages in the background makes
//! navigation free in the common case. Preloading is purely advisory - a
//! failed preload just means the page loads on demand later; no failure
//! here is ever surfaced to the user.
//!
//! State per page:
//! - `loaded` - the loader resolved; further preloads are no-ops
//! - `failed` - the loader exhausted its retry budget
//! - `pending` - memoized tickets, one per page, shared by concurrent
//!   callers so rapid hover/press/focus on the same nav entry never issue
//!   duplicate loads
//!
//! A page is in at most one of {loaded, failed}; its pending ticket is kept
//! (not cleared) so repeated queries observe the original outcome.

use indexmap::IndexMap;
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use crate::core::event_bus::EventEmitter;
use crate::core::nav_events::PreloadSettled;
use crate::core::workers::Workers;
use crate::pages::{PageId, PageLoader, RouteTable};

/// Fixed delay between retry attempts. Small and constant: these are
/// best-effort warmups, not correctness-critical operations.
const RETRY_DELAY: Duration = Duration::from_millis(100);

/// Retry budget for priority pages.
const PRIORITY_RETRIES: u32 = 2;
/// Retry budget for the remaining pages.
const GENERAL_RETRIES: u32 = 1;
/// Retry budget for high-confidence signals (hover, press, focus).
const FORCE_RETRIES: u32 = 3;

/// Shared one-shot result of a preload operation. Cloned to every caller
/// interested in the same page; `resolve` is first-write-wins.
#[derive(Clone, Debug)]
pub struct PreloadTicket {
    inner: Arc<TicketInner>,
}

#[derive(Debug)]
struct TicketInner {
    result: Mutex<Option<bool>>,
    cond: Condvar,
}

impl PreloadTicket {
    fn new() -> Self {
        Self {
            inner: Arc::new(TicketInner {
                result: Mutex::new(None),
                cond: Condvar::new(),
            }),
        }
    }

    /// Ticket that settled before it was handed out.
    fn resolved(ok: bool) -> Self {
        let t = Self::new();
        t.resolve(ok);
        t
    }

    fn resolve(&self, ok: bool) {
        let mut slot = self.inner.result.lock().unwrap_or_else(|e| e.into_inner());
        if slot.is_none() {
            *slot = Some(ok);
            self.inner.cond.notify_all();
        }
    }

    /// Non-blocking result query.
    pub fn peek(&self) -> Option<bool> {
        *self.inner.result.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn is_settled(&self) -> bool {
        self.peek().is_some()
    }

    /// Block until the operation settles.
    pub fn wait(&self) -> bool {
        let mut slot = self.inner.result.lock().unwrap_or_else(|e| e.into_inner());
        while slot.is_none() {
            slot = self
                .inner
                .cond
                .wait(slot)
                .unwrap_or_else(|e| e.into_inner());
        }
        slot.unwrap_or(false)
    }
}

/// A group of preloads issued together; settles when all members settle,
/// regardless of individual failures.
#[derive(Debug, Default)]
pub struct PreloadBatch {
    tickets: Vec<(PageId, PreloadTicket)>,
}

impl PreloadBatch {
    /// Wait for every member to settle. Returns (succeeded, failed).
    pub fn wait(&self) -> (usize, usize) {
        let mut ok = 0;
        let mut failed = 0;
        for (_, ticket) in &self.tickets {
            if ticket.wait() {
                ok += 1;
            } else {
                failed += 1;
            }
        }
        (ok, failed)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}

/// Counts and membership of the preloader's collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreloadStats {
    pub loaded: Vec<PageId>,
    pub failed: Vec<PageId>,
    pub pending: usize,
}

#[derive(Default)]
struct PreloadState {
    loaded: HashSet<PageId>,
    failed: HashSet<PageId>,
    /// Insertion-ordered so stats and logs read in issue order.
    pending: IndexMap<PageId, PreloadTicket>,
}

/// Memoized, deduplicated, bounded-retry page prefetcher.
#[derive(Clone)]
pub struct PagePreloader {
    state: Arc<Mutex<PreloadState>>,
    workers: Arc<Workers>,
    emitter: Option<EventEmitter>,
}

impl PagePreloader {
    pub fn new(workers: Arc<Workers>) -> Self {
        Self {
            state: Arc::new(Mutex::new(PreloadState::default())),
            workers,
            emitter: None,
        }
    }

    /// Attach an emitter; settled preloads are announced as
    /// `PreloadSettled` so the frame loop can repaint indicators.
    pub fn with_emitter(mut self, emitter: EventEmitter) -> Self {
        self.emitter = Some(emitter);
        self
    }

    /// Preload one page with a retry budget.
    ///
    /// - already loaded: completed success ticket, loader not invoked
    /// - previously failed and no budget: completed failure ticket
    /// - already in flight: the existing ticket (no duplicate load)
    /// - otherwise: runs `loader` on the worker pool; on failure retries
    ///   after a short fixed delay until the budget is spent
    pub fn preload(&self, page: PageId, loader: PageLoader, retries: u32) -> PreloadTicket {
        let mut st = self.state.lock().unwrap_or_else(|e| e.into_inner());

        if st.loaded.contains(&page) {
            return st
                .pending
                .get(&page)
                .cloned()
                .unwrap_or_else(|| PreloadTicket::resolved(true));
        }

        if st.failed.contains(&page) && retries == 0 {
            return PreloadTicket::resolved(false);
        }

        // Share an unsettled in-flight ticket instead of re-issuing.
        if let Some(ticket) = st.pending.get(&page)
            && !ticket.is_settled()
        {
            return ticket.clone();
        }

        let ticket = PreloadTicket::new();
        st.pending.insert(page, ticket.clone());
        drop(st);

        debug!("Preload issued: {:?} (budget {})", page, retries);
        self.spawn_attempts(page, loader, retries, ticket.clone());
        ticket
    }

    /// Warm the priority pages (budget 2 each), skipping ones already
    /// settled. The batch waits for all members without short-circuiting.
    pub fn preload_priority(&self, routes: &RouteTable) -> PreloadBatch {
        let mut batch = PreloadBatch::default();
        for page in PageId::PRIORITY {
            if self.is_loaded(page) || self.is_failed(page) {
                continue;
            }
            let Some(loader) = routes.loader(page) else {
                continue;
            };
            let ticket = self.preload(page, loader, PRIORITY_RETRIES);
            batch.tickets.push((page, ticket));
        }
        batch
    }

    /// Warm every remaining page (budget 1 each) except `exclude` and
    /// pages already settled.
    pub fn preload_all(&self, routes: &RouteTable, exclude: Option<PageId>) -> PreloadBatch {
        let mut batch = PreloadBatch::default();
        for page in routes.pages() {
            if Some(page) == exclude || self.is_loaded(page) || self.is_failed(page) {
                continue;
            }
            let Some(loader) = routes.loader(page) else {
                continue;
            };
            let ticket = self.preload(page, loader, GENERAL_RETRIES);
            batch.tickets.push((page, ticket));
        }
        batch
    }

    /// Immediate preload on a high-confidence navigation signal. Clears a
    /// prior failure so the page gets a fresh (aggressive) budget.
    pub fn force_preload(&self, page: PageId, loader: PageLoader) -> PreloadTicket {
        {
            let mut st = self.state.lock().unwrap_or_else(|e| e.into_inner());
            st.failed.remove(&page);
        }
        self.preload(page, loader, FORCE_RETRIES)
    }

    pub fn is_loaded(&self, page: PageId) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .loaded
            .contains(&page)
    }

    pub fn is_failed(&self, page: PageId) -> bool {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .failed
            .contains(&page)
    }

    pub fn stats(&self) -> PreloadStats {
        let st = self.state.lock().unwrap_or_else(|e| e.into_inner());
        PreloadStats {
            loaded: st.loaded.iter().copied().collect(),
            failed: st.failed.iter().copied().collect(),
            pending: st
                .pending
                .values()
                .filter(|t| !t.is_settled())
                .count(),
        }
    }

    /// Reset all collections. Test isolation only.
    pub fn clear(&self) {
        let mut st = self.state.lock().unwrap_or_else(|e| e.into_inner());
        st.loaded.clear();
        st.failed.clear();
        st.pending.clear();
    }

    /// Run the load attempt (plus retries) as one worker job. The retry
    /// delay sleeps on the worker thread; recursion in the source becomes a
    /// loop here.
    fn spawn_attempts(&self, page: PageId, loader: PageLoader, retries: u32, ticket: PreloadTicket) {
        let state = Arc::clone(&self.state);
        let emitter = self.emitter.clone();

        self.workers.execute(move || {
            let mut budget = retries;
            let ok = loop {
                match loader() {
                    Ok(()) => {
                        let mut st = state.lock().unwrap_or_else(|e| e.into_inner());
                        st.loaded.insert(page);
                        st.failed.remove(&page);
                        break true;
                    }
                    Err(err) => {
                        warn!("Failed to preload page {:?}: {err:#}", page);
                        {
                            let mut st = state.lock().unwrap_or_else(|e| e.into_inner());
                            st.failed.insert(page);
                        }
                        if budget == 0 {
                            break false;
                        }
                        budget -= 1;
                        std::thread::sleep(RETRY_DELAY);
                    }
                }
            };

            ticket.resolve(ok);
            if let Some(emitter) = emitter {
                emitter.emit(PreloadSettled { page, ok });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::PageStore;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting_loader(
        calls: &Arc<AtomicUsize>,
        ok: bool,
        delay: Duration,
    ) -> PageLoader {
        let calls = Arc::clone(calls);
        Arc::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(delay);
            if ok {
                Ok(())
            } else {
                anyhow::bail!("load refused")
            }
        })
    }

    fn recording_loader(log: &Arc<Mutex<Vec<PageId>>>, page: PageId) -> PageLoader {
        let log = Arc::clone(log);
        Arc::new(move || {
            log.lock().unwrap().push(page);
            std::thread::sleep(Duration::from_millis(5));
            Ok(())
        })
    }

    #[test]
    fn test_concurrent_preloads_share_one_load() {
        let preloader = PagePreloader::new(Arc::new(Workers::new(2)));
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(&calls, true, Duration::from_millis(50));

        let t1 = preloader.preload(PageId::Projects, loader.clone(), 1);
        let t2 = preloader.preload(PageId::Projects, loader, 1);

        assert!(t1.wait());
        assert!(t2.wait());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(preloader.is_loaded(PageId::Projects));
    }

    #[test]
    fn test_preload_after_success_is_idempotent() {
        let preloader = PagePreloader::new(Arc::new(Workers::new(1)));
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(&calls, true, Duration::ZERO);

        assert!(preloader.preload(PageId::Home, loader.clone(), 1).wait());
        assert!(preloader.preload(PageId::Home, loader, 1).wait());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_retry_exhaustion_invokes_loader_n_plus_one_times() {
        let preloader = PagePreloader::new(Arc::new(Workers::new(1)));
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(&calls, false, Duration::ZERO);

        let ok = preloader.preload(PageId::Contact, loader, 2).wait();

        assert!(!ok);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(preloader.is_failed(PageId::Contact));
        assert!(!preloader.is_loaded(PageId::Contact));
    }

    #[test]
    fn test_failed_page_with_no_budget_is_not_retried() {
        let preloader = PagePreloader::new(Arc::new(Workers::new(1)));
        let calls = Arc::new(AtomicUsize::new(0));
        let loader = counting_loader(&calls, false, Duration::ZERO);

        assert!(!preloader.preload(PageId::Contact, loader.clone(), 0).wait());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // No budget left on this call: loader must not run again.
        assert!(!preloader.preload(PageId::Contact, loader, 0).wait());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_force_preload_clears_prior_failure() {
        let preloader = PagePreloader::new(Arc::new(Workers::new(1)));
        let fail_calls = Arc::new(AtomicUsize::new(0));
        let failing = counting_loader(&fail_calls, false, Duration::ZERO);

        assert!(!preloader.preload(PageId::Experience, failing, 0).wait());
        assert!(preloader.is_failed(PageId::Experience));

        let ok_calls = Arc::new(AtomicUsize::new(0));
        let fixed = counting_loader(&ok_calls, true, Duration::ZERO);
        assert!(preloader.force_preload(PageId::Experience, fixed).wait());

        assert!(preloader.is_loaded(PageId::Experience));
        assert!(!preloader.is_failed(PageId::Experience));
    }

    #[test]
    fn test_priority_pages_load_before_the_rest() {
        // One worker thread: jobs run strictly in submission order.
        let preloader = PagePreloader::new(Arc::new(Workers::new(1)));
        let log = Arc::new(Mutex::new(Vec::new()));

        let mut loaders: HashMap<PageId, PageLoader> = HashMap::new();
        for page in PageId::ALL {
            loaders.insert(page, recording_loader(&log, page));
        }
        let routes = RouteTable::from_loaders(loaders);

        let priority = preloader.preload_priority(&routes);
        let rest = preloader.preload_all(&routes, Some(PageId::Home));
        priority.wait();
        rest.wait();

        let order = log.lock().unwrap().clone();
        assert_eq!(order[..2], [PageId::Projects, PageId::Experience]);
        assert_eq!(order[2..], [PageId::Contact]);
    }

    #[test]
    fn test_preload_all_excludes_current_and_settled() {
        let preloader = PagePreloader::new(Arc::new(Workers::new(1)));
        let store = PageStore::new();
        let routes = RouteTable::builtin(store);

        preloader.preload_priority(&routes).wait();
        let batch = preloader.preload_all(&routes, Some(PageId::Home));

        // Projects/Experience already loaded, Home excluded: only Contact.
        assert_eq!(batch.len(), 1);
        batch.wait();
        assert!(preloader.is_loaded(PageId::Contact));
    }

    #[test]
    fn test_stats_and_clear() {
        let preloader = PagePreloader::new(Arc::new(Workers::new(1)));
        let ok_calls = Arc::new(AtomicUsize::new(0));
        let fail_calls = Arc::new(AtomicUsize::new(0));

        preloader
            .preload(PageId::Home, counting_loader(&ok_calls, true, Duration::ZERO), 1)
            .wait();
        preloader
            .preload(PageId::Contact, counting_loader(&fail_calls, false, Duration::ZERO), 0)
            .wait();

        let stats = preloader.stats();
        assert_eq!(stats.loaded, vec![PageId::Home]);
        assert_eq!(stats.failed, vec![PageId::Contact]);
        assert_eq!(stats.pending, 0);

        preloader.clear();
        let stats = preloader.stats();
        assert!(stats.loaded.is_empty());
        assert!(stats.failed.is_empty());
    }
}
