use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;

use anyhow::anyhow;
use tracing::warn;

use crate::hn_client::StorySearch;
use crate::models::{FetchOutcome, FetchRequest};

/// Issues page requests and hands back their outcomes once they are ready.
pub trait Fetcher {
    fn dispatch(&mut self, request: FetchRequest);

    /// Next finished request, without blocking.
    fn poll(&mut self) -> Option<FetchOutcome>;
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}

/// Runs every request on its own thread and collects results through a channel,
/// so the UI thread never blocks on the network.
pub struct BackgroundLoader {
    backend: Arc<dyn StorySearch>,
    tx: Sender<FetchOutcome>,
    rx: Receiver<FetchOutcome>,
}

impl BackgroundLoader {
    pub fn new(backend: Arc<dyn StorySearch>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { backend, tx, rx }
    }

    // Blocks until an outcome arrives or the timeout passes
    #[cfg(test)]
    pub fn wait(&mut self, timeout: std::time::Duration) -> Option<FetchOutcome> {
        self.rx.recv_timeout(timeout).ok()
    }
}

impl Fetcher for BackgroundLoader {
    fn dispatch(&mut self, request: FetchRequest) {
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        let worker_request = request.clone();

        let spawned = thread::Builder::new()
            .name(format!("search-{}", request.page))
            .spawn(move || {
                let request = worker_request;
                // Every dispatched request reports back, or its key would stay in flight
                let result = panic::catch_unwind(AssertUnwindSafe(|| backend.search(&request)))
                    .unwrap_or_else(|payload| {
                        Err(anyhow!("search worker panicked: {}", panic_message(payload.as_ref())))
                    });
                // The receiver only goes away when the window closes
                let _ = tx.send(FetchOutcome { request, result });
            });

        if let Err(e) = spawned {
            warn!("Failed to spawn search thread: {}", e);
            let _ = self.tx.send(FetchOutcome {
                request,
                result: Err(anyhow!("could not start search thread: {}", e)),
            });
        }
    }

    fn poll(&mut self) -> Option<FetchOutcome> {
        self.rx.try_recv().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Hit, SearchResponse};
    use crate::session::SearchSession;
    use anyhow::Result;
    use std::time::Duration;

    struct CannedSearch;

    impl StorySearch for CannedSearch {
        fn search(&self, request: &FetchRequest) -> Result<SearchResponse> {
            if request.query == "boom" {
                return Err(anyhow!("connection reset"));
            }
            let hits = (0..request.hits_per_page)
                .map(|i| Hit {
                    object_id: format!("{}-{}-{}", request.query, request.page, i),
                    title: format!("story {}", i),
                    url: String::new(),
                    author: "tester".to_string(),
                    num_comments: 0,
                    points: i as i64,
                    created_at: None,
                })
                .collect();
            Ok(SearchResponse {
                hits,
                page: request.page,
                nb_pages: 10,
                nb_hits: 10 * request.hits_per_page as u64,
            })
        }
    }

    struct BrokenSearch;

    impl StorySearch for BrokenSearch {
        fn search(&self, _request: &FetchRequest) -> Result<SearchResponse> {
            panic!("index out of bounds");
        }
    }

    fn request(query: &str, page: u32) -> FetchRequest {
        FetchRequest {
            query: query.to_string(),
            page,
            hits_per_page: 3,
        }
    }

    #[test]
    fn delivers_outcome_from_worker_thread() {
        let mut loader = BackgroundLoader::new(Arc::new(CannedSearch));
        assert!(loader.poll().is_none());

        loader.dispatch(request("rust", 2));
        let outcome = loader.wait(Duration::from_secs(5)).expect("no outcome");
        assert_eq!(outcome.request, request("rust", 2));

        let response = outcome.result.unwrap();
        assert_eq!(response.page, 2);
        assert_eq!(response.hits.len(), 3);
        assert_eq!(response.hits[0].object_id, "rust-2-0");
    }

    #[test]
    fn failures_come_back_as_outcomes() {
        let mut loader = BackgroundLoader::new(Arc::new(CannedSearch));
        loader.dispatch(request("boom", 0));

        let outcome = loader.wait(Duration::from_secs(5)).expect("no outcome");
        assert_eq!(outcome.request.query, "boom");
        assert!(outcome.result.is_err());
    }

    #[test]
    fn panicking_backend_reports_a_failure() {
        let mut loader = BackgroundLoader::new(Arc::new(BrokenSearch));
        loader.dispatch(request("rust", 0));

        let outcome = loader.wait(Duration::from_secs(5)).expect("no outcome");
        assert_eq!(outcome.request, request("rust", 0));
        let message = format!("{:#}", outcome.result.unwrap_err());
        assert!(message.contains("panicked"), "{}", message);
        assert!(message.contains("index out of bounds"), "{}", message);
    }

    #[test]
    fn session_stops_loading_after_worker_panic() {
        let loader = BackgroundLoader::new(Arc::new(BrokenSearch));
        let mut session = SearchSession::new(loader, 8, "react");
        assert!(session.submit());
        assert!(session.view().is_loading);

        for _ in 0..250 {
            if session.pump() > 0 {
                break;
            }
            thread::sleep(Duration::from_millis(20));
        }

        let view = session.view();
        assert!(!view.is_loading);
        assert!(session.state().in_flight.is_empty());
        assert_eq!(view.error.map(|e| e.query.as_str()), Some("react"));
    }
}
