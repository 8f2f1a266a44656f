//! Single-flight debounce scheduler
//!
//! ```text
//! Idle --change--> Pending --window elapsed--> Regenerating --done--> Idle
//!                  ^   |                         |
//!                  +---+ change resets window    | change re-arms Pending
//! ```
//!
//! Bursts coalesce into one run timed from the last change. A run always
//! completes before the next one starts, and changes seen during a run arm a
//! fresh window so they are never dropped.

use claudedoc_types::{Event, EventBus};
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info};

/// Default quiet period before regenerating
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(5);

/// Debounces change notifications into regeneration runs
#[derive(Debug, Clone)]
pub struct DebounceScheduler {
    window: Duration,
    events: Option<Arc<EventBus>>,
}

impl Default for DebounceScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl DebounceScheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            events: None,
        }
    }

    /// Publish a `SourceChanged` event for every change received
    pub fn with_event_bus(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Drive `regenerate` from `changes` until the channel closes
    ///
    /// A failed run is logged and the scheduler goes back to waiting. With an
    /// event bus attached the failure is left to its subscribers and only
    /// logged at debug level here.
    pub async fn run<F, Fut>(self, mut changes: UnboundedReceiver<PathBuf>, mut regenerate: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = anyhow::Result<()>>,
    {
        let mut open = true;
        let mut deadline: Option<Instant> = None;

        while open || deadline.is_some() {
            let Some(at) = deadline else {
                match changes.recv().await {
                    Some(path) => {
                        self.observe(path);
                        deadline = Some(Instant::now() + self.window);
                        debug!("Regeneration pending in {:?}", self.window);
                    }
                    None => open = false,
                }
                continue;
            };

            if !open {
                debug!("Change channel closed, dropping pending regeneration");
                break;
            }

            tokio::select! {
                change = changes.recv() => match change {
                    Some(path) => {
                        self.observe(path);
                        deadline = Some(Instant::now() + self.window);
                    }
                    None => open = false,
                },
                () = sleep_until(at) => {
                    deadline = None;
                    info!("Source change detected, regenerating docs");

                    let run = regenerate();
                    tokio::pin!(run);
                    let outcome = loop {
                        tokio::select! {
                            outcome = &mut run => break outcome,
                            change = changes.recv(), if open => match change {
                                Some(path) => {
                                    self.observe(path);
                                    deadline = Some(Instant::now() + self.window);
                                }
                                None => open = false,
                            },
                        }
                    };

                    match outcome {
                        Ok(()) => info!("Regeneration complete"),
                        // Event bus subscribers report the failure
                        Err(e) if self.events.is_some() => debug!("Regeneration failed: {:#}", e),
                        Err(e) => error!("Regeneration failed: {:#}", e),
                    }
                    if deadline.is_some() {
                        debug!("Changes arrived during regeneration, pending again");
                    }
                }
            }
        }
    }

    fn observe(&self, path: PathBuf) {
        debug!("Change: {:?}", path);
        if let Some(events) = &self.events {
            events.emit(&Event::SourceChanged { path });
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    type Runs = Arc<Mutex<Vec<Duration>>>;

    /// Regeneration that records its start offset and takes `cost`
    fn recorder(
        start: Instant,
        runs: Runs,
        cost: Duration,
        fail_first: bool,
    ) -> impl FnMut() -> std::pin::Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>> {
        move || {
            let runs = Arc::clone(&runs);
            Box::pin(async move {
                let count = {
                    let mut runs = runs.lock().unwrap();
                    runs.push(start.elapsed());
                    runs.len()
                };
                sleep(cost).await;
                if fail_first && count == 1 {
                    anyhow::bail!("boom");
                }
                Ok(())
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_runs_once_after_last_change() {
        let start = Instant::now();
        let runs: Runs = Arc::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = DebounceScheduler::new(Duration::from_secs(5));
        let handle = tokio::spawn(scheduler.run(
            rx,
            recorder(start, Arc::clone(&runs), Duration::ZERO, false),
        ));

        for _ in 0..5 {
            tx.send(PathBuf::from("commands/foo.md")).unwrap();
            sleep(Duration::from_millis(500)).await;
        }
        sleep(Duration::from_secs(10)).await;
        drop(tx);
        handle.await.unwrap();

        assert_eq!(*runs.lock().unwrap(), vec![Duration::from_secs(7)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_change_during_run_rearms() {
        let start = Instant::now();
        let runs: Runs = Arc::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(DebounceScheduler::new(Duration::from_secs(5)).run(
            rx,
            recorder(start, Arc::clone(&runs), Duration::from_secs(3), false),
        ));

        tx.send(PathBuf::from("a")).unwrap();
        // First run starts at 5s and lasts until 8s
        sleep(Duration::from_secs(6)).await;
        tx.send(PathBuf::from("b")).unwrap();
        sleep(Duration::from_secs(20)).await;
        drop(tx);
        handle.await.unwrap();

        assert_eq!(
            *runs.lock().unwrap(),
            vec![Duration::from_secs(5), Duration::from_secs(11)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_scheduler_alive() {
        let start = Instant::now();
        let runs: Runs = Arc::default();
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(DebounceScheduler::new(Duration::from_secs(1)).run(
            rx,
            recorder(start, Arc::clone(&runs), Duration::ZERO, true),
        ));

        tx.send(PathBuf::from("a")).unwrap();
        sleep(Duration::from_secs(2)).await;
        tx.send(PathBuf::from("b")).unwrap();
        sleep(Duration::from_secs(2)).await;
        drop(tx);
        handle.await.unwrap();

        assert_eq!(runs.lock().unwrap().len(), 2);
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Log lines written while `scheduler` handles one failing run
    async fn failure_log(scheduler: DebounceScheduler) -> Vec<String> {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(
            scheduler.run(rx, || async { Err::<(), _>(anyhow::anyhow!("boom")) }),
        );
        tx.send(PathBuf::from("a")).unwrap();
        sleep(Duration::from_secs(2)).await;
        drop(tx);
        handle.await.unwrap();

        let text = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        text.lines()
            .filter(|line| line.contains("Regeneration failed"))
            .map(str::to_string)
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_logged_once() {
        let standalone = failure_log(DebounceScheduler::new(Duration::from_secs(1))).await;
        assert_eq!(standalone.len(), 1);
        assert!(standalone[0].contains("ERROR"));

        let bus = Arc::new(EventBus::new());
        let with_bus =
            failure_log(DebounceScheduler::new(Duration::from_secs(1)).with_event_bus(bus)).await;
        assert_eq!(with_bus.len(), 1);
        assert!(with_bus[0].contains("DEBUG"));
        assert!(!with_bus[0].contains("ERROR"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_changes_are_published() {
        let bus = Arc::new(EventBus::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            bus.subscribe(move |event| {
                if let Event::SourceChanged { path } = event {
                    seen.lock().unwrap().push(path.clone());
                }
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = DebounceScheduler::new(Duration::from_secs(1)).with_event_bus(bus);
        let handle = tokio::spawn(scheduler.run(rx, || async { Ok::<(), anyhow::Error>(()) }));

        tx.send(PathBuf::from("agents/x.md")).unwrap();
        sleep(Duration::from_secs(2)).await;
        drop(tx);
        handle.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![PathBuf::from("agents/x.md")]);
    }
}
