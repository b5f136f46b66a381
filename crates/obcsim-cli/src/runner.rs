//! Session worker and interrupt handling

use std::future::Future;
use tokio_util::sync::CancellationToken;

use obcsim_core::bridge::{BridgeError, Session};

/// Open a session on a blocking thread, run `work` on it, and always tear it
/// down.
///
/// When `interrupt` resolves first, the token handed to `work` is cancelled;
/// the worker thread still owns the session and performs the teardown. After
/// an interrupt this returns `Ok(())` whatever the worker or teardown
/// reported, so the process exits successfully.
pub async fn run_session<O, W, I>(open: O, work: W, interrupt: I) -> anyhow::Result<()>
where
    O: FnOnce() -> anyhow::Result<Session> + Send + 'static,
    W: FnOnce(&mut Session, &CancellationToken) -> Result<(), BridgeError> + Send + 'static,
    I: Future<Output = std::io::Result<()>>,
{
    let cancel = CancellationToken::new();
    let worker_cancel = cancel.clone();

    let mut worker = tokio::task::spawn_blocking(move || -> anyhow::Result<()> {
        let mut session = open()?;
        let result = work(&mut session, &worker_cancel);
        if let Err(e) = session.close() {
            tracing::warn!("teardown failed: {e}");
        }
        result.map_err(anyhow::Error::from)
    });

    tokio::select! {
        joined = &mut worker => joined?,
        signal = interrupt => {
            if let Err(e) = signal {
                tracing::warn!("could not listen for CTRL + C: {e}");
                return worker.await?;
            }
            println!("[SIGNAL] You pressed CTRL + C (SIGINT)");
            println!("Stopping adapter stream and closing port...");
            cancel.cancel();
            match worker.await {
                Ok(Err(e)) => tracing::warn!("session ended with error during shutdown: {e:#}"),
                Err(e) => tracing::warn!("session worker failed during shutdown: {e}"),
                Ok(Ok(())) => {}
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use obcsim_core::bridge::{monitor, Transport};
    use obcsim_core::config::BridgeConfig;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Transport calls in order, e.g. "write }", "flush", "close"
    #[derive(Default)]
    struct Recorder {
        calls: Vec<String>,
        stuck_open: bool,
        closed: bool,
    }

    struct RecordingTransport(Arc<Mutex<Recorder>>);

    impl Transport for RecordingTransport {
        fn is_open(&self) -> bool {
            let rec = self.0.lock().unwrap();
            !rec.closed || rec.stuck_open
        }

        fn write_line(&mut self, data: &[u8]) -> Result<(), BridgeError> {
            let mut rec = self.0.lock().unwrap();
            rec.calls
                .push(format!("write {}", String::from_utf8_lossy(data)));
            Ok(())
        }

        fn read_lines(&mut self) -> Result<Vec<String>, BridgeError> {
            Ok(Vec::new())
        }

        fn flush(&mut self) -> Result<(), BridgeError> {
            self.0.lock().unwrap().calls.push("flush".to_string());
            Ok(())
        }

        fn close(&mut self) -> Result<(), BridgeError> {
            let mut rec = self.0.lock().unwrap();
            rec.calls.push("close".to_string());
            rec.closed = true;
            Ok(())
        }
    }

    fn opener(
        recorder: Arc<Mutex<Recorder>>,
    ) -> impl FnOnce() -> anyhow::Result<Session> + Send + 'static {
        move || {
            let config = BridgeConfig {
                device: "recorder".to_string(),
                min_delay_ms: 0,
                read_timeout_ms: 0,
                ..BridgeConfig::default()
            };
            let mut session =
                Session::with_transport(Box::new(RecordingTransport(recorder)), &config)?;
            session.configure()?;
            session.start_stream()?;
            Ok(session)
        }
    }

    async fn interrupt_after(ms: u64) -> std::io::Result<()> {
        tokio::time::sleep(Duration::from_millis(ms)).await;
        Ok(())
    }

    fn tail(recorder: &Arc<Mutex<Recorder>>) -> Vec<String> {
        let rec = recorder.lock().unwrap();
        rec.calls[rec.calls.len() - 3..].to_vec()
    }

    #[tokio::test]
    async fn test_interrupt_tears_down_and_succeeds() {
        let recorder = Arc::new(Mutex::new(Recorder::default()));

        let result = run_session(
            opener(recorder.clone()),
            |session, cancel| {
                monitor::run(session, cancel, Duration::from_millis(5), |_| {})?;
                Ok(())
            },
            interrupt_after(50),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(tail(&recorder), vec!["write }", "flush", "close"]);
    }

    #[tokio::test]
    async fn test_interrupt_swallows_worker_and_teardown_errors() {
        let recorder = Arc::new(Mutex::new(Recorder {
            stuck_open: true,
            ..Recorder::default()
        }));

        let result = run_session(
            opener(recorder.clone()),
            |_session, cancel| {
                while !cancel.is_cancelled() {
                    std::thread::sleep(Duration::from_millis(5));
                }
                Err(BridgeError::NotOpen)
            },
            interrupt_after(50),
        )
        .await;

        assert!(result.is_ok());
        assert_eq!(tail(&recorder), vec!["write }", "flush", "close"]);
    }

    #[tokio::test]
    async fn test_worker_error_without_interrupt_is_reported() {
        let recorder = Arc::new(Mutex::new(Recorder::default()));

        let result = run_session(
            opener(recorder.clone()),
            |_session, _cancel| Err(BridgeError::NotOpen),
            std::future::pending::<std::io::Result<()>>(),
        )
        .await;

        assert!(result.is_err());
        assert_eq!(tail(&recorder), vec!["write }", "flush", "close"]);
    }

    #[tokio::test]
    async fn test_open_failure_is_reported() {
        let result = run_session(
            || Err(anyhow::anyhow!("no adapter")),
            |_session, _cancel| Ok(()),
            std::future::pending::<std::io::Result<()>>(),
        )
        .await;

        assert!(result.is_err());
    }
}
