/*! Background hostname resolution.

Dissector stages want names next to addresses, but a reverse lookup can
take seconds and the packet path must never wait on it. Requests are
queued to a single worker thread which resolves them one at a time, in
submission order, and fires the caller's callback only when the lookup
actually produced a name; failures are dropped silently.
*/

use crossbeam_channel::{unbounded, Receiver, RecvTimeoutError, Sender};
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

/// How often the worker re-checks the stop flag while idle.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

type Callback = Box<dyn FnOnce(&str) + Send + 'static>;

struct Request {
    addr: IpAddr,
    cb: Callback,
}

/// Handle to the resolver worker. Creating it starts the thread; there is
/// exactly one queue and one worker per handle.
pub struct Resolver {
    tx: Sender<Request>,
    rx: Receiver<Request>,
    stop: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl Resolver {
    /// Start the worker. Fails only if the OS refuses the thread.
    pub fn spawn() -> io::Result<Resolver> {
        Resolver::spawn_with(|addr| dns_lookup::lookup_addr(addr))
    }

    fn spawn_with<F>(lookup: F) -> io::Result<Resolver>
    where
        F: Fn(&IpAddr) -> io::Result<String> + Send + 'static,
    {
        let (tx, rx) = unbounded::<Request>();
        let stop = Arc::new(AtomicBool::new(false));
        let worker = {
            let rx = rx.clone();
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("resolver".into())
                .spawn(move || {
                    while !stop.load(Ordering::Acquire) {
                        match rx.recv_timeout(POLL_INTERVAL) {
                            Ok(req) => match lookup(&req.addr) {
                                Ok(name) => (req.cb)(&name),
                                Err(e) => debug!("Reverse lookup of {} failed: {e}", req.addr),
                            },
                            Err(RecvTimeoutError::Timeout) => continue,
                            Err(RecvTimeoutError::Disconnected) => break,
                        }
                    }
                })?
        };
        Ok(Resolver {
            tx,
            rx,
            stop,
            worker: Some(worker),
        })
    }

    /// Queue a reverse lookup. Never blocks; requests are served strictly
    /// in submission order.
    ///
    /// # Panics
    ///
    /// Submitting after [`shutdown`](Self::shutdown) has begun is a
    /// programmer error.
    pub fn submit(&self, addr: IpAddr, cb: impl FnOnce(&str) + Send + 'static) {
        self.tx
            .send(Request {
                addr,
                cb: Box::new(cb),
            })
            .expect("resolver is shut down");
    }

    /// Stop the worker and discard whatever is still queued. The worker
    /// finishes the lookup it is in (there is no cancelling a name query)
    /// and exits within one poll interval; pending requests are freed
    /// without their callbacks firing.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        while self.rx.try_recv().is_ok() {}
    }
}

impl Drop for Resolver {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.stop_and_join();
        }
    }
}
