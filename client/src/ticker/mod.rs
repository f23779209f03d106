use std::{
    sync::{
        Arc, RwLock,
        mpsc::{self, RecvTimeoutError, Sender, TryRecvError},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use crate::State;

/// Steps the shared grid on a background thread until told to stop.
///
/// Stop requests are only looked at between generations, and `stop` waits for the thread
/// to finish, so the grid is never left halfway through a step.
pub struct TickerHost {
    stop_sender: Sender<()>,
    rate_sender: Sender<Duration>,
    handle: JoinHandle<()>,
}

impl TickerHost {
    pub fn start(state_arc: Arc<RwLock<State>>, mut interval: Duration) -> Self {
        let (stop_sender, stop_receiver) = mpsc::channel();
        let (rate_sender, rate_receiver) = mpsc::channel();

        let handle = thread::spawn(move || {
            loop {
                match stop_receiver.try_recv() {
                    Err(TryRecvError::Empty) => {}
                    // Either a stop request or the host is gone.
                    _ => break,
                }

                {
                    let Ok(mut state) = state_arc.write() else {
                        log::error!("State lock poisoned, stopping ticker");
                        break;
                    };
                    state.grid.step();
                }

                if let Some(rate) = rate_receiver.try_iter().last() {
                    interval = rate;
                }

                match stop_receiver.recv_timeout(interval) {
                    Err(RecvTimeoutError::Timeout) => {}
                    _ => break,
                }
            }

            log::debug!("Ticker stopped");
        });

        Self {
            stop_sender,
            rate_sender,
            handle,
        }
    }

    /// Asks the ticker to stop and waits until its current generation is done.
    pub fn stop(self) {
        // A send error only means the thread already quit on its own.
        let _ = self.stop_sender.send(());

        if self.handle.join().is_err() {
            log::error!("Ticker thread panicked");
        }
    }

    pub fn set_rate(&self, interval: Duration) {
        let _ = self.rate_sender.send(interval);
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }
}
