use std::rc::Rc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use ragchat_client::RagApi;
use ragchat_ui::{Controller, Surface};

/// Periodic silent history resync running as a local task.
///
/// Must be started inside a `LocalSet`. Stops on [`AutoRefresh::stop`] or
/// when dropped.
pub struct AutoRefresh {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl AutoRefresh {
    /// `None` when `period` is zero (refresh disabled).
    pub fn start<A, S>(controller: Rc<Controller<A, S>>, period: Duration) -> Option<Self>
    where
        A: RagApi + 'static,
        S: Surface + 'static,
    {
        if period.is_zero() {
            return None;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::task::spawn_local(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        controller.resync_history().await;
                    }
                }
            }
            log::debug!("Auto-refresh stopped");
        });

        log::debug!("Auto-refresh every {:?}", period);
        Some(Self {
            cancel,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Cancel the task and wait for it to finish.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Resync the history once after `delay`, as done after a successful send.
pub fn schedule_resync<A, S>(controller: Rc<Controller<A, S>>, delay: Duration) -> JoinHandle<()>
where
    A: RagApi + 'static,
    S: Surface + 'static,
{
    tokio::task::spawn_local(async move {
        tokio::time::sleep(delay).await;
        controller.resync_history().await;
    })
}
