use std::rc::Rc;
use std::time::Duration;

use gloo_timers::callback::Interval;

use ragchat_client::RagApi;
use ragchat_ui::{Controller, Surface};

/// Repeating silent history resync. Dropping or stopping the handle
/// cancels the interval.
pub struct RefreshHandle {
    interval: Option<Interval>,
}

impl RefreshHandle {
    /// `None` when `period` is zero.
    pub fn start<A, S>(controller: Rc<Controller<A, S>>, period: Duration) -> Option<Self>
    where
        A: RagApi + 'static,
        S: Surface + 'static,
    {
        let millis = u32::try_from(period.as_millis()).unwrap_or(u32::MAX);
        if millis == 0 {
            return None;
        }

        let interval = Interval::new(millis, move || {
            let controller = controller.clone();
            wasm_bindgen_futures::spawn_local(async move {
                controller.resync_history().await;
            });
        });
        log::debug!("Auto-refresh every {} ms", millis);
        Some(Self {
            interval: Some(interval),
        })
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    pub fn stop(&mut self) {
        if let Some(interval) = self.interval.take() {
            interval.cancel();
            log::debug!("Auto-refresh stopped");
        }
    }
}
