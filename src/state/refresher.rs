use crate::state::messages::NetworkRequest;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::interval;

/// Periodic schedule refresh — every 60 seconds for the selected date.
/// Only sends RefreshSchedule; the worker re-fetches whatever date it
/// served last, so a date change between ticks is picked up automatically.
pub struct PeriodicRefresher {
    network_requests: mpsc::Sender<NetworkRequest>,
}

impl PeriodicRefresher {
    pub fn new(network_requests: mpsc::Sender<NetworkRequest>) -> Self {
        Self { network_requests }
    }

    pub async fn run(self) {
        let mut schedule_interval = interval(Duration::from_secs(60));
        // Skip the immediate first tick so startup loading isn't double-triggered.
        schedule_interval.tick().await;

        loop {
            schedule_interval.tick().await;
            let _ = self
                .network_requests
                .send(NetworkRequest::RefreshSchedule)
                .await;
        }
    }
}
