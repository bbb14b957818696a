use std::future::Future;
use std::time::Duration;

use tokio::time::interval;
use tracing::warn;

use crate::jobs::JobError;

/// Drives a job on a fixed tick. A failing run is logged and the loop
/// continues on the next tick.
pub async fn run_interval<F, Fut>(
    name: &'static str,
    period: Duration,
    mut job: F,
) -> Result<(), JobError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<(), JobError>>,
{
    let mut ticker = interval(period);
    loop {
        ticker.tick().await;
        if let Err(err) = job().await {
            warn!(error = %err, job = name, "job execution failed");
        }
    }
}
