//! Periodic ticks for the service tasks.
//!
//! Each periodic component gets a tick channel of capacity one. The scheduler job
//! for a component only ever `try_send`s into it, so a tick firing while the
//! previous one is still running is coalesced with the pending one instead of
//! queueing up behind a slow probe or a rate-limited Discord call.

pub mod worker;

use std::time::Duration;
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::error::AppError;

/// Receiving end of a tick channel.
pub type Ticks = mpsc::Receiver<()>;

/// A periodic tick for one component.
pub struct TickJob {
    pub name: &'static str,
    pub interval: Duration,
    pub sender: mpsc::Sender<()>,
}

/// Creates a tick channel with one tick already pending.
///
/// The pending tick makes every component run once at startup instead of waiting
/// a full interval.
pub fn tick_channel() -> (mpsc::Sender<()>, Ticks) {
    let (sender, receiver) = mpsc::channel(1);
    let _ = sender.try_send(());
    (sender, receiver)
}

/// Starts the tick scheduler
///
/// # Arguments
/// - `jobs` - One tick job per periodic component
///
/// # Returns
/// - `Ok(JobScheduler)` - The running scheduler, to be shut down on exit
/// - `Err(AppError)` - A job could not be created or the scheduler not started
pub async fn start_scheduler(jobs: Vec<TickJob>) -> Result<JobScheduler, AppError> {
    let scheduler = JobScheduler::new().await?;

    for TickJob {
        name,
        interval,
        sender,
    } in jobs
    {
        let job = Job::new_repeated_async(interval, move |_uuid, _lock| {
            let sender = sender.clone();

            Box::pin(async move {
                if let Err(TrySendError::Full(())) = sender.try_send(()) {
                    tracing::debug!("{} tick coalesced, previous tick still running", name);
                }
            })
        })?;

        scheduler.add(job).await?;
        tracing::debug!("Scheduled {} every {}s", name, interval.as_secs());
    }

    scheduler.start().await?;

    tracing::info!("Tick scheduler started");

    Ok(scheduler)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that a new tick channel holds exactly one pending tick.
    ///
    /// Verifies that further ticks are coalesced while one is pending.
    ///
    /// Expected: one tick received, second try_send reports Full
    #[tokio::test]
    async fn tick_channel_is_primed_and_coalesces() {
        let (sender, mut ticks) = tick_channel();

        assert!(matches!(sender.try_send(()), Err(TrySendError::Full(()))));
        assert_eq!(ticks.recv().await, Some(()));
        assert!(ticks.try_recv().is_err());
    }
}
