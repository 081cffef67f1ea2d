use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Days, Local, NaiveTime};
use tracing::{debug, info};

use crate::manager::AgentManager;

const ONE_DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Spawn the daily stats rollover loop.
///
/// Sleeps until the next local midnight, resets the completed-today
/// counter, then repeats. The handle is returned for shutdown/test
/// purposes; the daemon just detaches it.
pub fn spawn_daily_rollover(manager: Arc<AgentManager>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let wait = duration_until_next_midnight(Local::now());
            debug!(seconds = wait.as_secs(), "sleeping until next local midnight");
            tokio::time::sleep(wait).await;
            manager.reset_daily();
            info!("daily stats rollover");
        }
    })
}

/// Time remaining until the next local midnight.
///
/// Falls back to a flat 24 hours when the local timezone has no
/// representable midnight (DST gap edge case).
pub fn duration_until_next_midnight(now: DateTime<Local>) -> Duration {
    let tomorrow = now.date_naive() + Days::new(1);
    let next_midnight = tomorrow
        .and_time(NaiveTime::MIN)
        .and_local_timezone(Local)
        .earliest();

    match next_midnight {
        Some(midnight) => (midnight - now).to_std().unwrap_or(ONE_DAY),
        None => ONE_DAY,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_is_positive_and_at_most_a_day() {
        let wait = duration_until_next_midnight(Local::now());
        assert!(wait > Duration::ZERO);
        assert!(wait <= ONE_DAY);
    }

    #[test]
    fn wait_from_just_before_midnight_is_short() {
        let now = Local::now();
        let late = now
            .date_naive()
            .and_time(NaiveTime::from_hms_opt(23, 59, 30).unwrap())
            .and_local_timezone(Local)
            .earliest()
            .unwrap();
        let wait = duration_until_next_midnight(late);
        assert!(wait <= Duration::from_secs(30));
    }
}
