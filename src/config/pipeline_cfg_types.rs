use crate::from_env_var;
use std::time::Duration;

from_env_var!(
    /// How many workers run fan-out writes concurrently
    let name = Workers;
    let default: usize = 5;
    let (env_var, allowed_values) = ("WORKERS", "a positive number");
    let from_str = |s| s.parse().ok().filter(|n: &usize| *n > 0);
);
from_env_var!(
    /// How many admitted tweets may wait for a worker before the poller blocks
    let name = QueueCapacity;
    let default: usize = 100;
    let (env_var, allowed_values) = ("QUEUE_CAPACITY", "a positive number");
    let from_str = |s| s.parse().ok().filter(|n: &usize| *n > 0);
);
from_env_var!(
    /// How long the poller waits after Redis returns an error
    let name = PollErrBackoff;
    let default: Duration = Duration::from_millis(1000);
    let (env_var, allowed_values) = ("POLL_ERR_BACKOFF", "a number of milliseconds");
    let from_str = |s| s.parse().map(Duration::from_millis).ok();
);
from_env_var!(
    /// How long the poller waits after finding the queue empty
    let name = PollEmptyBackoff;
    let default: Duration = Duration::from_millis(2000);
    let (env_var, allowed_values) = ("POLL_EMPTY_BACKOFF", "a number of milliseconds");
    let from_str = |s| s.parse().map(Duration::from_millis).ok();
);
from_env_var!(
    /// Upper bound on submitting one tweet's timeline writes
    let name = FanoutTimeout;
    let default: Duration = Duration::from_millis(5000);
    let (env_var, allowed_values) = ("FANOUT_TIMEOUT", "a positive number of milliseconds");
    let from_str = |s| s.parse().ok().filter(|n: &u64| *n > 0).map(Duration::from_millis);
);
from_env_var!(
    /// Upper bound on assembling one page of a timeline
    let name = ReadTimeout;
    let default: Duration = Duration::from_millis(2000);
    let (env_var, allowed_values) = ("READ_TIMEOUT", "a positive number of milliseconds");
    let from_str = |s| s.parse().ok().filter(|n: &u64| *n > 0).map(Duration::from_millis);
);
from_env_var!(
    /// Longest a home timeline may grow; 0 keeps every entry
    let name = TimelineMaxLen;
    let default: usize = 0;
    let (env_var, allowed_values) = ("TIMELINE_MAX_LEN", "a number (0 for unbounded)");
    let from_str = |s| s.parse().ok();
);
