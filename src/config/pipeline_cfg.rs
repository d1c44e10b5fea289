use super::pipeline_cfg_types::*;
use super::EnvVar;
use crate::err::FatalErr;

#[derive(Debug, Default, Clone)]
pub struct Pipeline {
    pub workers: Workers,
    pub queue_capacity: QueueCapacity,
    pub poll_err_backoff: PollErrBackoff,
    pub poll_empty_backoff: PollEmptyBackoff,
    pub fanout_timeout: FanoutTimeout,
    pub read_timeout: ReadTimeout,
    pub timeline_max_len: TimelineMaxLen,
}

impl Pipeline {
    pub(crate) fn from_env(env: EnvVar) -> Result<Self, FatalErr> {
        let cfg = Self {
            workers: Workers::default().maybe_update(env.get("WORKERS"))?,
            queue_capacity: QueueCapacity::default().maybe_update(env.get("QUEUE_CAPACITY"))?,
            poll_err_backoff: PollErrBackoff::default()
                .maybe_update(env.get("POLL_ERR_BACKOFF"))?,
            poll_empty_backoff: PollEmptyBackoff::default()
                .maybe_update(env.get("POLL_EMPTY_BACKOFF"))?,
            fanout_timeout: FanoutTimeout::default().maybe_update(env.get("FANOUT_TIMEOUT"))?,
            read_timeout: ReadTimeout::default().maybe_update(env.get("READ_TIMEOUT"))?,
            timeline_max_len: TimelineMaxLen::default()
                .maybe_update(env.get("TIMELINE_MAX_LEN"))?,
        };
        log::info!("Using pipeline configuration:\n {:#?}", &cfg);
        Ok(cfg)
    }

    /// The timeline cap, if one is configured.
    pub fn max_len(&self) -> Option<usize> {
        Some(*self.timeline_max_len).filter(|len| *len > 0)
    }
}
