//! Fan-out-on-write home timelines, cached in Redis
//!
//!
//! When a user tweets, the tweet service caches the tweet and pushes its id onto a pending
//! queue.  This crate drains that queue and writes the id into the home timeline of every
//! follower of the author; it then serves those timelines back, page by page, with each
//! tweet joined to its author's cached display fields.
//!
//! # Notes on data flow
//! * **Producer → Redis**:
//! [`producer::Producer::publish`] caches the tweet record under `tweets:{id}` and pushes the
//! id onto `tweet_queue`, in one transaction.
//!
//! * **Redis → Poller**:
//! The [`pipeline::Poller`] repeatedly asks the [`pipeline::DedupGate`] for the next id.  The
//! gate pops ids off the queue in a server-side script that admits an id only the first time
//! it is seen, so a tweet enqueued twice is fanned out once.
//!
//! * **Poller → Workers**:
//! Admitted ids travel over a bounded channel to a fixed pool of workers.  When every worker
//! is busy and the channel is full, the poller waits and the backlog stays in Redis.
//!
//! * **Workers → Redis**:
//! Each worker runs the [`pipeline::Fanout`] writer: it reads the author's follower set and
//! prepends the id to each `timeline:{follower}` list in one `MULTI`/`EXEC` batch.
//!
//! * **Client Request → Warp → Reader**:
//! Warp filters parse the reader's id and page, and the [`timeline::Reader`] assembles the page
//! in three round trips: the ids, then every tweet record, then every distinct author.

pub mod config;
pub mod err;
pub mod pipeline;
pub mod producer;
pub mod record;
pub mod request;
pub mod store;
pub mod timeline;
