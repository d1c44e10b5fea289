//! The HTTP surface in front of the timeline reader.
//!
//! | route                          | reply                                  |
//! |--------------------------------|----------------------------------------|
//! | `GET /paginate?page=&size=`    | timeline entries, tweet and author     |
//! | `GET /tweets?limit=&offset=`   | bare tweets                            |
//! | `GET /api/v1/health`           | `OK`                                   |
//! | `GET /api/v1/status`           | worker pool counters (`stub_status`)   |
//!
//! The reader's id comes from the `User-ID` header, set by the gateway after
//! authentication.  Failures are JSON objects with an `error` field.
pub mod query;

use crate::store::Store;
use crate::timeline::{ReadErr, Reader};

use serde::Serialize;
use warp::filters::BoxedFilter;
use warp::http::StatusCode;
use warp::reject::{self, Rejection};
use warp::reply::Response;
use warp::{Filter, Reply};

#[cfg(feature = "stub_status")]
use crate::pipeline::Stats;
#[cfg(feature = "stub_status")]
use std::sync::Arc;

/// The request had no `User-ID` header (or an empty one).
#[derive(Debug)]
pub struct MissingUserId;
impl reject::Reject for MissingUserId {}

#[derive(Debug)]
pub struct Handler<S> {
    reader: Reader<S>,
}

impl<S: Store> Handler<S> {
    pub fn new(reader: Reader<S>) -> Self {
        Self { reader }
    }

    /// Every read route plus the health check.  Rejections still need [`handle_rejection`].
    pub fn routes(&self) -> BoxedFilter<(Response,)> {
        self.paginate()
            .or(self.tweets())
            .unify()
            .or(health().map(|| "OK".into_response()))
            .unify()
            .boxed()
    }

    pub fn paginate(&self) -> BoxedFilter<(Response,)> {
        let reader = self.reader.clone();
        warp::path!("paginate")
            .and(warp::get())
            .and(user_id())
            .and(warp::query::<query::Page>())
            .and_then(move |user_id: String, q: query::Page| {
                let reader = reader.clone();
                async move {
                    log::debug!("Page {} (size {}) for {}", q.page, q.size, user_id);
                    Ok::<_, Rejection>(respond(reader.paginate(&user_id, q.page, q.size).await))
                }
            })
            .boxed()
    }

    pub fn tweets(&self) -> BoxedFilter<(Response,)> {
        let reader = self.reader.clone();
        warp::path!("tweets")
            .and(warp::get())
            .and(user_id())
            .and(warp::query::<query::Offset>())
            .and_then(move |user_id: String, q: query::Offset| {
                let reader = reader.clone();
                async move {
                    let tweets = reader.paginate_tweets(&user_id, q.limit, q.offset).await;
                    Ok::<_, Rejection>(respond(tweets))
                }
            })
            .boxed()
    }
}

pub fn health() -> BoxedFilter<()> {
    warp::path!("api" / "v1" / "health")
        .and(warp::get())
        .boxed()
}

#[cfg(feature = "stub_status")]
pub fn status(stats: Arc<Stats>) -> BoxedFilter<(Response,)> {
    warp::path!("api" / "v1" / "status")
        .and(warp::get())
        .map(move || warp::reply::json(&stats.snapshot()).into_response())
        .boxed()
}

fn user_id() -> BoxedFilter<(String,)> {
    warp::header::optional::<String>("user-id")
        .and_then(|user_id: Option<String>| async move {
            match user_id {
                Some(id) if !id.is_empty() => Ok(id),
                _ => Err(reject::custom(MissingUserId)),
            }
        })
        .boxed()
}

fn respond<T: Serialize>(read: Result<T, ReadErr>) -> Response {
    match read {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(e) if e.is_bad_request() => error_reply(StatusCode::BAD_REQUEST, e),
        Err(e) => {
            log::error!("{}", e);
            error_reply(StatusCode::INTERNAL_SERVER_ERROR, e)
        }
    }
}

fn error_reply(status: StatusCode, msg: impl ToString) -> Response {
    let body = serde_json::json!({ "error": msg.to_string() });
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

/// Turn the rejections this crate produces into JSON error replies.
pub async fn handle_rejection(rejection: Rejection) -> Result<Response, Rejection> {
    if rejection.find::<MissingUserId>().is_some() {
        Ok(error_reply(
            StatusCode::UNAUTHORIZED,
            "missing User-ID header",
        ))
    } else if let Some(e) = rejection.find::<reject::InvalidQuery>() {
        Ok(error_reply(StatusCode::BAD_REQUEST, e))
    } else {
        Err(rejection)
    }
}
