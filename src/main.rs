use timeline_fanout::config;
use timeline_fanout::err::FatalErr;
use timeline_fanout::pipeline;
use timeline_fanout::request::{self, Handler};
use timeline_fanout::store::{Keys, RedisStore};
use timeline_fanout::timeline::Reader;

use std::net::SocketAddr;
use std::sync::Arc;
use warp::Filter;

#[tokio::main]
async fn main() -> Result<(), FatalErr> {
    config::merge_dotenv()?;
    pretty_env_logger::try_init()?;
    let (redis_cfg, deployment_cfg, pipeline_cfg) = config::from_env(dotenv::vars().collect())?;

    let keys = Keys::new(redis_cfg.namespace.clone().0);
    let store = Arc::new(RedisStore::connect(redis_cfg).await?);

    let running = pipeline::spawn(store.clone(), keys.clone(), &pipeline_cfg);

    let handler = Handler::new(Reader::new(store, keys, &pipeline_cfg));
    #[cfg(feature = "stub_status")]
    let routes = handler
        .routes()
        .or(request::status(running.stats()))
        .unify()
        .boxed();
    #[cfg(not(feature = "stub_status"))]
    let routes = handler.routes();

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET"])
        .allow_headers(vec!["User-ID"]);

    let server_addr = SocketAddr::new(*deployment_cfg.address, *deployment_cfg.port);
    let (addr, server) = warp::serve(routes.with(cors).recover(request::handle_rejection))
        .try_bind_with_graceful_shutdown(server_addr, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Could not listen for shutdown signal: {}", e);
            }
        })
        .map_err(|e| FatalErr::Bind(server_addr, e))?;

    log::info!("Serving timelines on {}", addr);
    server.await;

    log::info!("Shutting down");
    running.shutdown().await;
    Ok(())
}
