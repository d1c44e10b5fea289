use super::*;
use crate::config::EnvVar;
use crate::pipeline::{DedupGate, Fanout, FanoutErr};
use crate::store::Keys;
use crate::timeline::{ReadErr, Reader};

use hashbrown::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// How the fake server answers one command; `None` leaves the command unanswered.
type Script = fn(&[String]) -> Option<Vec<u8>>;
type Received = Arc<std::sync::Mutex<Vec<Vec<String>>>>;

/// A scripted stand-in for Redis.  It answers `PING` itself and records every other command.
struct FakeRedis {
    addr: SocketAddr,
    received: Received,
    connections: Arc<AtomicUsize>,
}

impl FakeRedis {
    async fn start(script: Script) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local address");
        let received = Received::default();
        let connections = Arc::new(AtomicUsize::new(0));

        let (conn_received, conn_count) = (received.clone(), connections.clone());
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                conn_count.fetch_add(1, Ordering::SeqCst);
                tokio::spawn(serve(stream, script, conn_received.clone()));
            }
        });
        Self {
            addr,
            received,
            connections,
        }
    }

    fn cfg(&self, vars: &[(&str, &str)]) -> config::Redis {
        let mut env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        env.insert("REDIS_HOST".to_string(), self.addr.ip().to_string());
        env.insert("REDIS_PORT".to_string(), self.addr.port().to_string());
        env.insert("REDIS_POOL_SIZE".to_string(), "1".to_string());
        config::Redis::from_env(EnvVar::new(env)).expect("valid Redis config")
    }

    async fn store(&self) -> Result<Arc<RedisStore>> {
        Ok(Arc::new(RedisStore::connect(self.cfg(&[])).await?))
    }

    fn received(&self) -> Vec<Vec<String>> {
        self.received.lock().expect("lock").clone()
    }

    fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

async fn serve(mut stream: TcpStream, script: Script, received: Received) {
    let mut input = Vec::new();
    loop {
        loop {
            let (args, consumed) = match Reply::parse(&input) {
                Ok((Reply::Array(Some(args)), rest)) => (args, input.len() - rest.len()),
                _ => break,
            };
            input.drain(..consumed);
            let cmd: Vec<String> = args
                .into_iter()
                .map(|arg| match arg {
                    Reply::Bulk(Some(bytes)) => String::from_utf8_lossy(&bytes).into_owned(),
                    other => format!("{:?}", other),
                })
                .collect();

            let reply = if cmd[0] == "PING" {
                Some(b"+PONG\r\n".to_vec())
            } else {
                received.lock().expect("lock").push(cmd.clone());
                script(&cmd)
            };
            if let Some(reply) = reply {
                if stream.write_all(&reply).await.is_err() {
                    return;
                }
            }
        }
        match stream.read_buf(&mut input).await {
            Ok(0) | Err(_) => return,
            Ok(_) => (),
        }
    }
}

fn resp(reply: &[u8]) -> Option<Vec<u8>> {
    Some(reply.to_vec())
}

fn cmd(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|part| part.to_string()).collect()
}

fn timeline_batch() -> Batch {
    let mut batch = Batch::new();
    batch
        .lpush("timeline:f1".to_string(), "t1".to_string())
        .ltrim("timeline:f1".to_string(), 0, 99);
    batch
}

#[tokio::test]
async fn connect_authenticates_and_selects_db() -> Result<()> {
    let redis = FakeRedis::start(|cmd| match cmd[0].as_str() {
        "AUTH" | "SELECT" => resp(b"+OK\r\n"),
        _ => resp(b"-ERR unexpected\r\n"),
    })
    .await;

    RedisStore::connect(redis.cfg(&[("REDIS_PASSWORD", "pw"), ("REDIS_DB", "2")])).await?;
    assert_eq!(
        redis.received(),
        vec![cmd(&["AUTH", "pw"]), cmd(&["SELECT", "2"])]
    );
    Ok(())
}

#[tokio::test]
async fn wrong_password_fails_to_connect() {
    let redis =
        FakeRedis::start(|_| resp(b"-WRONGPASS invalid username-password pair\r\n")).await;

    let res = RedisStore::connect(redis.cfg(&[("REDIS_PASSWORD", "nope")])).await;
    assert!(matches!(res, Err(StoreErr::IncorrectPassword)));
}

#[tokio::test]
async fn gate_runs_the_pop_script_against_queue_and_processed_set() -> Result<()> {
    let redis = FakeRedis::start(|cmd| match cmd.get(3).map(String::as_str) {
        Some("tweet_queue") => resp(b"$2\r\nt7\r\n"),
        _ => resp(b"$-1\r\n"),
    })
    .await;
    let store = redis.store().await?;

    let gate = DedupGate::new(store.clone(), &Keys::default());
    assert_eq!(gate.try_admit().await?, Some("t7".to_string()));
    assert_eq!(
        redis.received(),
        vec![cmd(&["EVAL", POP_UNSEEN, "2", "tweet_queue", "processed_tweets"])]
    );

    // The script's `return false` arrives as a null bulk string
    let drained = DedupGate::new(store, &Keys::new(Some("ns".to_string())));
    assert_eq!(drained.try_admit().await?, None);
    assert_eq!(redis.received()[1][3], "ns:tweet_queue");
    Ok(())
}

#[tokio::test]
async fn reads_map_each_reply() -> Result<()> {
    let redis = FakeRedis::start(|cmd| match cmd[0].as_str() {
        "GET" => resp(b"$2\r\n\xff\xfe\r\n"),
        "MGET" => resp(b"*2\r\n$2\r\n{}\r\n$-1\r\n"),
        "LRANGE" => resp(b"*2\r\n$2\r\nt2\r\n$2\r\nt1\r\n"),
        "SMEMBERS" => resp(b"*1\r\n$1\r\n\xff\r\n"),
        _ => resp(b"-ERR unexpected\r\n"),
    })
    .await;
    let store = redis.store().await?;

    assert_eq!(store.get("tweets:t1").await?, Some(vec![0xff, 0xfe]));
    let keys = vec!["users:a".to_string(), "users:b".to_string()];
    assert_eq!(store.mget(&keys).await?, vec![Some(b"{}".to_vec()), None]);
    assert!(store.mget(&[]).await?.is_empty());
    assert_eq!(store.lrange("timeline:u1", 0, 9).await?, vec!["t2", "t1"]);
    assert!(matches!(
        store.smembers("followers:u1").await,
        Err(StoreErr::InvalidRedisReply(_))
    ));

    assert_eq!(
        redis.received(),
        vec![
            cmd(&["GET", "tweets:t1"]),
            cmd(&["MGET", "users:a", "users:b"]),
            cmd(&["LRANGE", "timeline:u1", "0", "9"]),
            cmd(&["SMEMBERS", "followers:u1"]),
        ]
    );
    assert_eq!(redis.connections(), 1);
    Ok(())
}

#[tokio::test]
async fn non_utf8_records_are_corrupt_not_store_failures() -> Result<()> {
    let redis = FakeRedis::start(|cmd| match cmd[0].as_str() {
        "LRANGE" => resp(b"*1\r\n$2\r\nt1\r\n"),
        "GET" => resp(b"$2\r\n\xff\xfe\r\n"),
        "MGET" => resp(b"*1\r\n$2\r\n\xff\xfe\r\n"),
        _ => resp(b"-ERR unexpected\r\n"),
    })
    .await;
    let store = redis.store().await?;
    let cfg = config::Pipeline::default();

    let reader = Reader::new(store.clone(), Keys::default(), &cfg);
    match reader.paginate("u1", 1, 10).await {
        Err(ReadErr::CorruptRecord(e)) => assert_eq!(e.key, "tweets:t1"),
        other => panic!("expected a corrupt record, got {:?}", other),
    }

    let fanout = Fanout::new(store, Keys::default(), &cfg);
    match fanout.fanout("t1").await {
        Err(FanoutErr::CorruptRecord(e)) => assert_eq!(e.key, "tweets:t1"),
        other => panic!("expected a corrupt record, got {:?}", other),
    }
    assert_eq!(redis.connections(), 1);
    Ok(())
}

#[tokio::test]
async fn exec_wraps_the_batch_in_a_transaction() -> Result<()> {
    let redis = FakeRedis::start(|cmd| match cmd[0].as_str() {
        "MULTI" => resp(b"+OK\r\n"),
        "EXEC" => resp(b"*2\r\n:1\r\n+OK\r\n"),
        _ => resp(b"+QUEUED\r\n"),
    })
    .await;
    let store = redis.store().await?;

    store.exec(timeline_batch()).await?;
    store.exec(Batch::new()).await?;
    assert_eq!(
        redis.received(),
        vec![
            cmd(&["MULTI"]),
            cmd(&["LPUSH", "timeline:f1", "t1"]),
            cmd(&["LTRIM", "timeline:f1", "0", "99"]),
            cmd(&["EXEC"]),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn rejected_command_fails_the_batch_and_keeps_the_connection() -> Result<()> {
    let redis = FakeRedis::start(|cmd| match cmd[0].as_str() {
        "MULTI" => resp(b"+OK\r\n"),
        "LPUSH" => resp(b"-ERR wrong number of arguments for 'lpush' command\r\n"),
        "EXEC" => resp(b"-EXECABORT Transaction discarded because of previous errors.\r\n"),
        "GET" => resp(b"$-1\r\n"),
        _ => resp(b"+QUEUED\r\n"),
    })
    .await;
    let store = redis.store().await?;

    match store.exec(timeline_batch()).await {
        Err(StoreErr::RedisReplyErr(msg)) => assert!(msg.starts_with("ERR wrong number")),
        other => panic!("expected a reply error, got {:?}", other),
    }
    assert_eq!(store.get("k").await?, None);
    assert_eq!(redis.connections(), 1);
    Ok(())
}

#[tokio::test]
async fn null_exec_reply_fails_the_batch() -> Result<()> {
    let redis = FakeRedis::start(|cmd| match cmd[0].as_str() {
        "MULTI" => resp(b"+OK\r\n"),
        "EXEC" => resp(b"*-1\r\n"),
        _ => resp(b"+QUEUED\r\n"),
    })
    .await;
    let store = redis.store().await?;

    match store.exec(timeline_batch()).await {
        Err(StoreErr::RedisReplyErr(msg)) => assert_eq!(msg, "transaction aborted"),
        other => panic!("expected an aborted transaction, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn error_inside_exec_results_fails_the_batch() -> Result<()> {
    let redis = FakeRedis::start(|cmd| match cmd[0].as_str() {
        "MULTI" => resp(b"+OK\r\n"),
        "EXEC" => resp(
            b"*2\r\n:1\r\n-WRONGTYPE Operation against a key holding the wrong kind of value\r\n",
        ),
        _ => resp(b"+QUEUED\r\n"),
    })
    .await;
    let store = redis.store().await?;

    match store.exec(timeline_batch()).await {
        Err(StoreErr::RedisReplyErr(msg)) => assert!(msg.starts_with("WRONGTYPE")),
        other => panic!("expected a reply error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn unparseable_reply_replaces_the_connection() -> Result<()> {
    let redis = FakeRedis::start(|cmd| match cmd.get(1).map(String::as_str) {
        Some("bad") => resp(b"?oops\r\n"),
        _ => resp(b"$1\r\nx\r\n"),
    })
    .await;
    let store = redis.store().await?;

    assert!(matches!(
        store.get("bad").await,
        Err(StoreErr::RedisParseErr(RedisParseErr::InvalidLineStart(_)))
    ));
    assert_eq!(redis.connections(), 1);
    assert_eq!(store.get("good").await?, Some(b"x".to_vec()));
    assert_eq!(redis.connections(), 2);
    Ok(())
}

#[tokio::test]
async fn abandoned_request_replaces_the_connection() -> Result<()> {
    let redis = FakeRedis::start(|cmd| match cmd.get(1).map(String::as_str) {
        Some("slow") => None,
        _ => resp(b"$1\r\nx\r\n"),
    })
    .await;
    let store = redis.store().await?;

    let abandoned = tokio::time::timeout(Duration::from_millis(20), store.get("slow")).await;
    assert!(abandoned.is_err());
    assert_eq!(store.get("good").await?, Some(b"x".to_vec()));
    assert_eq!(redis.connections(), 2);
    Ok(())
}

#[tokio::test]
async fn reply_split_across_reads_is_assembled() -> Result<()> {
    let redis = FakeRedis::start(|cmd| match cmd[0].as_str() {
        "SMEMBERS" => {
            let mut reply = b"*500\r\n".to_vec();
            for i in 0..500 {
                let member = format!("follower-{:04}", i);
                let bulk = format!("${}\r\n{}\r\n", member.len(), member);
                reply.extend_from_slice(bulk.as_bytes());
            }
            Some(reply)
        }
        _ => resp(b"-ERR unexpected\r\n"),
    })
    .await;
    let store = redis.store().await?;

    let members = store.smembers("followers:u1").await?;
    assert_eq!(members.len(), 500);
    assert_eq!(members[499], "follower-0499");
    Ok(())
}
