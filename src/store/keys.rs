/// The key layout shared with the tweet and user services.
///
/// | key                  | type   | holds                                  |
/// |----------------------|--------|----------------------------------------|
/// | `tweets:{id}`        | string | JSON tweet record                      |
/// | `users:{id}`         | string | JSON user record                       |
/// | `followers:{id}`     | set    | ids of the users following `id`        |
/// | `timeline:{id}`      | list   | tweet ids for `id`'s home, newest first |
/// | `tweet_queue`        | list   | tweet ids waiting for fan-out          |
/// | `processed_tweets`   | set    | tweet ids admitted for fan-out         |
///
/// With a namespace, every key is prefixed with `{namespace}:`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keys {
    namespace: Option<String>,
}

impl Keys {
    const QUEUE: &'static str = "tweet_queue";
    const PROCESSED: &'static str = "processed_tweets";

    pub fn new(namespace: Option<String>) -> Self {
        Self { namespace }
    }

    pub fn tweet(&self, id: &str) -> String {
        self.namespaced(&["tweets:", id].concat())
    }

    pub fn user(&self, id: &str) -> String {
        self.namespaced(&["users:", id].concat())
    }

    pub fn followers(&self, id: &str) -> String {
        self.namespaced(&["followers:", id].concat())
    }

    pub fn timeline(&self, id: &str) -> String {
        self.namespaced(&["timeline:", id].concat())
    }

    pub fn queue(&self) -> String {
        self.namespaced(Self::QUEUE)
    }

    pub fn processed(&self) -> String {
        self.namespaced(Self::PROCESSED)
    }

    fn namespaced(&self, key: &str) -> String {
        match &self.namespace {
            Some(ns) => [ns, ":", key].concat(),
            None => key.to_string(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn layout_without_namespace() {
        let keys = Keys::default();
        assert_eq!(keys.tweet("t1"), "tweets:t1");
        assert_eq!(keys.user("u1"), "users:u1");
        assert_eq!(keys.followers("u1"), "followers:u1");
        assert_eq!(keys.timeline("u1"), "timeline:u1");
        assert_eq!(keys.queue(), "tweet_queue");
        assert_eq!(keys.processed(), "processed_tweets");
    }

    #[test]
    fn layout_with_namespace() {
        let keys = Keys::new(Some("staging".to_string()));
        assert_eq!(keys.tweet("t1"), "staging:tweets:t1");
        assert_eq!(keys.timeline("u1"), "staging:timeline:u1");
        assert_eq!(keys.queue(), "staging:tweet_queue");
    }
}
