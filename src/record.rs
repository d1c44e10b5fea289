//! The compact records cached in the store, and the timeline entry assembled from them.
//!
//! Records are JSON with the camelCase field names the tweet and user services write.  A
//! field missing from a record decodes as its zero value.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct Tweet {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub likes: i64,
    pub shares: i64,
    pub comments: i64,
}

/// The cached projection of a user: display fields only.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct User {
    pub id: String,
    pub name: String,
    pub nickname: String,
    pub avatar: String,
}

/// A tweet joined with its author's display fields, as served to readers.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub id: String,
    pub content: String,
    pub likes: i64,
    pub shares: i64,
    pub comments: i64,
    pub user_id: String,
    pub name: String,
    pub nickname: String,
    pub avatar: String,
}

impl TimelineEntry {
    pub fn new(tweet: Tweet, author: &User) -> Self {
        Self {
            id: tweet.id,
            content: tweet.content,
            likes: tweet.likes,
            shares: tweet.shares,
            comments: tweet.comments,
            user_id: tweet.user_id,
            name: author.name.clone(),
            nickname: author.nickname.clone(),
            avatar: author.avatar.clone(),
        }
    }
}

/// A stored value that does not decode as the record its key promises.
#[derive(Debug)]
pub struct CorruptRecord {
    pub key: String,
    pub inner: serde_json::Error,
}

impl std::error::Error for CorruptRecord {}

impl fmt::Display for CorruptRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "The record at `{}` is corrupt: {}", self.key, self.inner)
    }
}

/// Decode the value stored at `key`.  Bytes that are not UTF-8 are as corrupt as bad JSON.
pub fn decode<T: DeserializeOwned>(key: &str, raw: &[u8]) -> Result<T, CorruptRecord> {
    serde_json::from_slice(raw).map_err(|inner| CorruptRecord {
        key: key.to_string(),
        inner,
    })
}

pub fn encode<T: Serialize>(record: &T) -> serde_json::Result<String> {
    serde_json::to_string(record)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tweet_uses_camel_case() -> Result<(), CorruptRecord> {
        let tweet: Tweet = decode(
            "tweets:7",
            br#"{"id":"7","userId":"u1","content":"hi","likes":3,"shares":1,"comments":0}"#,
        )?;
        assert_eq!(tweet.user_id, "u1");
        assert_eq!(tweet.likes, 3);
        assert!(encode(&tweet)
            .expect("tweet serializes")
            .contains(r#""userId":"u1""#));
        Ok(())
    }

    #[test]
    fn missing_fields_are_zero() -> Result<(), CorruptRecord> {
        let tweet: Tweet = decode("tweets:7", br#"{"userId":"u1"}"#)?;
        assert_eq!(
            tweet,
            Tweet {
                user_id: "u1".to_string(),
                ..Tweet::default()
            }
        );
        let user: User = decode("users:u1", b"{}")?;
        assert_eq!(user, User::default());
        Ok(())
    }

    #[test]
    fn corrupt_record_names_its_key() {
        let err = decode::<User>("users:u1", b"not json").unwrap_err();
        assert_eq!(err.key, "users:u1");
        assert!(err.to_string().contains("users:u1"));
        assert!(decode::<Tweet>("tweets:1", br#"{"likes":"many"}"#).is_err());
    }

    #[test]
    fn non_utf8_is_corrupt() {
        let err = decode::<Tweet>("tweets:t1", b"\xff\xfe").unwrap_err();
        assert_eq!(err.key, "tweets:t1");

        let err = decode::<Tweet>("tweets:t2", b"{\"content\":\"\xff\"}").unwrap_err();
        assert_eq!(err.key, "tweets:t2");
    }

    #[test]
    fn entry_serializes_every_field() {
        let tweet = Tweet {
            id: "t1".to_string(),
            user_id: "u1".to_string(),
            content: "hello".to_string(),
            likes: 2,
            shares: 0,
            comments: 1,
        };
        let author = User {
            id: "u1".to_string(),
            name: "Ada".to_string(),
            nickname: "ada".to_string(),
            avatar: "https://img/ada.png".to_string(),
        };
        let json = serde_json::to_value(TimelineEntry::new(tweet, &author))
            .expect("entry serializes");
        assert_eq!(
            json,
            serde_json::json!({
                "id": "t1",
                "content": "hello",
                "likes": 2,
                "shares": 0,
                "comments": 1,
                "userId": "u1",
                "name": "Ada",
                "nickname": "ada",
                "avatar": "https://img/ada.png",
            })
        );
    }
}
