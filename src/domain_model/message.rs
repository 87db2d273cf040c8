use crate::domain_model::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key assigned by the store on insert.
#[derive(Debug, Clone, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl MessageId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stored shape of a message, without its key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub text: String,
    pub uid: UserId,
    pub email: Email,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl MessageRecord {
    pub fn compose(session: &Session, text: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            text: text.to_owned(),
            uid: session.user_id.clone(),
            email: session.email.clone(),
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub author: UserId,
    pub author_email: Email,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn from_record(id: MessageId, record: MessageRecord) -> Self {
        Self {
            id,
            text: record.text,
            author: record.uid,
            author_email: record.email,
            timestamp: record.timestamp,
        }
    }

    pub fn is_authored_by(&self, user_id: &UserId) -> bool {
        self.author == *user_id
    }
}
