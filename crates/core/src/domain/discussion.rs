use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A thread as returned by the discussion service. Built once per page view
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: String,
    pub title: String,
    pub body: String,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub author: Author,
    pub replies: Vec<Reply>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub id: String,
    pub body: String,
    pub author: Author,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub login: String,
    pub avatar_url: String,
}

impl Discussion {
    pub fn is_empty(&self) -> bool {
        self.comments.is_empty()
    }

    pub fn reply_count(&self) -> usize {
        self.comments.iter().map(|comment| comment.replies.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn author(login: &str) -> Author {
        Author {
            login: login.to_string(),
            avatar_url: format!("https://avatars.example/{login}"),
        }
    }

    fn sample() -> Discussion {
        Discussion {
            id: "D_1".to_string(),
            title: "/posts/hello".to_string(),
            body: "thread".to_string(),
            comments: vec![
                Comment {
                    id: "C_a".to_string(),
                    body: "first".to_string(),
                    created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap(),
                    author: author("alice"),
                    replies: vec![
                        Reply {
                            id: "R_x".to_string(),
                            body: "reply x".to_string(),
                            author: author("bob"),
                        },
                        Reply {
                            id: "R_y".to_string(),
                            body: "reply y".to_string(),
                            author: author("carol"),
                        },
                    ],
                },
                Comment {
                    id: "C_b".to_string(),
                    body: "second".to_string(),
                    created_at: Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap(),
                    author: author("dave"),
                    replies: Vec::new(),
                },
            ],
        }
    }

    #[test]
    fn serializes_with_service_field_names() {
        let value = serde_json::to_value(sample()).unwrap();
        let comment = &value["comments"][0];
        assert_eq!(comment["createdAt"], "2024-05-01T08:00:00Z");
        assert_eq!(comment["author"]["avatarUrl"], "https://avatars.example/alice");
    }

    #[test]
    fn reserialized_ids_keep_reply_order() {
        let discussion = sample();
        let json = serde_json::to_string(&discussion).unwrap();
        let decoded: Discussion = serde_json::from_str(&json).unwrap();
        let ids = |d: &Discussion| -> Vec<String> {
            d.comments
                .iter()
                .flat_map(|comment| {
                    std::iter::once(comment.id.clone())
                        .chain(comment.replies.iter().map(|reply| reply.id.clone()))
                })
                .collect()
        };
        assert_eq!(ids(&decoded), ids(&discussion));
        assert_eq!(decoded, discussion);
    }

    #[test]
    fn counts_replies_across_comments() {
        let discussion = sample();
        assert!(!discussion.is_empty());
        assert_eq!(discussion.reply_count(), 2);
    }
}
