use discrail_core::types::discussion_number::DiscussionNumber;

/// Upper bound for both the comment and the reply connections. No cursor is
/// kept, so anything past the first page is not shown.
pub const PAGE_SIZE: u32 = 50;

/// Builds the read document for one repository. The only per-call input is a
/// validated [`DiscussionNumber`]; owner and name are fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscussionQuery {
    owner: String,
    name: String,
}

impl DiscussionQuery {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn build(&self, number: DiscussionNumber) -> String {
        format!(
            r#"query {{
  repository(owner: {owner}, name: {name}) {{
    discussion(number: {number}) {{
      id
      title
      body
      comments(first: {PAGE_SIZE}) {{
        nodes {{
          id
          body
          createdAt
          author {{ login avatarUrl }}
          replies(first: {PAGE_SIZE}) {{
            nodes {{
              id
              body
              author {{ login avatarUrl }}
            }}
          }}
        }}
      }}
    }}
  }}
}}"#,
            owner = string_literal(&self.owner),
            name = string_literal(&self.name),
        )
    }
}

// JSON string syntax is a subset of GraphQL string syntax.
fn string_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
