use std::fmt;

use crate::error::CoreError;

/// Repository-scoped discussion number. Only values of this type are ever
/// interpolated into a query document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiscussionNumber(u32);

impl DiscussionNumber {
    pub fn new(value: u32) -> Result<Self, CoreError> {
        if value == 0 {
            return Err(CoreError::InvalidDiscussionNumber(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl TryFrom<&str> for DiscussionNumber {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() || !trimmed.chars().all(|ch| ch.is_ascii_digit()) {
            return Err(CoreError::InvalidDiscussionNumber(trimmed.to_string()));
        }
        let parsed = trimmed
            .parse::<u32>()
            .map_err(|_| CoreError::InvalidDiscussionNumber(trimmed.to_string()))?;
        Self::new(parsed)
    }
}

impl fmt::Display for DiscussionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_digits() {
        let number = DiscussionNumber::try_from(" 42 ").unwrap();
        assert_eq!(number.get(), 42);
        assert_eq!(number.to_string(), "42");
    }

    #[test]
    fn rejects_anything_but_digits() {
        assert!(DiscussionNumber::try_from("").is_err());
        assert!(DiscussionNumber::try_from("-1").is_err());
        assert!(DiscussionNumber::try_from("+7").is_err());
        assert!(DiscussionNumber::try_from("1) { id } #").is_err());
        assert!(DiscussionNumber::try_from("99999999999").is_err());
    }

    #[test]
    fn rejects_zero() {
        assert!(DiscussionNumber::try_from("0").is_err());
        assert!(DiscussionNumber::new(0).is_err());
    }
}
