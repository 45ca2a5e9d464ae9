//! Bounded alarm messages

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Maximum message length in bytes
pub const MAX_MESSAGE_LEN: usize = 128;

/// What Intake does with a message longer than `MAX_MESSAGE_LEN`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessagePolicy {
    /// Refuse the whole request
    #[default]
    Reject,
    /// Cut the message at the last char boundary within the limit
    Truncate,
}

impl std::fmt::Display for MessagePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reject => write!(f, "reject"),
            Self::Truncate => write!(f, "truncate"),
        }
    }
}

impl std::str::FromStr for MessagePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reject" => Ok(Self::Reject),
            "truncate" => Ok(Self::Truncate),
            _ => Err(format!("Unknown message policy: {}", s)),
        }
    }
}

/// Alarm text, never longer than `MAX_MESSAGE_LEN` bytes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmMessage(String);

impl AlarmMessage {
    /// Build a message, applying `policy` when the text is over the limit
    pub fn new(text: impl Into<String>, policy: MessagePolicy) -> Result<Self, ValidationError> {
        let mut text = text.into();
        if text.len() <= MAX_MESSAGE_LEN {
            return Ok(Self(text));
        }

        match policy {
            MessagePolicy::Reject => Err(ValidationError::MessageTooLong {
                len: text.len(),
                max: MAX_MESSAGE_LEN,
            }),
            MessagePolicy::Truncate => {
                let mut end = MAX_MESSAGE_LEN;
                while !text.is_char_boundary(end) {
                    end -= 1;
                }
                text.truncate(end);
                Ok(Self(text))
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for AlarmMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_within_limit() {
        let msg = AlarmMessage::new("wake up", MessagePolicy::Reject).unwrap();
        assert_eq!(msg.as_str(), "wake up");

        let exact = "x".repeat(MAX_MESSAGE_LEN);
        let msg = AlarmMessage::new(exact.clone(), MessagePolicy::Reject).unwrap();
        assert_eq!(msg.len(), MAX_MESSAGE_LEN);
    }

    #[test]
    fn test_reject_policy() {
        let long = "x".repeat(MAX_MESSAGE_LEN + 1);
        assert_eq!(
            AlarmMessage::new(long, MessagePolicy::Reject),
            Err(ValidationError::MessageTooLong {
                len: MAX_MESSAGE_LEN + 1,
                max: MAX_MESSAGE_LEN
            })
        );
    }

    #[test]
    fn test_truncate_policy() {
        let long = "y".repeat(MAX_MESSAGE_LEN + 40);
        let msg = AlarmMessage::new(long, MessagePolicy::Truncate).unwrap();
        assert_eq!(msg.len(), MAX_MESSAGE_LEN);
        assert!(msg.as_str().chars().all(|c| c == 'y'));
    }

    #[test]
    fn test_truncate_respects_char_boundary() {
        // 'é' is two bytes, so an odd limit would split one
        let long = format!("a{}", "é".repeat(MAX_MESSAGE_LEN));
        let msg = AlarmMessage::new(long, MessagePolicy::Truncate).unwrap();
        assert!(msg.len() <= MAX_MESSAGE_LEN);
        assert!(msg.len() >= MAX_MESSAGE_LEN - 1);
        assert!(msg.as_str().starts_with('a'));
    }

    #[test]
    fn test_policy_parse_and_serde() {
        assert_eq!("TRUNCATE".parse::<MessagePolicy>().unwrap(), MessagePolicy::Truncate);
        assert!("drop".parse::<MessagePolicy>().is_err());

        let yaml = serde_yaml::to_string(&MessagePolicy::Truncate).unwrap();
        assert_eq!(yaml.trim(), "truncate");
    }
}
