//! Work files
//!
//! A work file is the JSON form of one unit of work: the hex header, a
//! target given either directly or as a share difficulty, and the block
//! time that salts every attempt.
//!
//! ```json
//! {
//!   "header": "<160 or 256 hex chars>",
//!   "target": "<64 hex chars, little-endian words>",
//!   "timestamp": 1700000000
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use xhash_core::{HeaderWords, TargetWords, WorkItem, XhashError};

#[derive(Error, Debug)]
pub enum WorkError {
    #[error("File I/O error: {0}")]
    FileError(#[from] std::io::Error),

    #[error("Invalid work file: {0}")]
    InvalidFormat(#[from] serde_json::Error),

    #[error("Invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error(transparent)]
    InvalidWork(#[from] XhashError),

    #[error("Work needs either a target or a difficulty")]
    MissingTarget,
}

/// Work as read from disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkTemplate {
    /// Hex of the 80-byte header or the full 128-byte buffer
    pub header: String,
    /// Hex of the 32-byte target
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Share difficulty, used when `target` is absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<f64>,
    /// Block time in seconds
    pub timestamp: u64,
}

impl WorkTemplate {
    pub fn load(path: &Path) -> Result<Self, WorkError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, WorkError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn header(&self) -> Result<HeaderWords, WorkError> {
        let bytes = hex::decode(self.header.trim())?;
        Ok(HeaderWords::from_bytes(&bytes)?)
    }

    /// The explicit target if present, else the target for `difficulty`
    pub fn target(&self) -> Result<TargetWords, WorkError> {
        match (&self.target, self.difficulty) {
            (Some(target), _) => {
                let bytes = hex::decode(target.trim())?;
                Ok(TargetWords::from_bytes(&bytes)?)
            }
            (None, Some(difficulty)) => Ok(TargetWords::from_difficulty(difficulty)),
            (None, None) => Err(WorkError::MissingTarget),
        }
    }

    /// Decode into the buffers the scanner works on
    pub fn to_work_item(&self) -> Result<WorkItem, WorkError> {
        Ok(WorkItem::new(self.header()?, self.target()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_hex() -> String {
        hex::encode([0x11u8; 80])
    }

    #[test]
    fn test_explicit_target() {
        let mut target = [0u8; 32];
        target[28..].copy_from_slice(&0x0000_ffffu32.to_le_bytes());

        let json = format!(
            r#"{{"header": "{}", "target": "{}", "timestamp": 1700000000}}"#,
            header_hex(),
            hex::encode(target)
        );
        let template = WorkTemplate::from_json(&json).unwrap();
        let work = template.to_work_item().unwrap();

        assert_eq!(template.timestamp, 1_700_000_000);
        assert_eq!(work.target.msw(), 0xffff);
        assert_eq!(work.header.words()[0], 0x11111111);
        assert_eq!(work.header.words()[20], 0);
    }

    #[test]
    fn test_difficulty_target() {
        let json = format!(
            r#"{{"header": "{}", "difficulty": 1.0, "timestamp": 5}}"#,
            header_hex()
        );
        let work = WorkTemplate::from_json(&json)
            .unwrap()
            .to_work_item()
            .unwrap();

        assert_eq!(work.target, TargetWords::from_difficulty(1.0));
    }

    #[test]
    fn test_target_takes_precedence_over_difficulty() {
        let template = WorkTemplate {
            header: header_hex(),
            target: Some(hex::encode([0xffu8; 32])),
            difficulty: Some(1000.0),
            timestamp: 0,
        };
        assert_eq!(template.target().unwrap(), TargetWords::MAX);
    }

    #[test]
    fn test_missing_target() {
        let template = WorkTemplate {
            header: header_hex(),
            target: None,
            difficulty: None,
            timestamp: 0,
        };
        assert!(matches!(
            template.to_work_item(),
            Err(WorkError::MissingTarget)
        ));
    }

    #[test]
    fn test_bad_lengths_and_hex() {
        let short = WorkTemplate {
            header: hex::encode([0u8; 79]),
            target: None,
            difficulty: Some(1.0),
            timestamp: 0,
        };
        assert!(matches!(
            short.to_work_item(),
            Err(WorkError::InvalidWork(XhashError::HeaderBytes(79)))
        ));

        let not_hex = WorkTemplate {
            header: "zz".to_string(),
            ..short
        };
        assert!(matches!(
            not_hex.to_work_item(),
            Err(WorkError::InvalidHex(_))
        ));
    }
}
