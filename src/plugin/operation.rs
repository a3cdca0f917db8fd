// src/plugin/operation.rs

use std::fmt;
use std::str::FromStr;

/// Named operations a plugin may expose, selected by the task's `function`
/// key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Default,
    Resolve,
    Restore,
    Jenkins,
}

impl Operation {
    pub const ALL: &'static [Operation] = &[
        Operation::Default,
        Operation::Resolve,
        Operation::Restore,
        Operation::Jenkins,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Default => "default",
            Operation::Resolve => "resolve",
            Operation::Restore => "restore",
            Operation::Jenkins => "jenkins",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Operation::Default),
            "resolve" => Ok(Operation::Resolve),
            "restore" => Ok(Operation::Restore),
            "jenkins" => Ok(Operation::Jenkins),
            other => Err(other.to_string()),
        }
    }
}
