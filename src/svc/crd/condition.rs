//! # Condition module
//!
//! This module provide helpers to manipulate the list of conditions carried by
//! the status of custom resources. Conditions are keyed by their type and the
//! transition time only moves when the status changes.

use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

use chrono::Utc;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{Condition, Time};

// -----------------------------------------------------------------------------
// Constants

pub const READY_CONDITION: &str = "Ready";

pub const PROVISIONED_REASON: &str = "DatabaseProvisioned";
pub const FAILED_TO_CREATE_DATABASE_REASON: &str = "FailedToCreateDatabase";

// -----------------------------------------------------------------------------
// Error enumeration

#[derive(thiserror::Error, PartialEq, Eq, Clone, Debug)]
pub enum Error {
    #[error("failed to parse '{0}', available options are 'True', 'False' or 'Unknown'")]
    Parse(String),
}

// -----------------------------------------------------------------------------
// Status enumeration

#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, Debug)]
pub enum Status {
    True,
    False,
    Unknown,
}

impl FromStr for Status {
    type Err = Error;

    #[cfg_attr(feature = "trace", tracing::instrument)]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "true" => Self::True,
            "false" => Self::False,
            "unknown" => Self::Unknown,
            _ => {
                return Err(Error::Parse(s.to_string()));
            }
        })
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::True => write!(f, "True"),
            Self::False => write!(f, "False"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

// -----------------------------------------------------------------------------
// Helper functions

#[cfg_attr(feature = "trace", tracing::instrument)]
/// create a new condition whose transition time is now
pub fn new(
    kind: &str,
    status: Status,
    reason: &str,
    message: &str,
    generation: Option<i64>,
) -> Condition {
    Condition {
        last_transition_time: Time(Utc::now()),
        message: message.to_string(),
        observed_generation: generation,
        reason: reason.to_string(),
        status: status.to_string(),
        type_: kind.to_string(),
    }
}

/// returns the condition of the given type, if any
pub fn find<'a>(conditions: &'a [Condition], kind: &str) -> Option<&'a Condition> {
    conditions.iter().find(|condition| condition.type_ == kind)
}

/// returns if the condition of the given type exists with the 'True' status
pub fn is_true(conditions: &[Condition], kind: &str) -> bool {
    find(conditions, kind)
        .and_then(|condition| Status::from_str(&condition.status).ok())
        .map(|status| status == Status::True)
        .unwrap_or(false)
}

/// insert or update the condition of the same type and returns if the list
/// changed. The transition time is only moved when the status changes.
pub fn set(conditions: &mut Vec<Condition>, condition: Condition) -> bool {
    let existing = match conditions
        .iter_mut()
        .find(|existing| existing.type_ == condition.type_)
    {
        Some(existing) => existing,
        None => {
            conditions.push(condition);
            return true;
        }
    };

    let mut changed = false;
    if existing.status != condition.status {
        existing.status = condition.status;
        existing.last_transition_time = condition.last_transition_time;
        changed = true;
    }

    if existing.reason != condition.reason {
        existing.reason = condition.reason;
        changed = true;
    }

    if existing.message != condition.message {
        existing.message = condition.message;
        changed = true;
    }

    if existing.observed_generation != condition.observed_generation {
        existing.observed_generation = condition.observed_generation;
        changed = true;
    }

    changed
}

/// remove the condition of the given type and returns if it was present
pub fn remove(conditions: &mut Vec<Condition>, kind: &str) -> bool {
    let len = conditions.len();

    conditions.retain(|condition| condition.type_ != kind);
    len != conditions.len()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;

    fn at(secs: i64) -> Time {
        Time(Utc.timestamp_opt(secs, 0).unwrap())
    }

    fn ready(status: Status, secs: i64) -> Condition {
        let mut condition = new(READY_CONDITION, status, PROVISIONED_REASON, "", Some(1));
        condition.last_transition_time = at(secs);
        condition
    }

    #[test]
    fn set_appends_unknown_type() {
        let mut conditions = vec![];

        assert!(set(&mut conditions, ready(Status::True, 10)));
        assert_eq!(conditions.len(), 1);
        assert!(is_true(&conditions, READY_CONDITION));
    }

    #[test]
    fn set_keeps_transition_time_when_status_is_unchanged() {
        let mut conditions = vec![ready(Status::True, 10)];
        let mut update = ready(Status::True, 20);
        update.message = "still there".to_string();

        assert!(set(&mut conditions, update));
        assert_eq!(conditions[0].last_transition_time, at(10));
        assert_eq!(conditions[0].message, "still there");
    }

    #[test]
    fn set_moves_transition_time_when_status_changes() {
        let mut conditions = vec![ready(Status::True, 10)];

        assert!(set(&mut conditions, ready(Status::False, 20)));
        assert_eq!(conditions.len(), 1);
        assert_eq!(conditions[0].last_transition_time, at(20));
        assert!(!is_true(&conditions, READY_CONDITION));
    }

    #[test]
    fn set_reports_no_change_for_identical_condition() {
        let mut conditions = vec![ready(Status::True, 10)];

        assert!(!set(&mut conditions, ready(Status::True, 30)));
    }

    #[test]
    fn remove_condition() {
        let mut conditions = vec![ready(Status::True, 10)];

        assert!(remove(&mut conditions, READY_CONDITION));
        assert!(!remove(&mut conditions, READY_CONDITION));
        assert!(find(&conditions, READY_CONDITION).is_none());
    }

    #[test]
    fn parse_status() {
        assert_eq!("true".parse::<Status>(), Ok(Status::True));
        assert_eq!("Unknown".parse::<Status>(), Ok(Status::Unknown));
        assert_eq!(
            "maybe".parse::<Status>(),
            Err(Error::Parse("maybe".to_string()))
        );
    }
}
