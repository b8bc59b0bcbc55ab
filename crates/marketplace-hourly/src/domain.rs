use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::fmt;

/// One week of marketing spend. A missing `fact_spend` marks a week whose
/// spend has not been actualized yet.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketingRecord {
    pub week: NaiveDate,
    pub expected_spend: Option<f64>,
    pub fact_spend: Option<f64>,
}

impl MarketingRecord {
    pub fn is_actualized(&self) -> bool {
        self.fact_spend.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    pub session_id: String,
    pub user_id: String,
    pub expert_id: String,
    pub event_time: NaiveDateTime,
    pub user_first_chat: NaiveDateTime,
    /// Minutes.
    pub session_duration: f64,
}

impl ChatSession {
    /// Identity used for deduplication.
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.session_id, &self.user_id, &self.expert_id)
    }
}

/// One specialist worktime interval. All durations are minutes.
#[derive(Debug, Clone, PartialEq)]
pub struct WorktimeRecord {
    pub specialist_id: String,
    pub event_time: NaiveDateTime,
    pub scheduled_duration: f64,
    pub online_worktime_duration: f64,
    pub busy_worktime_duration: f64,
    pub force_busy_duration: f64,
}

/// First week without actual marketing spend. Everything strictly before it
/// is historical, everything at or after it is predictive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Cutoff(NaiveDate);

impl Cutoff {
    pub fn new(week: NaiveDate) -> Self {
        Self(week)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// Midnight at the start of the cutoff date.
    pub fn instant(&self) -> NaiveDateTime {
        self.0.and_time(NaiveTime::MIN)
    }
}

impl fmt::Display for Cutoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d"))
    }
}

/// Which of the three input logs a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Marketing,
    ChatSessions,
    Worktime,
}

impl Dataset {
    pub fn label(&self) -> &'static str {
        match self {
            Dataset::Marketing => "marketing",
            Dataset::ChatSessions => "chat sessions",
            Dataset::Worktime => "worktime",
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
