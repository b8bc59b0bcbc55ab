use super::hour::floor_to_hour;
use crate::domain::ChatSession;
use chrono::{Duration, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Sessions starting less than this long after the user's first chat count
/// as new-user sessions.
pub const NEW_USER_WINDOW_SECS: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    NewUser,
    ReturningUser,
}

impl SessionKind {
    pub fn classify(session: &ChatSession) -> Self {
        let since_first_chat = session.event_time - session.user_first_chat;
        if since_first_chat < Duration::seconds(NEW_USER_WINDOW_SECS) {
            SessionKind::NewUser
        } else {
            SessionKind::ReturningUser
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandMetrics {
    pub active_users: usize,
    pub new_user_sessions: usize,
    pub returning_user_sessions: usize,
    pub chat_sessions: usize,
    pub total_session_minutes: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyDemand {
    pub hour: NaiveDateTime,
    pub metrics: DemandMetrics,
}

/// Keeps the first session seen for each `(session_id, user_id, expert_id)`.
pub fn dedup_sessions(sessions: Vec<ChatSession>) -> Vec<ChatSession> {
    let mut seen: HashSet<(String, String, String)> = HashSet::with_capacity(sessions.len());
    sessions
        .into_iter()
        .filter(|session| {
            seen.insert((
                session.session_id.clone(),
                session.user_id.clone(),
                session.expert_id.clone(),
            ))
        })
        .collect()
}

#[derive(Default)]
struct DemandAccumulator<'a> {
    users: HashSet<&'a str>,
    new_user_sessions: usize,
    returning_user_sessions: usize,
    chat_sessions: usize,
    total_session_minutes: f64,
}

impl<'a> DemandAccumulator<'a> {
    fn add(&mut self, session: &'a ChatSession) {
        self.users.insert(&session.user_id);
        self.chat_sessions += 1;
        self.total_session_minutes += session.session_duration;
        match SessionKind::classify(session) {
            SessionKind::NewUser => self.new_user_sessions += 1,
            SessionKind::ReturningUser => self.returning_user_sessions += 1,
        }
    }

    fn finish(self) -> DemandMetrics {
        DemandMetrics {
            active_users: self.users.len(),
            new_user_sessions: self.new_user_sessions,
            returning_user_sessions: self.returning_user_sessions,
            chat_sessions: self.chat_sessions,
            total_session_minutes: self.total_session_minutes,
        }
    }
}

/// One entry per hour that has at least one session, ascending by hour.
pub fn aggregate_demand(sessions: &[ChatSession]) -> Vec<HourlyDemand> {
    let mut buckets: BTreeMap<NaiveDateTime, DemandAccumulator<'_>> = BTreeMap::new();
    for session in sessions {
        buckets
            .entry(floor_to_hour(session.event_time))
            .or_default()
            .add(session);
    }

    buckets
        .into_iter()
        .map(|(hour, bucket)| HourlyDemand {
            hour,
            metrics: bucket.finish(),
        })
        .collect()
}
