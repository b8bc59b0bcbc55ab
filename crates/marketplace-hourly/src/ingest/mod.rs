mod normalizer;
mod parser;

use crate::domain::{ChatSession, Dataset, MarketingRecord, WorktimeRecord};
use crate::pipeline::PipelineInputs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::info;

pub const MARKETING_FILE: &str = "marketing_data.csv";
pub const CHAT_SESSIONS_FILE: &str = "chat_sessions.csv";
pub const WORKTIME_FILE: &str = "worktime_schedule_data.csv";

#[derive(Debug)]
pub enum IngestError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Csv {
        dataset: Dataset,
        source: csv::Error,
    },
    MalformedField {
        dataset: Dataset,
        row: usize,
        column: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl std::fmt::Display for IngestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            IngestError::Csv { dataset, source } => {
                write!(f, "invalid {} CSV data: {}", dataset, source)
            }
            IngestError::MalformedField {
                dataset,
                row,
                column,
                value,
                expected,
            } => write!(
                f,
                "{} row {}: column '{}' value '{}' is not a valid {}",
                dataset, row, column, value, expected
            ),
        }
    }
}

impl std::error::Error for IngestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            IngestError::Io { source, .. } => Some(source),
            IngestError::Csv { source, .. } => Some(source),
            IngestError::MalformedField { .. } => None,
        }
    }
}

/// Reads a marketing export. Header names are normalized and currency cells
/// are stripped of `$` and `,` before parsing.
pub fn marketing_from_reader<R: Read>(reader: R) -> Result<Vec<MarketingRecord>, IngestError> {
    parser::parse_marketing(reader)
}

pub fn chat_sessions_from_reader<R: Read>(reader: R) -> Result<Vec<ChatSession>, IngestError> {
    parser::parse_chat_sessions(reader)
}

pub fn worktime_from_reader<R: Read>(reader: R) -> Result<Vec<WorktimeRecord>, IngestError> {
    parser::parse_worktime(reader)
}

/// Locations of the three input logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFiles {
    pub marketing: PathBuf,
    pub chat_sessions: PathBuf,
    pub worktime: PathBuf,
}

impl InputFiles {
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        let dir = dir.as_ref();
        Self {
            marketing: dir.join(MARKETING_FILE),
            chat_sessions: dir.join(CHAT_SESSIONS_FILE),
            worktime: dir.join(WORKTIME_FILE),
        }
    }

    /// Loads all three logs fully into memory.
    pub fn load(&self) -> Result<PipelineInputs, IngestError> {
        info!(path = %self.marketing.display(), "loading marketing data");
        let marketing = marketing_from_reader(open(&self.marketing)?)?;

        info!(
            chat_sessions = %self.chat_sessions.display(),
            worktime = %self.worktime.display(),
            "loading chat sessions and worktime schedule data"
        );
        let chat_sessions = chat_sessions_from_reader(open(&self.chat_sessions)?)?;
        let worktime = worktime_from_reader(open(&self.worktime)?)?;

        info!(
            marketing = marketing.len(),
            chat_sessions = chat_sessions.len(),
            worktime = worktime.len(),
            "input logs loaded"
        );

        Ok(PipelineInputs {
            marketing,
            chat_sessions,
            worktime,
        })
    }
}

fn open(path: &Path) -> Result<std::fs::File, IngestError> {
    std::fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::io::Cursor;

    #[test]
    fn marketing_headers_and_currency_are_normalized() {
        let csv = "Week, Expected Spend ,Fact Spend\n\
2024-01-01,\"$1,200.00\",\"$1,150.50\"\n\
2024-01-08,$900,\n";
        let records = marketing_from_reader(Cursor::new(csv)).expect("marketing parses");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].week, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(records[0].expected_spend, Some(1200.0));
        assert_eq!(records[0].fact_spend, Some(1150.5));
        assert!(records[0].is_actualized());
        assert_eq!(records[1].expected_spend, Some(900.0));
        assert_eq!(records[1].fact_spend, None);
        assert!(!records[1].is_actualized());
    }

    #[test]
    fn malformed_currency_reports_row_and_column() {
        let csv = "Week,Expected Spend,Fact Spend\n2024-01-01,$10,$5\n2024-01-08,$10,tbd\n";
        let error = marketing_from_reader(Cursor::new(csv)).expect_err("currency rejected");

        match error {
            IngestError::MalformedField {
                dataset,
                row,
                column,
                value,
                ..
            } => {
                assert_eq!(dataset, Dataset::Marketing);
                assert_eq!(row, 2);
                assert_eq!(column, "fact_spend");
                assert_eq!(value, "tbd");
            }
            other => panic!("expected malformed field, got {other:?}"),
        }
    }

    #[test]
    fn chat_sessions_parse_timestamps_and_ignore_extra_columns() {
        let csv = "session_id,user_id,expert_id,event_time,user_first_chat,session_duration,channel\n\
s1,u1,e1,2024-01-01 09:15:00,2023-12-31 08:00:00,12.5,web\n";
        let sessions = chat_sessions_from_reader(Cursor::new(csv)).expect("sessions parse");

        assert_eq!(sessions.len(), 1);
        let session = &sessions[0];
        assert_eq!(session.identity(), ("s1", "u1", "e1"));
        assert_eq!(
            session.event_time,
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap()
        );
        assert_eq!(session.session_duration, 12.5);
    }

    #[test]
    fn malformed_timestamp_is_fatal() {
        let csv = "session_id,user_id,expert_id,event_time,user_first_chat,session_duration\n\
s1,u1,e1,soon,2023-12-31 08:00:00,12.5\n";
        let error = chat_sessions_from_reader(Cursor::new(csv)).expect_err("timestamp rejected");

        assert!(matches!(
            error,
            IngestError::MalformedField {
                column: "event_time",
                row: 1,
                ..
            }
        ));
    }

    #[test]
    fn worktime_accepts_export_specialist_column() {
        let csv = "specialist_astrocrm_user_id,event_time,scheduled_duration,online_worktime_duration,busy_worktime_duration,force_busy_duration\n\
x1,2024-01-01T09:00:00,60,40,15,5\n";
        let records = worktime_from_reader(Cursor::new(csv)).expect("worktime parses");

        assert_eq!(records[0].specialist_id, "x1");
        assert_eq!(records[0].online_worktime_duration, 40.0);
        assert_eq!(records[0].force_busy_duration, 5.0);
    }

    const WORKTIME_HEADER: &str = "specialist_id,event_time,scheduled_duration,online_worktime_duration,busy_worktime_duration,force_busy_duration\n";
    const SESSION_HEADER: &str =
        "session_id,user_id,expert_id,event_time,user_first_chat,session_duration\n";

    fn worktime_error(row: &str) -> IngestError {
        let csv = format!("{WORKTIME_HEADER}x1,2024-01-01T09:00:00,60,40,15,5\n{row}\n");
        worktime_from_reader(Cursor::new(csv)).expect_err("duration rejected")
    }

    fn assert_malformed(error: IngestError, expected_column: &str, expected_value: &str) {
        match error {
            IngestError::MalformedField {
                row, column, value, ..
            } => {
                assert_eq!(row, 2);
                assert_eq!(column, expected_column);
                assert_eq!(value, expected_value);
            }
            other => panic!("expected malformed field, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_duration_is_malformed() {
        let error = worktime_error("x2,2024-01-01T09:00:00,sixty,40,15,5");
        assert_malformed(error, "scheduled_duration", "sixty");
    }

    #[test]
    fn blank_duration_is_malformed() {
        let error = worktime_error("x2,2024-01-01T09:00:00,60,40,,5");
        assert!(error.to_string().contains("cell is blank"));
        assert_malformed(error, "busy_worktime_duration", "");
    }

    #[test]
    fn infinite_duration_is_malformed() {
        let error = worktime_error("x2,2024-01-01T09:00:00,60,inf,15,5");
        assert!(error.to_string().contains("finite number of minutes"));
        assert_malformed(error, "online_worktime_duration", "inf");
    }

    #[test]
    fn nan_session_duration_is_malformed() {
        let csv = format!(
            "{SESSION_HEADER}s1,u1,e1,2024-01-01 09:00:00,2024-01-01 08:00:00,10\n\
s2,u2,e1,2024-01-01 09:10:00,2024-01-01 08:00:00,NaN\n"
        );
        let error = chat_sessions_from_reader(Cursor::new(csv)).expect_err("NaN rejected");

        assert!(matches!(
            &error,
            IngestError::MalformedField {
                dataset: Dataset::ChatSessions,
                ..
            }
        ));
        assert_malformed(error, "session_duration", "NaN");
    }

    #[test]
    fn nan_spend_is_malformed() {
        let csv = "Week,Expected Spend,Fact Spend\n2024-01-01,$10,$5\n2024-01-08,$NaN,\n";
        let error = marketing_from_reader(Cursor::new(csv)).expect_err("NaN spend rejected");
        assert_malformed(error, "expected_spend", "$NaN");
    }

    #[test]
    fn missing_file_propagates_io_error_with_path() {
        let files = InputFiles::in_dir("./does-not-exist");
        let error = files.load().expect_err("expected io error");

        match error {
            IngestError::Io { path, .. } => assert!(path.ends_with(MARKETING_FILE)),
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
