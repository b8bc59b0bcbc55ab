use super::normalizer::{
    normalize_header, parse_currency, parse_date, parse_number, parse_timestamp, NumberError,
};
use super::IngestError;
use crate::domain::{ChatSession, Dataset, MarketingRecord, WorktimeRecord};
use chrono::{NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::io::Read;

pub(crate) fn parse_marketing<R: Read>(reader: R) -> Result<Vec<MarketingRecord>, IngestError> {
    parse_rows::<R, MarketingRow, _>(reader, Dataset::Marketing, MarketingRow::into_record)
}

pub(crate) fn parse_chat_sessions<R: Read>(reader: R) -> Result<Vec<ChatSession>, IngestError> {
    parse_rows::<R, ChatSessionRow, _>(reader, Dataset::ChatSessions, ChatSessionRow::into_record)
}

pub(crate) fn parse_worktime<R: Read>(reader: R) -> Result<Vec<WorktimeRecord>, IngestError> {
    parse_rows::<R, WorktimeRow, _>(reader, Dataset::Worktime, WorktimeRow::into_record)
}

fn parse_rows<R, Row, T>(
    reader: R,
    dataset: Dataset,
    convert: fn(Row, &RowContext) -> Result<T, IngestError>,
) -> Result<Vec<T>, IngestError>
where
    R: Read,
    Row: DeserializeOwned,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers: csv::StringRecord = csv_reader
        .headers()
        .map_err(|source| IngestError::Csv { dataset, source })?
        .iter()
        .map(normalize_header)
        .collect();
    csv_reader.set_headers(headers);

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<Row>().enumerate() {
        let row = row.map_err(|source| IngestError::Csv { dataset, source })?;
        let context = RowContext {
            dataset,
            row: index + 1,
        };
        records.push(convert(row, &context)?);
    }

    Ok(records)
}

struct RowContext {
    dataset: Dataset,
    row: usize,
}

impl RowContext {
    fn malformed(&self, column: &'static str, value: &str, expected: &'static str) -> IngestError {
        IngestError::MalformedField {
            dataset: self.dataset,
            row: self.row,
            column,
            value: value.to_string(),
            expected,
        }
    }

    fn date(&self, column: &'static str, value: &str) -> Result<NaiveDate, IngestError> {
        parse_date(value).ok_or_else(|| self.malformed(column, value, "date"))
    }

    fn timestamp(&self, column: &'static str, value: &str) -> Result<NaiveDateTime, IngestError> {
        parse_timestamp(value).ok_or_else(|| self.malformed(column, value, "timestamp"))
    }

    fn currency(&self, column: &'static str, value: &str) -> Result<Option<f64>, IngestError> {
        parse_currency(value).map_err(|err| {
            let expected = match err {
                NumberError::NonFinite => "finite currency amount",
                NumberError::Blank | NumberError::Invalid => "currency amount",
            };
            self.malformed(column, value, expected)
        })
    }

    /// Blank, non-numeric and non-finite durations all abort the load.
    fn minutes(&self, column: &'static str, value: &str) -> Result<f64, IngestError> {
        parse_number(value).map_err(|err| {
            let expected = match err {
                NumberError::Blank => "number of minutes (cell is blank)",
                NumberError::Invalid => "number of minutes",
                NumberError::NonFinite => "finite number of minutes",
            };
            self.malformed(column, value, expected)
        })
    }
}

#[derive(Debug, Deserialize)]
struct MarketingRow {
    week: String,
    #[serde(default)]
    expected_spend: String,
    #[serde(default)]
    fact_spend: String,
}

impl MarketingRow {
    fn into_record(self, context: &RowContext) -> Result<MarketingRecord, IngestError> {
        Ok(MarketingRecord {
            week: context.date("week", &self.week)?,
            expected_spend: context.currency("expected_spend", &self.expected_spend)?,
            fact_spend: context.currency("fact_spend", &self.fact_spend)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatSessionRow {
    session_id: String,
    user_id: String,
    expert_id: String,
    event_time: String,
    user_first_chat: String,
    session_duration: String,
}

impl ChatSessionRow {
    fn into_record(self, context: &RowContext) -> Result<ChatSession, IngestError> {
        Ok(ChatSession {
            event_time: context.timestamp("event_time", &self.event_time)?,
            user_first_chat: context.timestamp("user_first_chat", &self.user_first_chat)?,
            session_id: self.session_id,
            user_id: self.user_id,
            expert_id: self.expert_id,
            session_duration: context.minutes("session_duration", &self.session_duration)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct WorktimeRow {
    #[serde(alias = "specialist_astrocrm_user_id")]
    specialist_id: String,
    event_time: String,
    scheduled_duration: String,
    online_worktime_duration: String,
    busy_worktime_duration: String,
    force_busy_duration: String,
}

impl WorktimeRow {
    fn into_record(self, context: &RowContext) -> Result<WorktimeRecord, IngestError> {
        Ok(WorktimeRecord {
            event_time: context.timestamp("event_time", &self.event_time)?,
            specialist_id: self.specialist_id,
            scheduled_duration: context.minutes("scheduled_duration", &self.scheduled_duration)?,
            online_worktime_duration: context
                .minutes("online_worktime_duration", &self.online_worktime_duration)?,
            busy_worktime_duration: context
                .minutes("busy_worktime_duration", &self.busy_worktime_duration)?,
            force_busy_duration: context.minutes("force_busy_duration", &self.force_busy_duration)?,
        })
    }
}
