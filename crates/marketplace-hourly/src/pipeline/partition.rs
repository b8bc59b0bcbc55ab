use super::PipelineError;
use crate::domain::{ChatSession, Cutoff, Dataset, MarketingRecord, WorktimeRecord};
use chrono::{NaiveDateTime, NaiveTime};

/// Records that can be placed on either side of the cutoff.
pub trait Timestamped {
    fn timestamp(&self) -> NaiveDateTime;
}

impl Timestamped for MarketingRecord {
    fn timestamp(&self) -> NaiveDateTime {
        self.week.and_time(NaiveTime::MIN)
    }
}

impl Timestamped for ChatSession {
    fn timestamp(&self) -> NaiveDateTime {
        self.event_time
    }
}

impl Timestamped for WorktimeRecord {
    fn timestamp(&self) -> NaiveDateTime {
        self.event_time
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Partition<T> {
    /// Strictly before the cutoff.
    pub historical: Vec<T>,
    /// At or after the cutoff.
    pub predictive: Vec<T>,
}

impl<T: Timestamped> Partition<T> {
    pub fn split(records: Vec<T>, cutoff: Cutoff) -> Self {
        let boundary = cutoff.instant();
        let (historical, predictive) = records
            .into_iter()
            .partition(|record| record.timestamp() < boundary);
        Self {
            historical,
            predictive,
        }
    }

    /// Event logs cannot contain rows past the cutoff; any such row aborts
    /// the run.
    pub fn require_historical(
        self,
        dataset: Dataset,
        cutoff: Cutoff,
    ) -> Result<Vec<T>, PipelineError> {
        match self.predictive.iter().map(|record| record.timestamp()).min() {
            None => Ok(self.historical),
            Some(earliest) => Err(PipelineError::TemporalIntegrity {
                dataset,
                cutoff,
                rows: self.predictive.len(),
                earliest,
            }),
        }
    }
}
