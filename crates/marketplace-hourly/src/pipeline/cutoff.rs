use super::PipelineError;
use crate::domain::{Cutoff, MarketingRecord};

/// Earliest week whose spend has not been actualized.
pub fn detect_cutoff(marketing: &[MarketingRecord]) -> Result<Cutoff, PipelineError> {
    marketing
        .iter()
        .filter(|record| !record.is_actualized())
        .map(|record| record.week)
        .min()
        .map(Cutoff::new)
        .ok_or(PipelineError::UndefinedCutoff {
            weeks: marketing.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn week(day: u32, fact_spend: Option<f64>) -> MarketingRecord {
        MarketingRecord {
            week: NaiveDate::from_ymd_opt(2024, 1, day).expect("valid week"),
            expected_spend: Some(100.0),
            fact_spend,
        }
    }

    #[test]
    fn picks_minimum_unactualized_week_regardless_of_order() {
        let marketing = vec![
            week(29, None),
            week(1, Some(90.0)),
            week(15, None),
            week(8, Some(95.0)),
            week(22, Some(80.0)),
        ];

        let cutoff = detect_cutoff(&marketing).expect("cutoff defined");
        assert_eq!(cutoff.date(), NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn fully_actualized_marketing_has_no_cutoff() {
        let marketing = vec![week(1, Some(90.0)), week(8, Some(0.0))];

        let error = detect_cutoff(&marketing).expect_err("cutoff undefined");
        assert!(matches!(error, PipelineError::UndefinedCutoff { weeks: 2 }));
    }

    #[test]
    fn empty_marketing_has_no_cutoff() {
        assert!(matches!(
            detect_cutoff(&[]),
            Err(PipelineError::UndefinedCutoff { weeks: 0 })
        ));
    }
}
