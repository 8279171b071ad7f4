use std::fmt;

use maze_search_core::error::{LocalizationError, TrackingError, TrialError};

use crate::TrialReport;

/// Aggregate statistics over a batch of trials.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BatchSummary {
    /// Trials run.
    pub trials: u32,
    /// Trials that captured the target.
    pub successes: u32,
    /// Trials whose localization hit its iteration cap.
    pub exhausted_localizations: u32,
    /// Trials whose tracking hit its cycle cap.
    pub non_convergent_trackings: u32,
    /// Trials that failed for any other reason.
    pub other_failures: u32,
    /// Mean localization steps over trials that localized.
    pub mean_localization_steps: f64,
    /// Mean tracking steps over successful trials.
    pub mean_tracking_steps: f64,
    /// Mean total steps over successful trials.
    pub mean_total_steps: f64,
    /// Fewest total steps of a successful trial.
    pub min_total_steps: Option<u32>,
    /// Most total steps of a successful trial.
    pub max_total_steps: Option<u32>,
}

impl BatchSummary {
    /// Folds per-trial reports into a summary.
    #[must_use]
    pub fn from_reports(reports: &[TrialReport]) -> Self {
        let mut summary = Self {
            trials: reports.len() as u32,
            ..Self::default()
        };
        let mut localized = 0u32;
        let mut localization_total = 0u64;
        let mut tracking_total = 0u64;
        let mut success_total = 0u64;

        for report in reports {
            match report.failure {
                None => {
                    summary.successes += 1;
                    tracking_total += u64::from(report.tracking_steps);
                    let total = report.total_steps();
                    success_total += u64::from(total);
                    summary.min_total_steps =
                        Some(summary.min_total_steps.map_or(total, |min| min.min(total)));
                    summary.max_total_steps =
                        Some(summary.max_total_steps.map_or(total, |max| max.max(total)));
                }
                Some(TrialError::Localization(LocalizationError::Exhausted { .. })) => {
                    summary.exhausted_localizations += 1;
                }
                Some(TrialError::Tracking(TrackingError::NonConvergent { .. })) => {
                    summary.non_convergent_trackings += 1;
                }
                Some(_) => summary.other_failures += 1,
            }

            let localized_ok = !matches!(
                report.failure,
                Some(TrialError::Localization(_) | TrialError::Generation(_))
            );
            if localized_ok {
                localized += 1;
                localization_total += u64::from(report.localization_steps);
            }
        }

        summary.mean_localization_steps = mean(localization_total, localized);
        summary.mean_tracking_steps = mean(tracking_total, summary.successes);
        summary.mean_total_steps = mean(success_total, summary.successes);
        summary
    }

    /// Share of trials that captured the target.
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        mean(u64::from(self.successes), self.trials)
    }
}

fn mean(total: u64, count: u32) -> f64 {
    if count == 0 {
        0.0
    } else {
        total as f64 / f64::from(count)
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "trials                    {}", self.trials)?;
        writeln!(
            f,
            "successes                 {} ({:.1}%)",
            self.successes,
            self.success_rate() * 100.0
        )?;
        writeln!(f, "exhausted localizations   {}", self.exhausted_localizations)?;
        writeln!(f, "non-convergent trackings  {}", self.non_convergent_trackings)?;
        if self.other_failures > 0 {
            writeln!(f, "other failures            {}", self.other_failures)?;
        }
        writeln!(f, "avg localization steps    {:.3}", self.mean_localization_steps)?;
        writeln!(f, "avg tracking steps        {:.3}", self.mean_tracking_steps)?;
        write!(f, "avg total steps           {:.3}", self.mean_total_steps)?;
        if let (Some(min), Some(max)) = (self.min_total_steps, self.max_total_steps) {
            write!(f, "\nmin/max total steps       {min}/{max}")?;
        }
        Ok(())
    }
}
