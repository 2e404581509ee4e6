use crate::error::Stage;
use log::info;
use std::fmt;

/// Summary of one finished stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    /// Stage that finished
    pub stage: Stage,
    /// Named scalar metrics, in insertion order
    pub metrics: Vec<(&'static str, f64)>,
}

impl StageReport {
    /// Empty report for `stage`
    pub fn new(stage: Stage) -> Self {
        StageReport {
            stage,
            metrics: Vec::new(),
        }
    }

    /// Add a metric
    pub fn with(mut self, name: &'static str, value: f64) -> Self {
        self.metrics.push((name, value));
        self
    }

    /// Look a metric up by name
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics
            .iter()
            .find(|(key, _)| *key == name)
            .map(|&(_, value)| value)
    }
}

impl fmt::Display for StageReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stage)?;
        for (name, value) in &self.metrics {
            write!(f, " {name}={value:.3}")?;
        }
        Ok(())
    }
}

/// Receives a report after every completed stage
pub trait AnalysisObserver {
    /// Called once per stage, in pipeline order
    fn on_stage(&mut self, report: &StageReport);
}

/// Forwards reports to the `log` facade at info level
#[derive(Debug, Default)]
pub struct LogObserver;

impl AnalysisObserver for LogObserver {
    fn on_stage(&mut self, report: &StageReport) {
        info!("{report}");
    }
}

/// Discards reports
#[derive(Debug, Default)]
pub struct NoopObserver;

impl AnalysisObserver for NoopObserver {
    fn on_stage(&mut self, _report: &StageReport) {}
}

/// Keeps every report, for inspection after a run
#[derive(Debug, Default)]
pub struct CollectingObserver {
    /// Reports in arrival order
    pub reports: Vec<StageReport>,
}

impl AnalysisObserver for CollectingObserver {
    fn on_stage(&mut self, report: &StageReport) {
        self.reports.push(report.clone());
    }
}
