use crate::error::OutputError;
use crate::runner::UnitReport;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

/// Counts for one run, plus every failure in the order it was recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failures: Vec<FailureEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureEntry {
    pub path: PathBuf,
    pub reason: String,
}

impl std::fmt::Display for FailureEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "failed to review {}: {}", self.path.display(), self.reason)
    }
}

impl RunSummary {
    /// True when nothing failed, including the empty run
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }

    pub fn status_message(&self) -> String {
        if self.is_success() {
            format!("all {} units reviewed successfully", self.total)
        } else {
            format!("{} of {} units failed", self.failed, self.total)
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryReport {
    pub run_id: Uuid,
    pub timestamp: String,
    pub target: String,
    pub duration_sec: f64,
    pub endpoints: Vec<String>,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub units: Vec<UnitSummary>,
    pub exit_code: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UnitSummary {
    pub path: PathBuf,
    pub size: u64,
    pub status: String,
    pub duration_sec: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub attempts: Vec<String>,
}

/// Write the machine-readable summary for a finished run
pub fn write_summary(
    path: &Path,
    reports: &[UnitReport],
    summary: &RunSummary,
    target: &Path,
    endpoints: &[String],
    duration: Duration,
) -> Result<(), OutputError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(OutputError::CreateDir)?;
    }

    let report = build_summary(reports, summary, target, endpoints, duration);
    let json = serde_json::to_string_pretty(&report)?;
    fs::write(path, json).map_err(OutputError::WriteReport)?;

    Ok(())
}

fn build_summary(
    reports: &[UnitReport],
    summary: &RunSummary,
    target: &Path,
    endpoints: &[String],
    duration: Duration,
) -> SummaryReport {
    let mut units: Vec<UnitSummary> = reports
        .iter()
        .map(|r| match &r.outcome {
            Ok(review) => UnitSummary {
                path: r.path.clone(),
                size: r.size,
                status: "succeeded".to_string(),
                duration_sec: r.duration.as_secs_f64(),
                endpoint: Some(review.endpoint.clone()),
                reason: None,
                attempts: Vec::new(),
            },
            Err(error) => UnitSummary {
                path: r.path.clone(),
                size: r.size,
                status: "failed".to_string(),
                duration_sec: r.duration.as_secs_f64(),
                endpoint: None,
                reason: Some(error.to_string()),
                attempts: error.attempts().iter().map(|a| a.to_string()).collect(),
            },
        })
        .collect();
    units.sort_by(|a, b| a.path.cmp(&b.path));

    SummaryReport {
        run_id: Uuid::new_v4(),
        timestamp: Utc::now().to_rfc3339(),
        target: target.display().to_string(),
        duration_sec: duration.as_secs_f64(),
        endpoints: endpoints.to_vec(),
        total: summary.total,
        succeeded: summary.succeeded,
        failed: summary.failed,
        units,
        exit_code: summary.exit_code(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{EndpointFailure, ProviderError, ReviewError};
    use crate::review::Review;

    fn reports() -> Vec<UnitReport> {
        vec![
            UnitReport {
                path: PathBuf::from("b.go"),
                size: 10,
                outcome: Err(ReviewError::Exhausted {
                    attempts: vec![EndpointFailure {
                        endpoint: "http://a".to_string(),
                        error: ProviderError::Unauthorized,
                    }],
                }),
                duration: Duration::from_millis(5),
            },
            UnitReport {
                path: PathBuf::from("a.go"),
                size: 20,
                outcome: Ok(Review {
                    text: "ok".to_string(),
                    endpoint: "http://a".to_string(),
                }),
                duration: Duration::from_millis(7),
            },
        ]
    }

    #[test]
    fn test_status_message() {
        let ok = RunSummary {
            total: 3,
            succeeded: 3,
            ..Default::default()
        };
        assert_eq!(ok.status_message(), "all 3 units reviewed successfully");
        assert_eq!(ok.exit_code(), 0);

        let bad = RunSummary {
            total: 3,
            succeeded: 2,
            failed: 1,
            ..Default::default()
        };
        assert_eq!(bad.status_message(), "1 of 3 units failed");
        assert_eq!(bad.exit_code(), 1);

        assert!(RunSummary::default().is_success());
    }

    #[test]
    fn test_write_summary_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("summary.json");
        let summary = RunSummary {
            total: 2,
            succeeded: 1,
            failed: 1,
            failures: Vec::new(),
        };

        write_summary(
            &path,
            &reports(),
            &summary,
            Path::new("."),
            &["http://a".to_string()],
            Duration::from_secs(1),
        )
        .unwrap();

        let parsed: SummaryReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.exit_code, 1);
        assert_eq!(parsed.units.len(), 2);
        assert_eq!(parsed.units[0].path, PathBuf::from("a.go"));
        assert_eq!(parsed.units[0].endpoint.as_deref(), Some("http://a"));
        assert_eq!(parsed.units[1].status, "failed");
        assert_eq!(parsed.units[1].attempts.len(), 1);
        assert!(parsed.units[1]
            .reason
            .as_deref()
            .unwrap()
            .contains("authentication failed"));
    }
}
