use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::utils::{cmp_ignore_case, contains_ignore_case};

/// Accounting standard a report is generated for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum ReportType {
    #[serde(rename = "IFRS16")]
    Ifrs16,
    #[serde(rename = "LOCALGAAP")]
    LocalGaap,
    #[serde(rename = "RKRR5")]
    Rkrr5,
    #[serde(rename = "GENERATOR")]
    Generator,
    /// A type this client does not know about.
    #[default]
    #[serde(other)]
    Unknown,
}

impl ReportType {
    pub const ALL: [ReportType; 4] = [
        ReportType::Ifrs16,
        ReportType::LocalGaap,
        ReportType::Rkrr5,
        ReportType::Generator,
    ];

    /// Wire name as sent to the service.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Ifrs16 => "IFRS16",
            ReportType::LocalGaap => "LOCALGAAP",
            ReportType::Rkrr5 => "RKRR5",
            ReportType::Generator => "GENERATOR",
            ReportType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportType::Ifrs16 => write!(f, "IFRS 16"),
            ReportType::LocalGaap => write!(f, "Local GAAP"),
            ReportType::Rkrr5 => write!(f, "RKRR 5"),
            ReportType::Generator => write!(f, "Generator"),
            ReportType::Unknown => write!(f, "Unknown"),
        }
    }
}

impl FromStr for ReportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_uppercase();
        ReportType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown report type '{}' (expected one of IFRS16, LOCALGAAP, RKRR5, GENERATOR)",
                    s
                )
            })
    }
}

/// A generated report as returned by the service. Nothing is required:
/// a creation response may echo the submitted body without an `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Report {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub report_type: ReportType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(flatten)]
    #[cfg_attr(feature = "ts", ts(skip))]
    pub extra: Map<String, Value>,
}

impl Report {
    pub fn name_display(&self) -> &str {
        self.name.as_deref().unwrap_or("(unnamed)")
    }

    /// Id for display, `-` until the service assigns one.
    pub fn id_display(&self) -> String {
        self.id.map_or_else(|| "-".to_string(), |id| id.to_string())
    }

    pub fn status_display(&self) -> &str {
        self.status.as_deref().unwrap_or("-")
    }

    /// Whether generation has finished.
    pub fn is_finished(&self) -> bool {
        self.status.as_deref().is_some_and(|s| {
            s.eq_ignore_ascii_case("done") || s.eq_ignore_ascii_case("completed")
        })
    }
}

/// Body of `POST /report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct NewReport {
    pub name: String,
    #[serde(rename = "type")]
    pub report_type: ReportType,
    pub template_id: i64,
    pub break_at: NaiveDate,
    pub months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_report_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_reports: Option<Vec<i64>>,
}

impl NewReport {
    pub fn new(
        name: impl Into<String>,
        report_type: ReportType,
        template_id: i64,
        break_at: NaiveDate,
        months: u32,
    ) -> Self {
        Self {
            name: name.into(),
            report_type,
            template_id,
            break_at,
            months,
            years: None,
            language: None,
            webhook: None,
            linked_report_id: None,
            linked_reports: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReportSortColumn {
    Name,
    Type,
    #[default]
    BreakAt,
    Status,
    Created,
}

impl FromStr for ReportSortColumn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(ReportSortColumn::Name),
            "type" => Ok(ReportSortColumn::Type),
            "break" | "break_at" | "break-at" => Ok(ReportSortColumn::BreakAt),
            "status" => Ok(ReportSortColumn::Status),
            "created" | "created_at" => Ok(ReportSortColumn::Created),
            other => Err(format!("unknown sort column '{}'", other)),
        }
    }
}

/// Client-side report filter. Empty criteria match everything.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub query: Option<String>,
    pub template_id: Option<i64>,
    pub status: Option<String>,
    pub report_type: Option<ReportType>,
}

impl ReportFilter {
    pub fn matches(&self, report: &Report) -> bool {
        if let Some(ref query) = self.query {
            if !report
                .name
                .as_deref()
                .is_some_and(|name| contains_ignore_case(name, query))
                && !contains_ignore_case(report.report_type.as_str(), query)
            {
                return false;
            }
        }
        if self.template_id.is_some() && report.template_id != self.template_id {
            return false;
        }
        if let Some(ref status) = self.status {
            match report.status {
                Some(ref s) if s.eq_ignore_ascii_case(status) => {}
                _ => return false,
            }
        }
        if self.report_type.is_some() && Some(report.report_type) != self.report_type {
            return false;
        }
        true
    }
}

pub fn filter_reports<'a>(reports: &'a [Report], filter: &ReportFilter) -> Vec<&'a Report> {
    reports.iter().filter(|r| filter.matches(r)).collect()
}

/// Sort reports in place. Missing values sort last when ascending.
pub fn sort_reports(reports: &mut [&Report], column: ReportSortColumn, ascending: bool) {
    reports.sort_by(|a, b| {
        let ordering = match column {
            ReportSortColumn::Name => cmp_ignore_case(a.name_display(), b.name_display()),
            ReportSortColumn::Type => a.report_type.as_str().cmp(b.report_type.as_str()),
            ReportSortColumn::BreakAt => cmp_missing_last(&a.break_at, &b.break_at),
            ReportSortColumn::Status => cmp_missing_last(&a.status, &b.status),
            ReportSortColumn::Created => cmp_missing_last(&a.created_at, &b.created_at),
        }
        .then_with(|| a.id.cmp(&b.id));
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
}

fn cmp_missing_last(a: &Option<String>, b: &Option<String>) -> std::cmp::Ordering {
    use std::cmp::Ordering;
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
