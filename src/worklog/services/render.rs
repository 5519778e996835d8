//! HTML report rendering with `minijinja` templates.

use crate::worklog::domain::{GroupedReport, TaskSummary, format_day};
use chrono::NaiveDate;
use minijinja::Environment;
use serde::Serialize;
use thiserror::Error;

const DAILY_TEMPLATE_NAME: &str = "daily.html";
const WEEKLY_TEMPLATE_NAME: &str = "weekly.html";

const CELL: &str = "padding: 10px; border: 1px solid #666;";

const DAILY_TEMPLATE: &str = r#"<p>Hi Team,</p>
<p>Please find the daily status update for <strong>{{ date_label }}</strong>:</p>
<table style="width:100%; border-collapse: collapse; background-color: #d4edda; margin-top: 20px;">
  <tr>
    <td colspan="3" style="padding: 12px; border: 1px solid #666; background-color: #a8d5ba;"><strong>Project Name: {{ project }}</strong></td>
    <td colspan="2" style="padding: 12px; border: 1px solid #666; text-align: right; background-color: #a8d5ba;"><strong>Date: {{ date_label }}</strong></td>
  </tr>
  <tr style="background-color: #a8d5ba;">
    <th style="{{ cell }} text-align: left; width: 15%;">Task</th>
    <th style="{{ cell }} text-align: left; width: 42%;">Description</th>
    <th style="{{ cell }} text-align: center; width: 10%;">Hours</th>
    <th style="{{ cell }} text-align: center; width: 13%;">Status</th>
    <th style="{{ cell }} text-align: left; width: 20%;">Git Branch / PR Link</th>
  </tr>
{%- for task in tasks %}
  <tr>
    <td style="{{ cell }} vertical-align: top; background-color: #ffffff;"><strong>{{ task.name }}</strong></td>
    <td style="{{ cell }} background-color: #ffffff;">{% for line in task.lines %}{{ line }}{% if not loop.last %}<br>{% endif %}{% endfor %}</td>
    <td style="{{ cell }} text-align: center; background-color: #ffffff;">{{ task.hours }} hrs</td>
    <td style="{{ cell }} text-align: center; background-color: {{ task.status_colour }};">{{ task.status }}</td>
    <td style="{{ cell }} font-family: monospace; background-color: #ffffff;">{{ task.branch }}</td>
  </tr>
{%- endfor %}
  <tr>
    <td colspan="4" style="{{ cell }} text-align: right; background-color: #f0f0f0;"><strong>Total Hours Worked:</strong></td>
    <td style="{{ cell }} text-align: center; background-color: #f0f0f0;"><strong>{{ total_hours }} hrs</strong></td>
  </tr>
</table>
{%- if signature %}
<br><br>--<br>
{% for line in signature %}{{ line }}{% if not loop.last %}<br>{% endif %}{% endfor %}
{%- endif %}
"#;

const WEEKLY_TEMPLATE: &str = r#"<p>Hi Team,</p>
<p>This is the weekly status update for <strong>{{ date_label }}</strong>:</p>
<table style="width:100%; border-collapse: collapse; background-color: #d4edda; margin-top: 20px;">
  <tr>
    <td colspan="4" style="padding: 12px; border: 1px solid #666; background-color: #a8d5ba;"><strong>Project Name: {{ project }}</strong></td>
    <td colspan="2" style="padding: 12px; border: 1px solid #666; text-align: right; background-color: #a8d5ba;"><strong>Date: {{ date_label }}</strong></td>
  </tr>
  <tr style="background-color: #a8d5ba;">
    <th style="{{ cell }} text-align: left; width: 15%;">Task</th>
    <th style="{{ cell }} text-align: left; width: 40%;">Description</th>
    <th style="{{ cell }} text-align: center; width: 12%;">Status</th>
    <th style="{{ cell }} text-align: left; width: 13%;">Git Branch</th>
    <th style="{{ cell }} text-align: center; width: 10%;">Dates</th>
    <th style="{{ cell }} text-align: center; width: 10%;">Hours</th>
  </tr>
{%- for task in tasks %}
  <tr>
    <td style="{{ cell }} vertical-align: top; background-color: #ffffff;"><strong>{{ task.name }}</strong></td>
    <td style="{{ cell }} background-color: #ffffff;">{% for line in task.lines %}{{ line }}{% if not loop.last %}<br>{% endif %}{% endfor %}</td>
    <td style="{{ cell }} text-align: center; background-color: {{ task.status_colour }};">{{ task.status }}</td>
    <td style="{{ cell }} font-family: monospace; background-color: #ffffff;">{{ task.branch }}</td>
    <td style="{{ cell }} text-align: center; font-size: 11px; background-color: #ffffff;">{% for day in task.dates %}{{ day }}{% if not loop.last %}<br>{% endif %}{% endfor %}</td>
    <td style="{{ cell }} text-align: center; background-color: #ffffff;">{{ task.hours }} hrs</td>
  </tr>
{%- endfor %}
  <tr>
    <td colspan="5" style="{{ cell }} text-align: right; background-color: #f0f0f0;"><strong>Total Hours Worked:</strong></td>
    <td style="{{ cell }} text-align: center; background-color: #f0f0f0;"><strong>{{ total_hours }} hrs</strong></td>
  </tr>
</table>
{%- if signature %}
<br><br>--<br>
{% for line in signature %}{{ line }}{% if not loop.last %}<br>{% endif %}{% endfor %}
{%- endif %}
"#;

/// Rendering failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReportRenderError {
    /// A template failed to compile or render.
    #[error("report template '{template}' failed: {reason}")]
    Template {
        /// Template name.
        template: &'static str,
        /// Engine error message.
        reason: String,
    },
}

/// Subject line and HTML body of a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Mail subject.
    pub subject: String,
    /// Mail body.
    pub html_body: String,
}

#[derive(Serialize)]
struct TaskRowView<'a> {
    name: &'a str,
    lines: &'a [String],
    hours: String,
    status: &'a str,
    status_colour: &'static str,
    branch: &'a str,
    dates: Vec<String>,
}

#[derive(Serialize)]
struct ReportView<'a> {
    project: &'a str,
    date_label: &'a str,
    cell: &'static str,
    tasks: Vec<TaskRowView<'a>>,
    total_hours: String,
    signature: &'a [String],
}

/// Background colour of a status cell.
#[must_use]
pub fn status_colour(status: &str) -> &'static str {
    let lowered = status.to_lowercase();
    if lowered.contains("complete") {
        "#90EE90"
    } else if lowered.contains("progress") {
        "#FFE4B5"
    } else if lowered.contains("block") || lowered.contains("road") {
        "#FFB6C1"
    } else {
        "#E0E0E0"
    }
}

fn task_view(summary: &TaskSummary) -> TaskRowView<'_> {
    let branch = if summary.branch().trim().is_empty() {
        "N/A"
    } else {
        summary.branch()
    };
    TaskRowView {
        name: summary.task_name(),
        lines: summary.description_lines(),
        hours: summary.hours_total().to_string(),
        status: summary.status(),
        status_colour: status_colour(summary.status()),
        branch,
        dates: summary
            .dates_seen()
            .iter()
            .map(|day| format_day(*day))
            .collect(),
    }
}

/// Renders grouped reports into mail subjects and HTML bodies.
///
/// Template output is HTML-escaped.
#[derive(Debug)]
pub struct ReportRenderer {
    environment: Environment<'static>,
    project_name: String,
    signature: Vec<String>,
}

impl ReportRenderer {
    /// Creates a renderer for `project_name` with optional signature lines.
    ///
    /// # Errors
    ///
    /// Returns [`ReportRenderError::Template`] when a built-in template does
    /// not compile.
    pub fn new(
        project_name: impl Into<String>,
        signature: impl IntoIterator<Item = String>,
    ) -> Result<Self, ReportRenderError> {
        let mut environment = Environment::new();
        for (name, source) in [
            (DAILY_TEMPLATE_NAME, DAILY_TEMPLATE),
            (WEEKLY_TEMPLATE_NAME, WEEKLY_TEMPLATE),
        ] {
            environment
                .add_template(name, source)
                .map_err(|err| ReportRenderError::Template {
                    template: name,
                    reason: err.to_string(),
                })?;
        }
        Ok(Self {
            environment,
            project_name: project_name.into(),
            signature: signature.into_iter().collect(),
        })
    }

    /// Returns the project name used in subjects.
    #[must_use]
    pub fn project_name(&self) -> &str {
        &self.project_name
    }

    /// Renders the daily report for `day`.
    ///
    /// # Errors
    ///
    /// Returns [`ReportRenderError::Template`] when rendering fails.
    pub fn render_daily(
        &self,
        report: &GroupedReport,
        day: NaiveDate,
    ) -> Result<RenderedReport, ReportRenderError> {
        let date_label = format_day(day);
        let subject = format!("{} | Daily Status Update | {date_label}", self.project_name);
        let html_body = self.render(DAILY_TEMPLATE_NAME, report, &date_label)?;
        Ok(RenderedReport { subject, html_body })
    }

    /// Renders the weekly report, labelled with the report's date span.
    ///
    /// `fallback_day` labels a report with no rows.
    ///
    /// # Errors
    ///
    /// Returns [`ReportRenderError::Template`] when rendering fails.
    pub fn render_weekly(
        &self,
        report: &GroupedReport,
        fallback_day: NaiveDate,
    ) -> Result<RenderedReport, ReportRenderError> {
        let (first, last) = report.date_span().unwrap_or((fallback_day, fallback_day));
        let date_label = format!("{} - {}", format_day(first), format_day(last));
        let subject = format!("{} | Weekly Status Update | {date_label}", self.project_name);
        let html_body = self.render(WEEKLY_TEMPLATE_NAME, report, &date_label)?;
        Ok(RenderedReport { subject, html_body })
    }

    fn render(
        &self,
        template: &'static str,
        report: &GroupedReport,
        date_label: &str,
    ) -> Result<String, ReportRenderError> {
        let view = ReportView {
            project: &self.project_name,
            date_label,
            cell: CELL,
            tasks: report.summaries().iter().map(task_view).collect(),
            total_hours: report.total_hours().to_string(),
            signature: &self.signature,
        };
        self.environment
            .get_template(template)
            .and_then(|compiled| compiled.render(&view))
            .map_err(|err| ReportRenderError::Template {
                template,
                reason: err.to_string(),
            })
    }
}
