//! Plain-text rendering of users, reports and templates.

use leasedash_core::api::error::DEFAULT_ERROR_MESSAGE;
use leasedash_core::models::{Report, Template, User};
use leasedash_core::utils::{format_date, truncate_string};
use leasedash_core::ClientError;

/// Column widths for the report table
const NAME_WIDTH: usize = 32;
const TYPE_WIDTH: usize = 10;
const STATUS_WIDTH: usize = 12;

pub fn print_user(user: &User) {
    println!("Logged in as {} (id {})", user.display_name(), user.id);
}

pub fn print_overview(reports: &[Report], templates: &[Template]) {
    let pending = reports
        .iter()
        .filter(|r| r.status.is_some() && !r.is_finished())
        .count();
    println!(
        "{} reports ({} in progress), {} templates",
        reports.len(),
        pending,
        Template::flatten(templates).len()
    );
}

pub fn print_reports(reports: &[&Report]) {
    if reports.is_empty() {
        println!("No reports");
        return;
    }
    println!(
        "{:>6}  {:<name$}  {:<ty$}  {:<st$}  {}",
        "ID",
        "NAME",
        "TYPE",
        "STATUS",
        "BREAK",
        name = NAME_WIDTH,
        ty = TYPE_WIDTH,
        st = STATUS_WIDTH
    );
    for report in reports {
        println!(
            "{:>6}  {:<name$}  {:<ty$}  {:<st$}  {}",
            report.id_display(),
            truncate_string(report.name_display(), NAME_WIDTH),
            report.report_type.as_str(),
            truncate_string(report.status_display(), STATUS_WIDTH),
            report.break_at.as_deref().map(format_date).unwrap_or_default(),
            name = NAME_WIDTH,
            ty = TYPE_WIDTH,
            st = STATUS_WIDTH
        );
    }
}

pub fn print_report(report: &Report) {
    println!("Report #{}: {}", report.id_display(), report.name_display());
    println!("  Type:      {}", report.report_type);
    if let Some(template_id) = report.template_id {
        println!("  Template:  {}", template_id);
    }
    println!("  Status:    {}", report.status_display());
    if let Some(ref break_at) = report.break_at {
        println!("  Break at:  {}", format_date(break_at));
    }
    if let Some(months) = report.months {
        println!("  Months:    {}", months);
    }
    if let Some(years) = report.years {
        println!("  Years:     {}", years);
    }
    if let Some(ref language) = report.language {
        println!("  Language:  {}", language);
    }
    if let Some(ref created_at) = report.created_at {
        println!("  Created:   {}", format_date(created_at));
    }
    for (key, value) in &report.extra {
        println!("  {}: {}", key, value);
    }
}

pub fn print_templates(templates: &[Template]) {
    let flat = Template::flatten(templates);
    if flat.is_empty() {
        println!("No templates");
        return;
    }
    for (depth, template) in flat {
        println!("{}{:>6}  {}", "  ".repeat(depth), template.id, template.name);
    }
}

/// User-facing text for a failed command.
pub fn error_message(err: &anyhow::Error) -> String {
    match err.downcast_ref::<ClientError>() {
        Some(ClientError::Api(api))
            if api.is_unauthorized() && api.message == DEFAULT_ERROR_MESSAGE =>
        {
            "Session expired or invalid. Run `leasedash login` again.".to_string()
        }
        Some(ClientError::Api(api)) => {
            let mut message = api.message.clone();
            if let Some(ref fields) = api.field_errors {
                let mut names: Vec<&String> = fields.keys().collect();
                names.sort();
                for name in names {
                    if let Some(first) = fields[name].first() {
                        message.push_str(&format!("\n  {}: {}", name, first));
                    }
                }
            }
            message
        }
        Some(ClientError::Transport(e)) if e.is_timeout() => {
            "Connection timed out. Please try again.".to_string()
        }
        Some(ClientError::Transport(_)) => {
            "Unable to connect to server. Check your internet connection.".to_string()
        }
        _ => format!("{:#}", err),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use leasedash_core::ApiError;

    use super::*;

    #[test]
    fn test_error_message_lists_field_errors() {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), vec!["required".to_string()]);
        fields.insert("months".to_string(), vec!["too large".to_string(), "x".to_string()]);
        let err: anyhow::Error =
            ClientError::Api(ApiError::new(422, "Invalid data", Some(fields))).into();

        assert_eq!(
            error_message(&err),
            "Invalid data\n  months: too large\n  name: required"
        );
    }

    #[test]
    fn test_error_message_for_expired_session() {
        let err: anyhow::Error =
            ClientError::Api(ApiError::new(401, DEFAULT_ERROR_MESSAGE, None)).into();
        assert!(error_message(&err).contains("leasedash login"));

        let err: anyhow::Error =
            ClientError::Api(ApiError::new(401, "Invalid email or password.", None)).into();
        assert_eq!(error_message(&err), "Invalid email or password.");
    }

    #[test]
    fn test_error_message_falls_back_to_chain() {
        let err = anyhow::anyhow!("Not logged in. Run `leasedash login` first.");
        assert_eq!(error_message(&err), "Not logged in. Run `leasedash login` first.");
    }
}
