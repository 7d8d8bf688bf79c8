//! Human-readable pass/fail summary for a validation run.
//!
//! The exit status is the automation contract: `0` when no issue was found,
//! `1` otherwise. Fatal errors never reach the reporter.

use std::io::{self, Write};

use crate::models::ValidationIssue;

/// Exit status of a clean run.
pub const EXIT_CLEAN: u8 = 0;

/// Exit status when at least one issue was found.
pub const EXIT_ISSUES: u8 = 1;

/// Outcome of validating one file.
#[derive(Debug, Clone)]
pub struct Report {
    issues: Vec<ValidationIssue>,
    profile_label: String,
}

impl Report {
    pub fn new(issues: Vec<ValidationIssue>, profile_label: impl Into<String>) -> Self {
        Self {
            issues,
            profile_label: profile_label.into(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn exit_code(&self) -> u8 {
        if self.is_clean() {
            EXIT_CLEAN
        } else {
            EXIT_ISSUES
        }
    }

    /// Write the summary to `out`.
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        if self.is_clean() {
            writeln!(out, "✅ All good! This file matches the bank statement CSV checks.")?;
            writeln!(out, "Profile: {}", self.profile_label)?;
            writeln!(
                out,
                "Tip: keep a copy of this CSV alongside your workpapers and note the validator run date."
            )?;
            return Ok(());
        }

        writeln!(
            out,
            "⚠️ Needs attention - we spotted {} fix{} to make before importing.",
            self.issues.len(),
            if self.issues.len() == 1 { "" } else { "es" }
        )?;
        writeln!(out, "Profile: {}", self.profile_label)?;
        writeln!(out)?;

        for issue in &self.issues {
            writeln!(out, "• [{}] {}", issue.code, issue.message)?;
            writeln!(out, "    ↳ {}", issue.hint)?;
        }

        writeln!(out)?;
        writeln!(
            out,
            "Once adjusted, re-run the validator to confirm the fixes. Download a fresh sample if the layout keeps failing."
        )?;
        Ok(())
    }

    /// Render into a `String`.
    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.render(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IssueCode;

    #[test]
    fn test_clean_report() {
        let report = Report::new(Vec::new(), "Xero (United Kingdom)");
        let text = report.to_text();

        assert_eq!(report.exit_code(), EXIT_CLEAN);
        assert!(text.starts_with("✅ All good!"));
        assert!(text.contains("Profile: Xero (United Kingdom)"));
    }

    #[test]
    fn test_issue_report_lists_code_message_hint() {
        let issues = vec![
            ValidationIssue::new(IssueCode::BlankDate, "Row 2: transaction_date is blank", "Fill every date."),
            ValidationIssue::new(IssueCode::DuplicateIds, "Found duplicate unique_id values: A", "Make ids unique."),
        ];
        let report = Report::new(issues, "QuickBooks Online (US)");
        let text = report.to_text();

        assert_eq!(report.exit_code(), EXIT_ISSUES);
        assert!(text.contains("we spotted 2 fixes"));
        assert!(text.contains("• [CSV002] Row 2: transaction_date is blank\n    ↳ Fill every date.\n"));
        assert!(text.contains("• [CSV010] Found duplicate unique_id values: A"));
        let first = text.find("CSV002").unwrap();
        let second = text.find("CSV010").unwrap();
        assert!(first < second);
    }
}
