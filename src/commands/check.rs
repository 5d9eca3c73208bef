use anyhow::Result;
use colored::Colorize;

use sqlph::check::{self, Report};
use sqlph::CheckOptions;

/// Exit code when diagnostics were reported
const EXIT_DIAGNOSTICS: i32 = 3;

pub fn execute(targets: &[String], options: &CheckOptions, json_output: bool) -> Result<i32> {
    let report = check::execute(targets, options)?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report.diagnostics)?);
    } else {
        for diagnostic in &report.diagnostics {
            println!("{}", diagnostic);
        }
        print_summary(&report);
    }

    Ok(if report.is_clean() { 0 } else { EXIT_DIAGNOSTICS })
}

fn print_summary(report: &Report) {
    let files = format!(
        "{} file{}",
        report.files_checked,
        if report.files_checked == 1 { "" } else { "s" }
    );
    if report.is_clean() {
        eprintln!("{} {} checked, no problems", "✓".green().bold(), files);
    } else {
        let problems = report.diagnostics.len();
        eprintln!(
            "{} {} checked, {} problem{}",
            "✗".red().bold(),
            files,
            problems,
            if problems == 1 { "" } else { "s" }
        );
    }
}
