//! Output formatting and console reporting

use condcov::coverage::ELLIPSIS;
use condcov::{CondcovError, CoverageReport, SiteCoverage, TEST_PREFIX};
use console::{Style, Term};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Line standing in for missing combinations past the preview
const ELLIPSIS_LINE: &str = "    ...   ";

/// Output format for coverage reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON document
    Json,
}

/// `title` centred in a rule of `=` spanning `width` columns
#[must_use]
pub fn banner(title: &str, width: usize) -> String {
    let label = format!(" {title} ");
    let side = "=".repeat(width.saturating_sub(label.chars().count()) / 2);
    format!("{side}{label}{side}")
}

/// Rule printed between two sites
#[must_use]
pub fn separator(width: usize) -> String {
    "-".repeat(width * 2 / 3)
}

/// Lines printed to stderr for a recoverable error
#[must_use]
pub fn diagnostic_lines(err: &CondcovError) -> Vec<String> {
    let mut lines = vec![format!("Error: {err}")];
    if err.is_warning() {
        lines.push(format!(
            "Warning: A test function should start with '{TEST_PREFIX}'"
        ));
    }
    lines
}

/// Renders the text report
#[derive(Debug, Clone, Copy)]
pub struct ReportRenderer {
    width: usize,
    use_color: bool,
}

impl ReportRenderer {
    /// Create a renderer for `width` columns
    #[must_use]
    pub const fn new(width: usize, use_color: bool) -> Self {
        Self { width, use_color }
    }

    fn paint(&self, text: &str, style: &Style) -> String {
        if self.use_color {
            style.clone().force_styling(true).apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn banner(&self, title: &str) -> String {
        self.paint(&banner(title, self.width), &Style::new().bold())
    }

    /// Header printed before any test file runs
    #[must_use]
    pub fn session_header(&self, target: &Path, tests: &[PathBuf]) -> String {
        let tests: Vec<String> = tests.iter().map(|p| p.display().to_string()).collect();
        format!(
            "\n{}\nCode File: {}\nTest Files: {}\n",
            self.banner("test session starts"),
            target.display(),
            tests.join(", ")
        )
    }

    /// Full report: one section per site, then the totals
    #[must_use]
    pub fn render(&self, report: &CoverageReport) -> String {
        let mut out = String::new();
        out.push_str(&self.banner("conditional tests coverage"));
        out.push('\n');
        for (i, site) in report.sites.iter().enumerate() {
            if i > 0 {
                out.push_str(&separator(self.width));
                out.push('\n');
            }
            self.render_site(site, &mut out);
        }
        out.push_str(&self.banner("conditional testing report"));
        out.push('\n');
        out.push_str(&format!(
            "Total Conditional Branches: {}\n",
            report.total_required
        ));
        out.push_str(&format!(
            "Total Covered Conditional Branches: {}\n",
            report.total_observed
        ));
        let score = format!("Overall score: {:.2}%", report.score);
        out.push_str(&self.paint(&score, &score_style(report.is_complete())));
        out.push_str("\n\n");
        out
    }

    fn render_site(&self, site: &SiteCoverage, out: &mut String) {
        out.push_str(&format!(
            "Conditional Branching in {} at line {}:\n\n",
            site.id.file, site.id.line
        ));
        out.push_str(&format!("Conditions: {}\n", site.conditions_preview()));
        out.push_str(&format!("Conditional Branch Count: {}\n", site.required));
        out.push_str(&format!("Covered Conditional Branches: {}\n\n", site.observed));
        let local = format!("Local Score: {:.2}%", site.score);
        out.push_str(&self.paint(&local, &score_style(site.is_complete())));
        out.push('\n');
        if site.is_complete() {
            return;
        }
        out.push_str(&format!(
            "\nUncovered Conditional Branch Count: {}\n",
            site.missing_count
        ));
        for line in &site.missing_preview {
            if line == ELLIPSIS {
                out.push_str(ELLIPSIS_LINE);
            } else {
                out.push_str(" - Missing: ");
                out.push_str(&self.paint(line, &Style::new().yellow()));
            }
            out.push('\n');
        }
    }
}

fn score_style(complete: bool) -> Style {
    if complete {
        Style::new().green().bold()
    } else {
        Style::new().yellow().bold()
    }
}

/// Writes the session header, report and diagnostics
#[derive(Debug)]
pub struct Reporter {
    out: Term,
    err: Term,
    renderer: ReportRenderer,
    /// Quiet mode
    pub quiet: bool,
}

impl Reporter {
    /// Create a reporter writing to stdout and stderr
    #[must_use]
    pub fn new(width: usize, use_color: bool, quiet: bool) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            renderer: ReportRenderer::new(width, use_color),
            quiet,
        }
    }

    /// Renderer used for text output
    #[must_use]
    pub const fn renderer(&self) -> &ReportRenderer {
        &self.renderer
    }

    /// Print the session header unless quiet
    pub fn session_header(&self, target: &Path, tests: &[PathBuf]) -> std::io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        self.out
            .write_str(&self.renderer.session_header(target, tests))
    }

    /// Print the text report
    pub fn report(&self, report: &CoverageReport) -> std::io::Result<()> {
        self.out.write_str(&self.renderer.render(report))
    }

    /// Print a JSON document
    pub fn json(&self, document: &str) -> std::io::Result<()> {
        self.out.write_line(document)
    }

    /// Print a recoverable error and its hint
    pub fn diagnostic(&self, err: &CondcovError) {
        let style = if err.is_warning() {
            Style::new().yellow()
        } else {
            Style::new().red()
        };
        for line in diagnostic_lines(err) {
            let _ = self.err.write_line(&self.renderer.paint(&line, &style));
        }
    }

    /// Print a fatal error
    pub fn failure(&self, message: &str) {
        let line = format!("Error: {message}");
        let _ = self
            .err
            .write_line(&self.renderer.paint(&line, &Style::new().red().bold()));
    }
}
