//! Narrative analysis of a listing, delegated to an external AI runner.
//!
//! Each section is one interaction of the runner. Sections run one after the
//! other and their stdout is appended to a markdown file; the first failure
//! stops the batch.

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

use crate::util::version::{version_label, APP_NAME};

pub const DEFAULT_RUNNER: &str = "composable";
pub const DEFAULT_OUTPUT_DIR: &str = ".jimi";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalysisSection {
    pub title: &'static str,
    pub interaction: &'static str,
}

pub const ANALYSIS_SECTIONS: [AnalysisSection; 6] = [
    AnalysisSection {
        title: "1. Renovation",
        interaction: "mhuang-seloger:RenovationAnalysis",
    },
    AnalysisSection {
        title: "2. Location Intelligence",
        interaction: "mhuang-seloger:LocationIntelligenceAnalysis",
    },
    AnalysisSection {
        title: "3. Legal And Administrative",
        interaction: "mhuang-seloger:LegalAndAdministrativeAnalysis",
    },
    AnalysisSection {
        title: "4. Market Dynamics",
        interaction: "mhuang-seloger:MarketDynamicsAnalysis",
    },
    AnalysisSection {
        title: "5. Lifestyle and Fit",
        interaction: "mhuang-seloger:LifestyleAndFitAnalysis",
    },
    AnalysisSection {
        title: "6. Risks",
        interaction: "mhuang-seloger:RisksAnalysis",
    },
];

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid listing id {0:?}")]
    InvalidListing(String),
    #[error("failed to write {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to start {runner}: {source}")]
    Spawn {
        runner: String,
        #[source]
        source: io::Error,
    },
    #[error("section {section:?} failed: {status}")]
    Section { section: &'static str, status: String },
}

/// Runs the analysis sections through `runner` and collects the output.
#[derive(Clone, Debug)]
pub struct AnalysisRunner {
    runner: String,
    output_dir: PathBuf,
    sections: Vec<AnalysisSection>,
}

impl AnalysisRunner {
    pub fn new(runner: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner: runner.into(),
            output_dir: output_dir.into(),
            sections: ANALYSIS_SECTIONS.to_vec(),
        }
    }

    pub fn with_sections(mut self, sections: Vec<AnalysisSection>) -> Self {
        self.sections = sections;
        self
    }

    pub fn report_path(&self, listing: &str) -> PathBuf {
        self.output_dir.join(format!("analysis-{listing}.md"))
    }

    /// Analyze `listing` and return the path of the markdown report.
    pub fn analyze(&self, listing: &str) -> Result<PathBuf, AnalysisError> {
        validate_listing(listing)?;

        let path = self.report_path(listing);
        fs::create_dir_all(&self.output_dir)
            .map_err(|source| output_error(&self.output_dir, source))?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| output_error(&path, source))?;

        tracing::info!(listing, path = %path.display(), "analyzing real-estate listing");
        write_run_header(&mut file, listing).map_err(|source| output_error(&path, source))?;

        for section in &self.sections {
            let content = self.run_section(section, listing)?;
            write_section(&mut file, section, &content)
                .map_err(|source| output_error(&path, source))?;
        }

        tracing::info!(path = %path.display(), "analysis completed");
        Ok(path)
    }

    fn run_section(
        &self,
        section: &AnalysisSection,
        listing: &str,
    ) -> Result<Vec<u8>, AnalysisError> {
        let data = serde_json::json!({ "real_estate_listing": format!("store:{listing}") });
        tracing::info!(
            section = section.title,
            "{} run {} --data '{data}'",
            self.runner,
            section.interaction
        );

        let output = Command::new(&self.runner)
            .arg("run")
            .arg(section.interaction)
            .arg("--data")
            .arg(data.to_string())
            .stdin(Stdio::null())
            .stderr(Stdio::inherit())
            .output()
            .map_err(|source| AnalysisError::Spawn {
                runner: self.runner.clone(),
                source,
            })?;

        if !output.status.success() {
            tracing::error!(section = section.title, status = %output.status, "analysis failed");
            return Err(AnalysisError::Section {
                section: section.title,
                status: output.status.to_string(),
            });
        }

        Ok(output.stdout)
    }
}

/// Listing ids end up in a file name; keep them to a single path component.
fn validate_listing(listing: &str) -> Result<(), AnalysisError> {
    let trimmed = listing.trim();
    if trimmed.is_empty()
        || trimmed != listing
        || listing.contains(['/', '\\'])
        || listing == "."
        || listing == ".."
    {
        return Err(AnalysisError::InvalidListing(listing.to_string()));
    }
    Ok(())
}

fn write_run_header(out: &mut impl Write, listing: &str) -> io::Result<()> {
    let now = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown time".to_string());
    writeln!(
        out,
        "# Analysis of {listing}\n\n_Generated by {APP_NAME} {} on {now}_\n",
        version_label()
    )
}

fn write_section(
    out: &mut impl Write,
    section: &AnalysisSection,
    content: &[u8],
) -> io::Result<()> {
    write!(out, "## {}\n\n", section.title)?;
    out.write_all(content)?;
    write!(out, "\n\n")
}

fn output_error(path: &Path, source: io::Error) -> AnalysisError {
    AnalysisError::Output {
        path: path.display().to_string(),
        source,
    }
}
