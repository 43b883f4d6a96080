//! Command-line construction for a single job submission.

use se_types::{ArgStyle, JobAssignment};
use std::path::Path;

/// Collapse every run of spaces into a single space.
pub fn collapse_spaces(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut previous_space = false;
    for c in raw.chars() {
        if c == ' ' {
            if previous_space {
                continue;
            }
            previous_space = true;
        } else {
            previous_space = false;
        }
        out.push(c);
    }
    out
}

/// Submission template for a rendered script: `sbatch <path>`.
pub fn sbatch_template(script: &Path) -> String {
    format!("sbatch {}", script.display())
}

/// Builds one shell command per job: the submission template followed by
/// the single-quoted job command (prefix plus parameter tokens).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandBuilder {
    template: String,
    prefix: String,
    style: ArgStyle,
}

impl CommandBuilder {
    pub fn new(template: impl Into<String>, prefix: impl Into<String>, style: ArgStyle) -> Self {
        Self {
            template: template.into(),
            prefix: prefix.into(),
            style,
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// The command the job itself runs, before wrapping.
    pub fn job_command(&self, job: &JobAssignment) -> String {
        format!("{}{}", self.prefix, job.to_args(self.style))
    }

    pub fn build(&self, job: &JobAssignment) -> String {
        collapse_spaces(&format!("{} '{}'", self.template, self.job_command(job)))
    }
}
