//! Sequential job submission.

use se_types::{JobAssignment, SeResult};
use serde_json::json;
use std::io::Write;
use std::process::Command;
use tracing::{debug, info, warn};

use crate::command::CommandBuilder;

/// What happened to one submission command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Accepted,
    Rejected { exit_code: Option<i32> },
}

/// Launches one submission command. Implementations return once the
/// launcher (typically `sbatch`) exits; they never wait on the job itself.
pub trait Submitter {
    fn submit(&mut self, command: &str) -> SeResult<SubmitOutcome>;

    /// Human-readable submitter name.
    fn name(&self) -> &str;
}

/// Runs each command through a POSIX shell, like `system(3)`.
#[derive(Debug, Clone)]
pub struct ShellSubmitter {
    shell: String,
}

impl ShellSubmitter {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }
}

impl Default for ShellSubmitter {
    fn default() -> Self {
        Self::new("sh")
    }
}

impl Submitter for ShellSubmitter {
    fn submit(&mut self, command: &str) -> SeResult<SubmitOutcome> {
        let status = Command::new(&self.shell).arg("-c").arg(command).status()?;
        if status.success() {
            Ok(SubmitOutcome::Accepted)
        } else {
            Ok(SubmitOutcome::Rejected {
                exit_code: status.code(),
            })
        }
    }

    fn name(&self) -> &str {
        "shell"
    }
}

/// Summary of one dispatch loop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Every command built, in dispatch order.
    pub commands: Vec<String>,
    /// Commands handed to the submitter (zero in mock mode).
    pub submitted: usize,
    /// Submissions that failed to launch or exited non-zero.
    pub failed: usize,
    /// Size of the job list before routing.
    pub total_available: usize,
    pub mock: bool,
}

impl DispatchReport {
    pub fn selected(&self) -> usize {
        self.commands.len()
    }

    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "selected": self.selected(),
            "total_available": self.total_available,
            "submitted": self.submitted,
            "failed": self.failed,
            "mock": self.mock,
        })
    }
}

/// Walks the selected jobs in order, printing progress to a sink and
/// either echoing (mock) or submitting each command.
///
/// Submission failures never stop the loop; they are logged and counted.
/// Only write failures on the output sink abort it.
pub struct Dispatcher<S> {
    submitter: S,
    builder: CommandBuilder,
    mock: bool,
}

impl<S: Submitter> Dispatcher<S> {
    pub fn new(submitter: S, builder: CommandBuilder, mock: bool) -> Self {
        Self {
            submitter,
            builder,
            mock,
        }
    }

    pub fn submitter(&self) -> &S {
        &self.submitter
    }

    pub fn into_submitter(self) -> S {
        self.submitter
    }

    pub fn dispatch<W: Write>(
        &mut self,
        selected: &[JobAssignment],
        total_available: usize,
        out: &mut W,
    ) -> SeResult<DispatchReport> {
        let total = selected.len();
        let mut report = DispatchReport {
            commands: Vec::with_capacity(total),
            total_available,
            mock: self.mock,
            ..DispatchReport::default()
        };

        writeln!(out, "Number jobs: {total}/{total_available}")?;

        for (i, job) in selected.iter().enumerate() {
            let command = self.builder.build(job);
            writeln!(out, "{}/{} {}", i + 1, total, command)?;

            if !self.mock {
                report.submitted += 1;
                match self.submitter.submit(&command) {
                    Ok(SubmitOutcome::Accepted) => {
                        debug!(index = i + 1, submitter = self.submitter.name(), "Submitted job");
                    }
                    Ok(SubmitOutcome::Rejected { exit_code }) => {
                        report.failed += 1;
                        warn!(index = i + 1, ?exit_code, command = %command, "Submission exited non-zero");
                    }
                    Err(e) => {
                        report.failed += 1;
                        warn!(index = i + 1, error = %e, command = %command, "Submission failed to launch");
                    }
                }
            }

            report.commands.push(command);
        }

        writeln!(out, "Number jobs: {total}/{total_available}")?;

        info!(
            selected = total,
            total_available,
            submitted = report.submitted,
            failed = report.failed,
            mock = self.mock,
            "Dispatch finished"
        );
        Ok(report)
    }
}
