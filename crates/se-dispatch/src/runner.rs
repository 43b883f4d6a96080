//! End-to-end run: grids to shuffled jobs to this host's slice to
//! submissions.

use se_sweep::{expand, route, RouteBounds, Shuffler};
use se_types::{JobAssignment, JobList, RunConfig, SeResult};
use std::io::Write;
use tracing::info;

use crate::command::{sbatch_template, CommandBuilder};
use crate::dispatcher::{DispatchReport, Dispatcher, ShellSubmitter, Submitter};
use crate::script::ScriptWriter;

/// Hostname of the machine this process runs on.
pub fn current_hostname() -> String {
    gethostname::gethostname().to_string_lossy().into_owned()
}

/// The shuffled job list and the slice routed to one host.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub jobs: JobList,
    pub bounds: RouteBounds,
    pub hostname: String,
}

impl RunPlan {
    pub fn selected(&self) -> &[JobAssignment] {
        self.bounds.slice(&self.jobs)
    }
}

/// Drives one submission run from a [`RunConfig`].
#[derive(Debug, Clone)]
pub struct ExperimentRunner {
    config: RunConfig,
    hostname: Option<String>,
}

impl ExperimentRunner {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            hostname: None,
        }
    }

    /// Route as if running on `hostname` instead of reading it from the OS.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Expand, shuffle and route without touching the disk or the scheduler.
    pub fn plan(&self) -> RunPlan {
        let hostname = self.hostname.clone().unwrap_or_else(current_hostname);

        let mut jobs = match &self.config.experiments {
            Some(grids) => expand(grids),
            None => vec![JobAssignment::new()],
        };
        Shuffler::seeded(self.config.shuffle_seed).shuffle(&mut jobs);

        let bounds = route(jobs.len(), &self.config.subset, &hostname);
        RunPlan {
            jobs,
            bounds,
            hostname,
        }
    }

    /// The submission template: `run_string` if set, otherwise `sbatch`
    /// on a freshly rendered script.
    pub fn submit_template(&self) -> SeResult<String> {
        if let Some(run_string) = &self.config.run_string {
            return Ok(run_string.clone());
        }
        let writer = ScriptWriter::new(&self.config.sh_save_dir);
        let script = writer.write(&self.config.id, &self.config.batch_script_spec())?;
        Ok(sbatch_template(&script))
    }

    /// Run with real shell submissions, printing progress to stdout.
    pub fn run(&self) -> SeResult<DispatchReport> {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        self.run_with(ShellSubmitter::default(), &mut out)
    }

    pub fn run_with<S: Submitter, W: Write>(
        &self,
        submitter: S,
        out: &mut W,
    ) -> SeResult<DispatchReport> {
        self.config.validate()?;

        let template = self.submit_template()?;
        let plan = self.plan();
        info!(
            host = %plan.hostname,
            start = ?plan.bounds.start,
            end = ?plan.bounds.end,
            selected = plan.selected().len(),
            total = plan.jobs.len(),
            "Routed subset"
        );

        let builder = CommandBuilder::new(
            template,
            self.config.init_command.clone(),
            self.config.arg_style(),
        );

        let mut dispatcher = Dispatcher::new(submitter, builder, self.config.mock_send);
        dispatcher.dispatch(plan.selected(), plan.jobs.len(), out)
    }
}

/// Run `config` on this host with shell submissions and stdout progress.
pub fn run_experiments(config: RunConfig) -> SeResult<DispatchReport> {
    ExperimentRunner::new(config).run()
}
