//! # se-dispatch
//!
//! Batch script rendering and job submission.
//!
//! [`ExperimentRunner`] ties the pieces together: it writes the batch
//! script (unless a `run_string` overrides the submission template), asks
//! `se-sweep` for this host's slice of the shuffled job list, and hands
//! each job to a [`Dispatcher`], which echoes or submits it.

mod command;
mod dispatcher;
mod runner;
mod script;

pub use command::{collapse_spaces, sbatch_template, CommandBuilder};
pub use dispatcher::{DispatchReport, Dispatcher, ShellSubmitter, SubmitOutcome, Submitter};
pub use runner::{current_hostname, run_experiments, ExperimentRunner, RunPlan};
pub use script::{
    format_time_limit, render, render_directives, script_file_name, ScriptWriter,
    COMMAND_PLACEHOLDER,
};
