//! Run configuration: the options that drive one sweep submission.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::SeResult;
use crate::params::{ArgStyle, ParameterGrid};

/// Requested wall-clock time for every job of the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobDuration {
    pub days: f64,
    pub hours: f64,
    pub minutes: f64,
    /// Reserved; accepted for compatibility and not used by rendering.
    pub prestop_training_hours: f64,
}

impl Default for JobDuration {
    fn default() -> Self {
        Self {
            days: 0.0,
            hours: 12.0,
            minutes: 0.0,
            prestop_training_hours: -1.0,
        }
    }
}

impl JobDuration {
    pub fn new(days: f64, hours: f64, minutes: f64) -> Self {
        Self {
            days,
            hours,
            minutes,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SeResult<()> {
        for (field, value) in [
            ("days", self.days),
            ("hours", self.hours),
            ("minutes", self.minutes),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(crate::config_error!(
                    "duration.{field} must be a non-negative number, got {value}"
                ));
            }
        }
        Ok(())
    }

    /// Whole seconds covered by the duration (fractions truncated).
    pub fn total_seconds(&self) -> u64 {
        let seconds = self.days * 86_400.0 + self.hours * 3_600.0 + self.minutes * 60.0;
        seconds.max(0.0) as u64
    }
}

/// Which part of the shuffled job list this host runs.
///
/// JSON form is either `[start, end]` (each may be `null`) or an object
/// mapping hostname substrings to weights, in priority order. Range bounds
/// may be negative, counting back from the end of the job list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubsetSpec {
    Range(Option<i64>, Option<i64>),
    Weighted(IndexMap<String, f64>),
}

impl Default for SubsetSpec {
    fn default() -> Self {
        Self::Range(Some(0), None)
    }
}

impl SubsetSpec {
    pub fn all() -> Self {
        Self::Range(None, None)
    }

    pub fn range(start: Option<i64>, end: Option<i64>) -> Self {
        Self::Range(start, end)
    }

    pub fn weighted<K: Into<String>>(hosts: impl IntoIterator<Item = (K, f64)>) -> Self {
        Self::Weighted(hosts.into_iter().map(|(k, w)| (k.into(), w)).collect())
    }
}

/// Resource request rendered into the batch script header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchScriptSpec {
    pub duration: JobDuration,
    pub account: String,
    pub n_gpus: u32,
    pub mem: String,
    pub cpus_per_task: u32,
    /// Shell lines run before the job command.
    pub bash_prelines: String,
    /// Replaces the whole generated directive block when set.
    pub config_lines: Option<String>,
}

impl Default for BatchScriptSpec {
    fn default() -> Self {
        Self {
            duration: JobDuration::default(),
            account: String::new(),
            n_gpus: 0,
            mem: "32G".to_string(),
            cpus_per_task: 4,
            bash_prelines: String::new(),
            config_lines: None,
        }
    }
}

/// Top-level configuration for one submission run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Grids to sweep. `None` submits `init_command` once, unparameterized.
    pub experiments: Option<Vec<ParameterGrid>>,
    pub subset: SubsetSpec,
    /// Prefix of every job command, e.g. `"python train.py "`.
    pub init_command: String,
    /// Overrides the `sbatch <script>` submission template entirely.
    pub run_string: Option<String>,
    pub is_argparse: bool,
    pub sh_save_dir: PathBuf,
    pub account: String,
    pub duration: JobDuration,
    pub n_gpus: u32,
    /// Prefix of the rendered script's file name.
    pub id: String,
    pub mem: String,
    pub cpus_per_task: u32,
    pub mock_send: bool,
    pub bash_prelines: String,
    pub shs_config_lines: Option<String>,
    pub shuffle_seed: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            experiments: None,
            subset: SubsetSpec::default(),
            init_command: "python language_main.py ".to_string(),
            run_string: None,
            is_argparse: true,
            sh_save_dir: PathBuf::new(),
            account: String::new(),
            duration: JobDuration::default(),
            n_gpus: 0,
            id: String::new(),
            mem: "8G".to_string(),
            cpus_per_task: 2,
            mock_send: false,
            bash_prelines: String::new(),
            shs_config_lines: None,
            shuffle_seed: 0,
        }
    }
}

impl RunConfig {
    pub fn new(experiments: Vec<ParameterGrid>) -> Self {
        Self {
            experiments: Some(experiments),
            ..Self::default()
        }
    }

    pub fn from_json_str(raw: &str) -> SeResult<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> SeResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            crate::config_error!("failed to read config {}: {e}", path.as_ref().display())
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> SeResult<()> {
        self.duration.validate()
    }

    pub fn arg_style(&self) -> ArgStyle {
        ArgStyle::from_is_argparse(self.is_argparse)
    }

    pub fn batch_script_spec(&self) -> BatchScriptSpec {
        BatchScriptSpec {
            duration: self.duration.clone(),
            account: self.account.clone(),
            n_gpus: self.n_gpus,
            mem: self.mem.clone(),
            cpus_per_task: self.cpus_per_task,
            bash_prelines: self.bash_prelines.clone(),
            config_lines: self.shs_config_lines.clone(),
        }
    }

    pub fn with_subset(mut self, subset: SubsetSpec) -> Self {
        self.subset = subset;
        self
    }

    pub fn with_init_command(mut self, command: impl Into<String>) -> Self {
        self.init_command = command.into();
        self
    }

    pub fn with_run_string(mut self, run_string: impl Into<String>) -> Self {
        self.run_string = Some(run_string.into());
        self
    }

    pub fn with_argparse(mut self, is_argparse: bool) -> Self {
        self.is_argparse = is_argparse;
        self
    }

    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>, id: impl Into<String>) -> Self {
        self.sh_save_dir = dir.into();
        self.id = id.into();
        self
    }

    pub fn with_resources(
        mut self,
        account: impl Into<String>,
        n_gpus: u32,
        mem: impl Into<String>,
        cpus_per_task: u32,
    ) -> Self {
        self.account = account.into();
        self.n_gpus = n_gpus;
        self.mem = mem.into();
        self.cpus_per_task = cpus_per_task;
        self
    }

    pub fn with_duration(mut self, duration: JobDuration) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_bash_prelines(mut self, lines: impl Into<String>) -> Self {
        self.bash_prelines = lines.into();
        self
    }

    pub fn with_config_lines(mut self, lines: impl Into<String>) -> Self {
        self.shs_config_lines = Some(lines.into());
        self
    }

    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock_send = mock;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = seed;
        self
    }
}
