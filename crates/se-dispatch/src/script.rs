//! Batch script rendering and the on-disk script file.
//!
//! Rendering is a pure function of the [`BatchScriptSpec`]; writing is a
//! separate step so the text can be checked without touching the disk.

use chrono::{DateTime, Local};
use rand::distributions::Alphanumeric;
use rand::Rng;
use se_types::{BatchScriptSpec, JobDuration, SeError, SeResult};
use std::path::{Path, PathBuf};
use tracing::info;

/// Positional parameter that receives the job command at submission time.
pub const COMMAND_PLACEHOLDER: &str = "$1";

const SHEBANG: &str = "#!/bin/bash";
const SUFFIX_LEN: usize = 5;

/// `HH:MM:00` time limit. Hours are not wrapped into days, so a two day
/// duration renders as `48:00:00`; leftover seconds are dropped.
pub fn format_time_limit(duration: &JobDuration) -> String {
    let total = duration.total_seconds();
    let hours = total / 3_600;
    let minutes = (total % 3_600) / 60;
    format!("{hours:02}:{minutes:02}:00")
}

/// Default `#SBATCH` directive block, one directive per line, each line
/// preceded by a newline.
pub fn render_directives(spec: &BatchScriptSpec) -> String {
    let mut block = format!(
        "\n#SBATCH --time={}\n#SBATCH --account={}\n#SBATCH --mem {}\n#SBATCH --cpus-per-task {}\n",
        format_time_limit(&spec.duration),
        spec.account,
        spec.mem,
        spec.cpus_per_task,
    );
    if spec.n_gpus > 0 {
        block.push_str(&format!("#SBATCH --gres=gpu:{}\n", spec.n_gpus));
    }
    block
}

/// Full script text: shebang, directives (or the caller's override),
/// pre-command lines, then the command placeholder.
pub fn render(spec: &BatchScriptSpec) -> String {
    let directives = match &spec.config_lines {
        Some(lines) if lines.starts_with('\n') => lines.clone(),
        Some(lines) => format!("\n{lines}"),
        None => render_directives(spec),
    };
    format!(
        "{SHEBANG}{directives}\n{}\n{COMMAND_PLACEHOLDER}",
        spec.bash_prelines
    )
}

/// `<id>--<YYYY-mm-dd_HH-MM-SS><suffix>.sh`
pub fn script_file_name(id: &str, now: DateTime<Local>, suffix: &str) -> String {
    format!("{id}--{}{suffix}.sh", now.format("%Y-%m-%d_%H-%M-%S"))
}

fn random_suffix<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..SUFFIX_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

/// Writes rendered scripts into one directory. The directory must already
/// exist; the files are left in place for the scheduler and never removed.
#[derive(Debug, Clone)]
pub struct ScriptWriter {
    dir: PathBuf,
}

impl ScriptWriter {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Render `spec` and write it under a unique name; returns the path.
    pub fn write(&self, id: &str, spec: &BatchScriptSpec) -> SeResult<PathBuf> {
        self.write_with_rng(id, spec, &mut rand::thread_rng())
    }

    pub fn write_with_rng<R: Rng + ?Sized>(
        &self,
        id: &str,
        spec: &BatchScriptSpec,
        rng: &mut R,
    ) -> SeResult<PathBuf> {
        let name = script_file_name(id, Local::now(), &random_suffix(rng));
        let path = self.dir.join(name);
        let contents = render(spec);

        std::fs::write(&path, contents).map_err(|e| SeError::Script {
            path: path.clone(),
            message: e.to_string(),
        })?;

        info!(path = %path.display(), "Wrote batch script");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::SeedableRng;

    fn spec(n_gpus: u32) -> BatchScriptSpec {
        BatchScriptSpec {
            duration: JobDuration::new(0.0, 23.0, 0.0),
            account: "def-lab".to_string(),
            n_gpus,
            mem: "40G".to_string(),
            cpus_per_task: 4,
            bash_prelines: "module load python\ncd /project".to_string(),
            config_lines: None,
        }
    }

    #[test]
    fn time_limit_formatting() {
        assert_eq!(format_time_limit(&JobDuration::new(0.0, 12.0, 0.0)), "12:00:00");
        assert_eq!(format_time_limit(&JobDuration::new(0.0, 0.0, 59.0)), "00:59:00");
        assert_eq!(format_time_limit(&JobDuration::new(2.0, 1.0, 5.0)), "49:05:00");
        assert_eq!(format_time_limit(&JobDuration::new(0.0, 0.0, 90.5)), "01:30:00");
        assert_eq!(format_time_limit(&JobDuration::new(5.0, 0.0, 0.0)), "120:00:00");
    }

    #[test]
    fn renders_full_script() {
        let text = render(&spec(2));
        assert_eq!(
            text,
            "#!/bin/bash\n\
             #SBATCH --time=23:00:00\n\
             #SBATCH --account=def-lab\n\
             #SBATCH --mem 40G\n\
             #SBATCH --cpus-per-task 4\n\
             #SBATCH --gres=gpu:2\n\
             \n\
             module load python\n\
             cd /project\n\
             $1"
        );
    }

    #[test]
    fn zero_gpus_omits_the_gres_line() {
        let text = render(&spec(0));
        assert!(!text.contains("--gres"));
        assert!(!text.lines().any(|l| l.contains("gpu")));

        let text = render(&spec(2));
        let gres: Vec<&str> = text.lines().filter(|l| l.contains("--gres")).collect();
        assert_eq!(gres, vec!["#SBATCH --gres=gpu:2"]);
    }

    #[test]
    fn override_bypasses_default_directives() {
        let mut custom = spec(1);
        custom.config_lines = Some("\n#SBATCH -N 1\n#SBATCH -q shared\n".to_string());
        let text = render(&custom);

        assert!(text.starts_with("#!/bin/bash\n#SBATCH -N 1\n#SBATCH -q shared\n"));
        assert!(!text.contains("--time"));
        assert!(!text.contains("--gres"));
        assert!(text.ends_with("\n$1"));

        custom.config_lines = Some("#SBATCH -C gpu".to_string());
        assert!(render(&custom).starts_with("#!/bin/bash\n#SBATCH -C gpu\n"));
    }

    #[test]
    fn placeholder_is_last_line() {
        let text = render(&BatchScriptSpec::default());
        assert_eq!(text.lines().next(), Some("#!/bin/bash"));
        assert_eq!(text.lines().last(), Some(COMMAND_PLACEHOLDER));
    }

    #[test]
    fn file_name_layout() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(
            script_file_name("transformers", now, "aB3xZ"),
            "transformers--2024-03-09_14-05-07aB3xZ.sh"
        );
    }

    #[test]
    fn writes_script_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ScriptWriter::new(dir.path());
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);

        let path = writer.write_with_rng("sweep", &spec(0), &mut rng).unwrap();
        assert_eq!(path.parent(), Some(dir.path()));

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("sweep--"));
        assert!(name.ends_with(".sh"));
        let suffix = &name[name.len() - 3 - SUFFIX_LEN..name.len() - 3];
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));

        assert_eq!(std::fs::read_to_string(&path).unwrap(), render(&spec(0)));
    }

    #[test]
    fn missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ScriptWriter::new(dir.path().join("does-not-exist"));
        let err = writer.write("sweep", &spec(0)).unwrap_err();
        assert!(matches!(err, SeError::Script { .. }));
    }
}
