use se_dispatch::ExperimentRunner;
use se_types::{JobDuration, ParameterGrid, RunConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("slurm-emission grid sweep example");

    let sh_dir = std::env::temp_dir().join("slurm-emission-sh");
    std::fs::create_dir_all(&sh_dir)?;

    let bash_prelines = [
        "module unload cudatoolkit; module load conda",
        "conda activate ssms",
        "cd path/to/your/script",
    ]
    .join("\n");

    let experiment = ParameterGrid::new()
        .add("seed", 0..4)
        .add("epochs", [300])
        .add("model", ["transformer", "lstm"])
        .add("dataset", ["cifar", "mnist"]);

    let config = RunConfig::new(vec![experiment])
        .with_init_command("python script.py ")
        .with_bash_prelines(bash_prelines)
        .with_script_dir(&sh_dir, "transformers")
        .with_duration(JobDuration::new(0.0, 23.0, 0.0))
        .with_resources("def-lherrtti", 1, "40G", 4)
        .with_mock(true);

    let report = ExperimentRunner::new(config).run()?;
    println!(
        "Built {} commands ({} submitted), script directory {}",
        report.selected(),
        report.submitted,
        sh_dir.display()
    );

    Ok(())
}
