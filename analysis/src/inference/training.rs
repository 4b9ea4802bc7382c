use crate::utils::config::Config;
use crate::utils::logging::*;
use std::process::Stdio;
use tokio::process::Command as AsyncCommand;

/// `detect train key=value ...` for the Ultralytics command line.
pub fn training_arguments(config: &Config) -> Vec<String> {
    let training = &config.training;
    let pretrained = if training.pretrained { "True" } else { "False" };
    vec![
        "detect".to_string(),
        "train".to_string(),
        format!("data={}", config.resolve(&training.dataset_yaml).display()),
        format!("model={}", training.model),
        format!("imgsz={}", training.imgsz),
        format!("epochs={}", training.epochs),
        format!("batch={}", training.batch),
        format!("patience={}", training.patience),
        format!("close_mosaic={}", training.close_mosaic),
        format!("project={}", config.resolve(&training.project).display()),
        format!("name={}", training.name),
        format!("pretrained={}", pretrained),
        format!("device={}", training.device),
    ]
}

/// Runs the trainer to completion with inherited output.
pub async fn train(config: &Config) -> Result<(), LogEntry> {
    let dataset_yaml = config.resolve(&config.training.dataset_yaml);
    if !dataset_yaml.is_file() {
        Err(error_entry!(DatasetEntry::MissingDatasetYaml(dataset_yaml.display().to_string())))?
    }
    let arguments = training_arguments(config);
    logging_information!(format!("Training with {}", dataset_yaml.display()), format!("{} {}", config.training.command, arguments.join(" ")));
    let mut process = AsyncCommand::new(&config.training.command)
        .args(&arguments)
        .current_dir(&config.project_root)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|err| error_entry!(SystemEntry::ChildProcessError(format!("{}: {}", config.training.command, err))))?;
    let status = process.wait().await
        .map_err(|err| error_entry!(SystemEntry::ChildProcessError(err.to_string())))?;
    if !status.success() {
        Err(error_entry!(DetectionEntry::TrainerExit(status.code().unwrap_or(-1))))?
    }
    logging_notice!(format!("Training run {} finished", config.training.name));
    Ok(())
}
