use crate::utils::config::{BackendConfig, BackendSource, Config, TilingConfig};
use crate::utils::file;
use crate::utils::logging::*;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::fs;
use tokio::process::Command as AsyncCommand;

/// Produces the raw JSON prediction payload for one image.
#[derive(Debug, Clone)]
pub struct Backend {
    source: BackendSource,
    command: String,
    arguments: Vec<String>,
    prediction_folder: PathBuf,
    working_folder: PathBuf,
    model_path: PathBuf,
    confidence: f64,
    tiling: TilingConfig,
}

impl Backend {
    pub fn new(config: &Config, backend: &BackendConfig) -> Self {
        Self {
            source: backend.source,
            command: backend.command.clone(),
            arguments: backend.arguments.clone(),
            prediction_folder: config.resolve(&backend.prediction_folder),
            working_folder: config.project_root.clone(),
            model_path: config.resolve(&config.detection.model_path),
            confidence: config.detection.confidence,
            tiling: config.detection.tiling,
        }
    }

    /// Fills `{image}`, `{model}`, `{conf}` and the tiling placeholders.
    pub fn substitute(&self, argument: &str, image: &Path) -> String {
        argument
            .replace("{image}", &image.display().to_string())
            .replace("{model}", &self.model_path.display().to_string())
            .replace("{conf}", &self.confidence.to_string())
            .replace("{slice_height}", &self.tiling.slice_height.to_string())
            .replace("{slice_width}", &self.tiling.slice_width.to_string())
            .replace("{overlap_height_ratio}", &self.tiling.overlap_height_ratio.to_string())
            .replace("{overlap_width_ratio}", &self.tiling.overlap_width_ratio.to_string())
    }

    pub async fn predict(&self, image: &Path) -> Result<String, LogEntry> {
        match self.source {
            BackendSource::Script => self.run_script(image).await,
            BackendSource::Precomputed => self.read_precomputed(image).await,
        }
    }

    async fn run_script(&self, image: &Path) -> Result<String, LogEntry> {
        let arguments: Vec<String> = self.arguments.iter()
            .map(|argument| self.substitute(argument, image))
            .collect();
        let mut command = AsyncCommand::new(&self.command);
        command.args(&arguments)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if file::is_directory(&self.working_folder).await {
            command.current_dir(&self.working_folder);
        }
        let output = command.output().await
            .map_err(|err| error_entry!(SystemEntry::ChildProcessError(format!("{}: {}", self.command, err))))?;
        if !output.status.success() {
            let err = format!("Process exit with code: {}", output.status.code().unwrap_or(-1));
            Err(error_entry!(SystemEntry::ChildProcessError(err), String::from_utf8_lossy(&output.stderr).to_string()))?
        }
        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn read_precomputed(&self, image: &Path) -> Result<String, LogEntry> {
        let prediction_file = self.prediction_folder.join(format!("{}.json", file::file_stem(image)));
        fs::read_to_string(&prediction_file).await
            .map_err(|err| error_entry!(IOEntry::ReadFileError(prediction_file.display(), err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::config::DetectionConfig;

    fn backend(source: BackendSource, command: &str, arguments: &[&str], prediction_folder: &Path) -> Backend {
        let mut config = Config::default();
        config.project_root = PathBuf::from("/srv/project");
        let backend_config = BackendConfig {
            source,
            command: command.to_string(),
            arguments: arguments.iter().map(|argument| argument.to_string()).collect(),
            prediction_folder: prediction_folder.to_path_buf(),
        };
        Backend::new(&config, &backend_config)
    }

    #[test]
    fn placeholders_are_substituted() {
        let script = backend(BackendSource::Script, "python3", &[], Path::new("predictions"));
        assert_eq!(script.substitute("{image}", Path::new("/tmp/a.jpg")), "/tmp/a.jpg");
        assert_eq!(script.substitute("{model}", Path::new("a.jpg")), "/srv/project/experiments/bosch_sanity/weights/best.pt");
        assert_eq!(script.substitute("--conf={conf}", Path::new("a.jpg")), "--conf=0.25");
        assert_eq!(script.substitute("{slice_height}x{slice_width}", Path::new("a.jpg")), "512x512");
        assert_eq!(script.substitute("{overlap_height_ratio}/{overlap_width_ratio}", Path::new("a.jpg")), "0.2/0.2");
    }

    #[tokio::test]
    async fn precomputed_payload_is_read_by_stem() {
        let temp = tempfile::tempdir().expect("create temp dir");
        std::fs::write(temp.path().join("frame_01.json"), "[]").expect("write prediction");
        let precomputed = backend(BackendSource::Precomputed, "", &[], temp.path());
        assert_eq!(precomputed.predict(Path::new("/images/frame_01.jpg")).await.expect("payload"), "[]");
        assert!(precomputed.predict(Path::new("/images/frame_02.jpg")).await.is_err());
    }

    #[test]
    fn default_scripts_ship_with_the_crate() {
        let repository = Path::new(env!("CARGO_MANIFEST_DIR")).join("..");
        let detection = DetectionConfig::default();
        for backend_config in [&detection.single_shot, &detection.tiled] {
            assert_eq!(backend_config.source, BackendSource::Script);
            let script = repository.join(&backend_config.arguments[0]);
            assert!(script.is_file(), "{} is missing", script.display());
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn script_stdout_is_the_payload() {
        let echo = backend(BackendSource::Script, "echo", &["{conf}"], Path::new("predictions"));
        assert_eq!(echo.predict(Path::new("a.jpg")).await.expect("payload").trim(), "0.25");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_script_is_an_error() {
        let failing = backend(BackendSource::Script, "false", &[], Path::new("predictions"));
        assert!(failing.predict(Path::new("a.jpg")).await.is_err());
        let missing = backend(BackendSource::Script, "definitely-not-a-command", &[], Path::new("predictions"));
        assert!(missing.predict(Path::new("a.jpg")).await.is_err());
    }
}
