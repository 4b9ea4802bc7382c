use crate::utils::logging::*;
use common::detection::reconcile::MatchThreshold;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

#[derive(Debug, Deserialize)]
struct ConfigTable {
    #[serde(rename = "Config")]
    config: Config,
}

/// Settings for every command. Relative paths resolve against `project_root`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Config {
    pub project_root: PathBuf, //empty means discover
    pub dataset_folder: PathBuf,
    pub splits: Vec<String>,
    pub class_names: Vec<String>,
    pub random_seed: u64,
    pub log_file: Option<PathBuf>,
    pub font_path: PathBuf,
    pub font_size: f32, //pixels
    pub border_width: u32, //pixels
    pub exploration: ExplorationConfig,
    pub visualize: VisualizeConfig,
    pub compare: CompareConfig,
    pub detection: DetectionConfig,
    pub tiled_export: TiledExportConfig,
    pub summary: SummaryConfig,
    pub training: TrainingConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ExplorationConfig {
    pub output_folder: PathBuf,
    pub num_visualize: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct VisualizeConfig {
    pub output_folder: PathBuf,
    pub num_samples: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CompareConfig {
    pub image_folder: PathBuf,
    pub output_folder: PathBuf,
    pub num_images: usize,
    pub threshold: MatchThreshold,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DetectionConfig {
    pub model_path: PathBuf,
    pub confidence: f64,
    pub tiling: TilingConfig,
    pub single_shot: BackendConfig,
    pub tiled: BackendConfig,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone)]
#[serde(default)]
pub struct TilingConfig {
    pub slice_height: u32, //pixels
    pub slice_width: u32, //pixels
    pub overlap_height_ratio: f64,
    pub overlap_width_ratio: f64,
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum BackendSource {
    Script,
    Precomputed,
}

/// Where one detector gets its predictions from.
///
/// `Script` runs `command` with `arguments` and reads the JSON payload from
/// stdout. `Precomputed` reads `<prediction_folder>/<image stem>.json`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub source: BackendSource,
    pub command: String,
    pub arguments: Vec<String>,
    pub prediction_folder: PathBuf,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TiledExportConfig {
    pub image_folder: PathBuf,
    pub output_folder: PathBuf,
    pub max_images: usize, //0 means all
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SummaryConfig {
    pub runs: Vec<PathBuf>,
    pub output_folder: PathBuf,
    pub output_file: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct TrainingConfig {
    pub command: String,
    pub dataset_yaml: PathBuf,
    pub model: String,
    pub imgsz: u32,
    pub epochs: u32,
    pub batch: u32,
    pub patience: u32,
    pub close_mosaic: u32,
    pub project: PathBuf,
    pub name: String,
    pub pretrained: bool,
    pub device: String,
}

#[inline(always)]
fn python() -> String {
    #[cfg(target_os = "windows")]
    let python = "python";
    #[cfg(not(target_os = "windows"))]
    let python = "python3";
    python.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: PathBuf::new(),
            dataset_folder: PathBuf::from("data/bosch"),
            splits: vec!["train".to_string(), "valid".to_string(), "test".to_string()],
            class_names: vec!["traffic_light".to_string()],
            random_seed: 0,
            log_file: None,
            font_path: PathBuf::from("assets/DejaVuSans.ttf"),
            font_size: 16.0,
            border_width: 2,
            exploration: ExplorationConfig::default(),
            visualize: VisualizeConfig::default(),
            compare: CompareConfig::default(),
            detection: DetectionConfig::default(),
            tiled_export: TiledExportConfig::default(),
            summary: SummaryConfig::default(),
            training: TrainingConfig::default(),
        }
    }
}

impl Default for ExplorationConfig {
    fn default() -> Self {
        Self {
            output_folder: PathBuf::from("analysis_outputs/bosch_vis"),
            num_visualize: 15,
        }
    }
}

impl Default for VisualizeConfig {
    fn default() -> Self {
        Self {
            output_folder: PathBuf::from("debug/visualize_labels"),
            num_samples: 5,
        }
    }
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            image_folder: PathBuf::from("data/bosch/valid/images"),
            output_folder: PathBuf::from("debug/compare_sahi_vs_single"),
            num_images: 20,
            threshold: MatchThreshold::default(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("experiments/bosch_sanity/weights/best.pt"),
            confidence: 0.25,
            tiling: TilingConfig::default(),
            single_shot: BackendConfig {
                source: BackendSource::Script,
                command: python(),
                arguments: ["script/single_shot.py", "{model}", "{image}", "{conf}"]
                    .iter().map(|argument| argument.to_string()).collect(),
                prediction_folder: PathBuf::from("predictions/single"),
            },
            tiled: BackendConfig {
                source: BackendSource::Script,
                command: python(),
                arguments: ["script/tiled.py", "{model}", "{image}", "{conf}", "{slice_height}", "{slice_width}", "{overlap_height_ratio}", "{overlap_width_ratio}"]
                    .iter().map(|argument| argument.to_string()).collect(),
                prediction_folder: PathBuf::from("predictions/tiled"),
            },
        }
    }
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            slice_height: 512,
            slice_width: 512,
            overlap_height_ratio: 0.2,
            overlap_width_ratio: 0.2,
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            source: BackendSource::Precomputed,
            command: String::new(),
            arguments: Vec::new(),
            prediction_folder: PathBuf::from("predictions"),
        }
    }
}

impl Default for TiledExportConfig {
    fn default() -> Self {
        Self {
            image_folder: PathBuf::from("data/bosch/valid/images"),
            output_folder: PathBuf::from("debug/sahi_tiling_valid"),
            max_images: 50,
        }
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            runs: ["tile640_ov10", "tile640_ov20", "tile640_ov30"].iter()
                .map(|run| Path::new("debug/sahi_ablation").join(run).join("summary.csv"))
                .collect(),
            output_folder: PathBuf::from("debug/sahi_ablation"),
            output_file: "ablation_summary.csv".to_string(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            command: "yolo".to_string(),
            dataset_yaml: PathBuf::from("data/bosch/data.yaml"),
            model: "yolov8n.pt".to_string(),
            imgsz: 1280,
            epochs: 50,
            batch: 8,
            patience: 10,
            close_mosaic: 10,
            project: PathBuf::from("experiments"),
            name: "step4_aug_imgsz1280".to_string(),
            pretrained: true,
            device: "0".to_string(),
        }
    }
}

impl Config {
    /// Reads `path`, falling back to defaults when it does not exist, then
    /// fixes `project_root`.
    pub async fn load(path: &Path) -> Result<Config, LogEntry> {
        let mut config = if fs::try_exists(path).await.unwrap_or(false) {
            let toml_string = fs::read_to_string(path).await
                .map_err(|err| emergency_entry!(IOEntry::ReadFileError(path.display(), err)))?;
            Self::parse(path, &toml_string)?
        } else {
            logging_warning!(SystemEntry::ConfigNotFound, format!("Looked for {}", path.display()));
            Config::default()
        };
        if config.project_root.as_os_str().is_empty() {
            let current_dir = std::env::current_dir()
                .map_err(|err| emergency_entry!(IOEntry::CurrentDirectoryError(err)))?;
            config.project_root = find_project_root(&current_dir);
        }
        logging_information!(SystemEntry::ProjectRoot(config.project_root.display().to_string()));
        Ok(config)
    }

    pub fn parse(path: &Path, toml_string: &str) -> Result<Config, LogEntry> {
        let config_table = toml::from_str::<ConfigTable>(toml_string)
            .map_err(|err| emergency_entry!(IOEntry::TomlDeserializeError(path.display(), err)))?;
        let config = config_table.config;
        if !Self::validate(&config) {
            return Err(emergency_entry!(SystemEntry::InvalidConfig(path.display().to_string())));
        }
        Ok(config)
    }

    pub fn validate(config: &Config) -> bool {
        Config::validate_ratio(config.compare.threshold.iou_match)
            && Config::validate_ratio(config.compare.threshold.iou_dup)
            && Config::validate_ratio(config.detection.confidence)
            && Config::validate_overlap(config.detection.tiling.overlap_height_ratio)
            && Config::validate_overlap(config.detection.tiling.overlap_width_ratio)
            && Config::validate_slice(config.detection.tiling.slice_height)
            && Config::validate_slice(config.detection.tiling.slice_width)
            && Config::validate_border_width(config.border_width)
            && Config::validate_font_size(config.font_size)
            && !config.splits.is_empty()
    }

    fn validate_ratio(value: f64) -> bool {
        (0.0..=1.0).contains(&value)
    }

    fn validate_overlap(value: f64) -> bool {
        (0.0..1.0).contains(&value)
    }

    fn validate_slice(size: u32) -> bool {
        size > 0_u32
    }

    fn validate_border_width(width: u32) -> bool {
        width > 0_u32
    }

    fn validate_font_size(size: f32) -> bool {
        size > 0_f32
    }

    /// Joins `relative` onto the project root; absolute paths are kept.
    pub fn resolve(&self, relative: &Path) -> PathBuf {
        self.project_root.join(relative)
    }

    pub fn dataset_root(&self) -> PathBuf {
        self.resolve(&self.dataset_folder)
    }

    pub fn split_images(&self, split: &str) -> PathBuf {
        self.dataset_root().join(split).join("images")
    }

    pub fn split_labels(&self, split: &str) -> PathBuf {
        self.dataset_root().join(split).join("labels")
    }

    pub fn class_name(&self, class_id: i32) -> String {
        class_name(&self.class_names, class_id)
    }
}

/// Name at index `class_id`, or the id itself when there is none.
pub fn class_name(class_names: &[String], class_id: i32) -> String {
    usize::try_from(class_id).ok()
        .and_then(|index| class_names.get(index))
        .cloned()
        .unwrap_or_else(|| class_id.to_string())
}

/// First ancestor of `start` holding both `data/` and `experiments/`, else `start`.
pub fn find_project_root(start: &Path) -> PathBuf {
    start.ancestors()
        .find(|candidate| candidate.join("data").is_dir() && candidate.join("experiments").is_dir())
        .unwrap_or(start)
        .to_path_buf()
}
