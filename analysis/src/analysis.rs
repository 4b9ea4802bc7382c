use crate::comparison::comparator::Comparator;
use crate::comparison::summary;
use crate::dataset::{exploration, labels, structure, visualize};
use crate::inference::detector::Detector;
use crate::inference::{tiled_export, training};
use crate::render::painter::Painter;
use crate::utils::config::Config;
use crate::utils::logging::*;
use clap::Subcommand;
use lazy_static::lazy_static;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

lazy_static! {
    static ref ANALYSIS: RwLock<Analysis> = RwLock::new(Analysis::new());
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Check that every image has a label file and vice versa.
    CheckStructure,
    /// Scan label files for class ids and malformed lines.
    CheckLabels,
    /// Per-split box statistics plus label overlays.
    Explore,
    /// Draw raw labels on a few sampled images per split.
    Visualize,
    /// Compare single-shot and tiled detections on sampled images.
    Compare,
    /// Aggregate per-image comparison reports across runs.
    Summarize {
        /// Per-image report CSV; repeat to summarize several runs.
        #[arg(long = "csv")]
        csv: Vec<PathBuf>,
    },
    /// Run the tiled detector over a folder and save the overlays.
    RunTiled,
    /// Launch the external training run.
    Train,
}

pub struct Analysis {
    log_file: Option<PathBuf>,
}

impl Analysis {
    fn new() -> Self {
        Self {
            log_file: None,
        }
    }

    pub async fn instance() -> RwLockReadGuard<'static, Self> {
        ANALYSIS.read().await
    }

    pub async fn instance_mut() -> RwLockWriteGuard<'static, Self> {
        ANALYSIS.write().await
    }

    /// Loads the configuration and runs one command; failures are logged.
    pub async fn run(config_path: &Path, command: Command) -> bool {
        logging_information!(SystemEntry::Initializing);
        let config = match Config::load(config_path).await {
            Ok(config) => config,
            Err(entry) => {
                logging_entry!(entry);
                return false;
            }
        };
        Self::instance_mut().await.log_file = config.log_file.as_ref().map(|log_file| config.resolve(log_file));
        logging_information!(SystemEntry::InitializeComplete);
        match Self::execute(&config, command).await {
            Ok(()) => true,
            Err(entry) => {
                logging_entry!(entry);
                false
            }
        }
    }

    async fn execute(config: &Config, command: Command) -> Result<(), LogEntry> {
        match command {
            Command::CheckStructure => {
                structure::check_structure(config).await?;
            }
            Command::CheckLabels => {
                labels::check_labels(config).await?;
            }
            Command::Explore => {
                let painter = Arc::new(Self::painter(config).await);
                exploration::explore(config, &painter).await?;
            }
            Command::Visualize => {
                let painter = Arc::new(Self::painter(config).await);
                visualize::visualize(config, &painter).await?;
            }
            Command::Compare => {
                let painter = Arc::new(Self::painter(config).await);
                Comparator::from_config(config, painter).run(config).await?;
            }
            Command::Summarize { csv } => {
                summary::summarize(config, &csv).await?;
            }
            Command::RunTiled => {
                let painter = Arc::new(Self::painter(config).await);
                tiled_export::run_tiled(config, &Detector::tiled(config), &painter).await?;
            }
            Command::Train => {
                training::train(config).await?;
            }
        }
        Ok(())
    }

    async fn painter(config: &Config) -> Painter {
        let painter = Painter::load(config).await;
        if !painter.has_font() {
            logging_notice!("Drawing boxes without text");
        }
        painter
    }

    pub async fn terminate() {
        logging_information!(SystemEntry::Terminating);
        let log_file = Self::instance().await.log_file.clone();
        logging_information!(SystemEntry::TerminateComplete);
        if let Some(log_file) = log_file {
            if let Err(entry) = Logger::save(&log_file).await {
                logging_console!(entry);
            }
        }
    }
}
