use crate::inference::detector::Detector;
use crate::render::image_io;
use crate::render::painter::Painter;
use crate::utils::config::Config;
use crate::utils::file::{self, SAMPLE_IMAGE_EXTENSIONS};
use crate::utils::logging::*;
use common::detection::reconcile::Reconciler;
use common::report::image_report::{ImageReport, ImageReportWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task;

pub const REPORT_FILE: &str = "summary.csv";

/// Output layout of one comparison run.
#[derive(Debug, Clone)]
pub struct OutputFolders {
    pub root: PathBuf,
    pub single: PathBuf,
    pub sahi: PathBuf,
    pub side_by_side: PathBuf,
}

impl OutputFolders {
    pub fn new(root: PathBuf) -> Self {
        Self {
            single: root.join("single"),
            sahi: root.join("sahi"),
            side_by_side: root.join("side_by_side"),
            root,
        }
    }

    pub fn report_file(&self) -> PathBuf {
        self.root.join(REPORT_FILE)
    }

    pub async fn create(&self) -> Result<(), LogEntry> {
        for folder in [&self.root, &self.single, &self.sahi, &self.side_by_side] {
            file::create_folder(folder).await?;
        }
        Ok(())
    }
}

/// Runs both detectors per image, reconciles their boxes and renders overlays.
pub struct Comparator {
    single_shot: Detector,
    tiled: Detector,
    painter: Arc<Painter>,
    reconciler: Reconciler,
}

impl Comparator {
    pub fn new(single_shot: Detector, tiled: Detector, painter: Arc<Painter>, reconciler: Reconciler) -> Self {
        Self { single_shot, tiled, painter, reconciler }
    }

    pub fn from_config(config: &Config, painter: Arc<Painter>) -> Self {
        Self::new(
            Detector::single_shot(config),
            Detector::tiled(config),
            painter,
            Reconciler::new(config.compare.threshold),
        )
    }

    /// Seeded sample of the image folder, in sampled order.
    pub async fn select_images(config: &Config) -> Result<Vec<PathBuf>, LogEntry> {
        let image_folder = config.resolve(&config.compare.image_folder);
        let candidates = file::list_files(&image_folder, |path| file::has_extension(path, &SAMPLE_IMAGE_EXTENSIONS)).await?;
        Ok(file::sample(&candidates, config.compare.num_images, config.random_seed))
    }

    pub async fn compare_image(&self, image_path: &Path, folders: &OutputFolders) -> Result<ImageReport, LogEntry> {
        let image = image_io::read_rgb(image_path).await?;
        let single = self.single_shot.detect(image_path).await?;
        let tiled = self.tiled.detect(image_path).await?;
        let name = file::file_name(image_path);
        let report = ImageReport::reconcile(name.clone(), &single, &tiled, &self.reconciler);

        let painter = self.painter.clone();
        let (single_overlay, tiled_overlay, composite) = task::spawn_blocking(move || painter.render_comparison(&image, &single.boxes, &tiled.boxes))
            .await
            .map_err(|err| error_entry!(SystemEntry::TaskPanickedError(err)))?;
        image_io::write_rgb(single_overlay, &folders.single.join(&name)).await?;
        image_io::write_rgb(tiled_overlay, &folders.sahi.join(&name)).await?;
        image_io::write_rgb(composite, &folders.side_by_side.join(&name)).await?;
        Ok(report)
    }

    /// Images that fail to decode or detect are skipped without a row.
    pub async fn run(&self, config: &Config) -> Result<Vec<ImageReport>, LogEntry> {
        let folders = OutputFolders::new(config.resolve(&config.compare.output_folder));
        folders.create().await?;
        let mut writer = ImageReportWriter::create(&folders.report_file())?;
        let images = Self::select_images(config).await?;
        let threshold = self.reconciler.threshold();
        logging_information!(
            format!("Comparing {} images into {}", images.len(), folders.root.display()),
            format!("iou_match={} iou_dup={}", threshold.iou_match, threshold.iou_dup)
        );
        let mut reports = Vec::new();
        for image_path in &images {
            let report = match self.compare_image(image_path, &folders).await {
                Ok(report) => report,
                Err(entry) => {
                    logging_warning!(DetectionEntry::ImageSkipped(file::file_name(image_path), entry.message), entry.debug_info);
                    continue;
                }
            };
            writer.append(&report)?;
            logging_information!(DetectionEntry::ImageCompared(report.image.clone(), report.num_single, report.num_sahi, report.num_new, report.dup_pairs));
            reports.push(report);
        }
        logging_notice!(ReportEntry::ReportSaved("comparison report".to_string(), writer.path().display().to_string()));
        Ok(reports)
    }
}
