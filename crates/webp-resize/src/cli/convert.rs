//! The `webp-resize convert` command.
//!
//! Converts a local file, a directory tree, or a remote URL and prints one
//! metadata record per converted image to stdout.

use clap::{Args, ValueEnum};
use std::io::Stdout;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use webp_resize_core::source::file_name_from_url;
use webp_resize_core::{
    Config, DiscoveredFile, FileDiscovery, HttpFetcher, ImageFetcher, ImageMetadata,
    ImageProcessor, OutputFormat, OutputWriter, ProcessOptions,
};

/// Metadata output formats.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum MetadataFormat {
    /// Single JSON object, or an array for directories
    #[default]
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<MetadataFormat> for OutputFormat {
    fn from(format: MetadataFormat) -> Self {
        match format {
            MetadataFormat::Json => OutputFormat::Json,
            MetadataFormat::Jsonl => OutputFormat::JsonLines,
        }
    }
}

/// Arguments for the `convert` command.
#[derive(Args, Debug, Default)]
pub struct ConvertArgs {
    /// Image file or directory (or a URL with --url)
    #[arg(required = true)]
    pub input: String,

    /// Treat INPUT as an http(s) URL to fetch
    #[arg(long)]
    pub url: bool,

    /// Output directory (defaults to next to each source, or the current
    /// directory for URLs)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Bounding box width (defaults to `defaults.max_width`)
    #[arg(long)]
    pub max_width: Option<u32>,

    /// Bounding box height (defaults to `defaults.max_height`)
    #[arg(long)]
    pub max_height: Option<u32>,

    /// WebP quality, clamped to 0..=100 (defaults to `defaults.quality`)
    #[arg(short, long, allow_negative_numbers = true)]
    pub quality: Option<i32>,

    /// Metadata output format
    #[arg(long, value_enum, default_value = "json")]
    pub metadata_format: MetadataFormat,
}

impl ConvertArgs {
    fn options(&self, config: &Config) -> ProcessOptions {
        let mut options = config.defaults.process_options();
        if let Some(width) = self.max_width {
            options.max_width = width;
        }
        if let Some(height) = self.max_height {
            options.max_height = height;
        }
        if let Some(quality) = self.quality {
            options.quality = quality;
        }
        options
    }
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs, config: Config) -> anyhow::Result<()> {
    if matches!(args.max_width, Some(0)) || matches!(args.max_height, Some(0)) {
        anyhow::bail!("--max-width and --max-height must be greater than 0");
    }

    let options = args.options(&config);
    let processor = ImageProcessor::new(config.limits.clone());
    let mut writer = OutputWriter::new(std::io::stdout(), args.metadata_format.into(), true);

    if args.url {
        let fetcher = HttpFetcher::new(&config.limits);
        let metadata = convert_url(
            &fetcher,
            &processor,
            &args.input,
            args.output.as_deref(),
            options,
        )
        .await?;
        writer.write(&metadata)?;
        writer.flush()?;
        return Ok(());
    }

    let input = PathBuf::from(&args.input);
    if !input.exists() {
        anyhow::bail!("Input path does not exist: {:?}", input);
    }

    let files = FileDiscovery::default().discover(&input);
    if input.is_file() {
        let Some(file) = files.first() else {
            anyhow::bail!("Not a supported image file: {:?}", input);
        };
        let root = input.parent().unwrap_or(Path::new(""));
        let target = output_path(&file.path, root, args.output.as_deref());
        if target == file.path {
            anyhow::bail!(
                "Refusing to overwrite {:?}; pass --output to write elsewhere",
                file.path
            );
        }
        let metadata = convert_file(&processor, &file.path, &target, options).await?;
        writer.write(&metadata)?;
        writer.flush()?;
        return Ok(());
    }

    if files.is_empty() {
        tracing::warn!("No supported images found in {:?}", input);
        return Ok(());
    }

    let summary = convert_batch(
        &processor,
        &files,
        &input,
        args.output.as_deref(),
        options,
        &mut writer,
        matches!(args.metadata_format, MetadataFormat::Jsonl),
    )
    .await?;
    summary.print();

    if summary.failed > 0 {
        anyhow::bail!("{} of {} images failed", summary.failed, files.len());
    }
    Ok(())
}

async fn convert_url(
    fetcher: &dyn ImageFetcher,
    processor: &ImageProcessor,
    url: &str,
    out_dir: Option<&Path>,
    options: ProcessOptions,
) -> anyhow::Result<ImageMetadata> {
    let data = fetcher.fetch(url).await?;
    let result = processor.process(data, options).await?;

    let out_dir = out_dir.unwrap_or(Path::new("."));
    tokio::fs::create_dir_all(out_dir).await?;
    let target = out_dir.join(file_name_from_url(url));
    tokio::fs::write(&target, &result.data).await?;

    tracing::info!("Wrote {:?}", target);
    Ok(result.metadata)
}

async fn convert_file(
    processor: &ImageProcessor,
    source: &Path,
    target: &Path,
    options: ProcessOptions,
) -> anyhow::Result<ImageMetadata> {
    let result = processor.process_file(source, options).await?;

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(target, &result.data).await?;

    tracing::debug!(
        "{:?} -> {:?} ({}x{}, {}%)",
        source,
        target,
        result.metadata.new_width,
        result.metadata.new_height,
        result.metadata.size_reduction_percent
    );
    Ok(result.metadata)
}

/// Where the WebP for `source` goes.
///
/// Without `out_dir` the file lands next to its source. With it, the path
/// relative to `root` is mirrored under `out_dir`.
fn output_path(source: &Path, root: &Path, out_dir: Option<&Path>) -> PathBuf {
    let target = source.with_extension("webp");
    match out_dir {
        Some(dir) => {
            let relative = target
                .strip_prefix(root)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| target.file_name().map(PathBuf::from).unwrap_or_default());
            dir.join(relative)
        }
        None => target,
    }
}

#[derive(Debug, Default)]
struct BatchSummary {
    succeeded: u64,
    failed: u64,
    skipped: u64,
    bytes_in: u64,
    bytes_out: u64,
    elapsed: Duration,
}

impl BatchSummary {
    fn print(&self) {
        let total = self.succeeded + self.failed + self.skipped;
        let secs = self.elapsed.as_secs_f64();
        let rate = if secs > 0.0 {
            self.succeeded as f64 / secs
        } else {
            0.0
        };

        eprintln!();
        eprintln!("  ====================================");
        eprintln!("               Summary");
        eprintln!("  ====================================");
        eprintln!("    Succeeded:    {:>8}", self.succeeded);
        if self.failed > 0 {
            eprintln!("    Failed:       {:>8}", self.failed);
        }
        if self.skipped > 0 {
            eprintln!("    Skipped:      {:>8}", self.skipped);
        }
        eprintln!("  ------------------------------------");
        eprintln!("    Total:        {:>8}", total);
        eprintln!("    Input:        {:>7.1} MB", self.bytes_in as f64 / 1_000_000.0);
        eprintln!("    Output:       {:>7.1} MB", self.bytes_out as f64 / 1_000_000.0);
        eprintln!("    Duration:     {:>7.1}s", secs);
        eprintln!("    Rate:         {:>7.1} img/sec", rate);
        eprintln!("  ====================================");
    }
}

/// Convert every discovered file.
///
/// With `stream` each record is printed as soon as it is ready; otherwise
/// all records are printed as one JSON array at the end.
async fn convert_batch(
    processor: &ImageProcessor,
    files: &[DiscoveredFile],
    root: &Path,
    out_dir: Option<&Path>,
    options: ProcessOptions,
    writer: &mut OutputWriter<Stdout>,
    stream: bool,
) -> anyhow::Result<BatchSummary> {
    let progress = create_progress_bar(files.len() as u64);
    let start = Instant::now();
    let mut summary = BatchSummary::default();
    let mut collected = Vec::new();

    for file in files {
        let target = output_path(&file.path, root, out_dir);
        if target == file.path {
            tracing::warn!("Skipping {:?}: output would overwrite the source", file.path);
            summary.skipped += 1;
            progress.inc(1);
            continue;
        }

        match convert_file(processor, &file.path, &target, options.clone()).await {
            Ok(metadata) => {
                summary.succeeded += 1;
                summary.bytes_in += metadata.original_size_bytes;
                summary.bytes_out += metadata.new_size_bytes;
                if stream {
                    progress.suspend(|| writer.write(&metadata))?;
                } else {
                    collected.push(metadata);
                }
            }
            Err(e) => {
                summary.failed += 1;
                tracing::error!("Failed: {:?} - {}", file.path, e);
            }
        }

        progress.inc(1);
        let secs = start.elapsed().as_secs_f64();
        if secs > 0.0 {
            progress.set_message(format!(
                "{:.1} img/sec",
                (summary.succeeded + summary.failed) as f64 / secs
            ));
        }
    }

    progress.finish_and_clear();
    if !stream && !collected.is_empty() {
        writer.write_all(&collected)?;
    }
    writer.flush()?;

    summary.elapsed = start.elapsed();
    Ok(summary)
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}
