use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use fstregions::annotation::{ChromosomeNaming, DEFAULT_CHROM_PREFIX, DEFAULT_REPORT_THRESHOLD};
use fstregions::cluster::{DEFAULT_CLUSTER_THRESHOLD, DEFAULT_GAP_LIMIT};
use fstregions::outliers::{DEFAULT_SWEEP_THRESHOLDS, DEFAULT_TOP_K};
use fstregions::{report, windows, AnnotationReader, OutlierSelector, Pipeline, PipelineConfig, Window};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "fstregions",
    version,
    about = "Cluster high-FST windows and find co-occurring genes"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Count windows above each threshold and list the top-ranked ones.
    Sweep {
        /// Windowed FST table (tab- or comma-delimited).
        #[arg(long)]
        fst: PathBuf,
        /// Thresholds to evaluate.
        #[arg(long = "sweep", value_delimiter = ',', default_values_t = DEFAULT_SWEEP_THRESHOLDS.to_vec())]
        thresholds: Vec<f64>,
        /// Ranked rows shown per threshold.
        #[arg(long, default_value_t = DEFAULT_TOP_K)]
        top: usize,
    },
    /// Write the ranked high-FST window table.
    Regions {
        /// Windowed FST table (tab- or comma-delimited).
        #[arg(long)]
        fst: PathBuf,
        /// Destination CSV.
        #[arg(long, default_value = "high_fst_regions.csv")]
        output: PathBuf,
        /// Minimum weighted FST.
        #[arg(long, default_value_t = DEFAULT_REPORT_THRESHOLD)]
        threshold: f64,
    },
    /// Merge nearby outlier windows into multi-locus regions.
    Clusters {
        /// High-FST window table.
        #[arg(long)]
        input: PathBuf,
        /// Destination CSV.
        #[arg(long, default_value = "multi_locus_clusters.csv")]
        output: PathBuf,
        /// Minimum weighted FST for clustered windows.
        #[arg(long = "cluster-threshold", default_value_t = DEFAULT_CLUSTER_THRESHOLD)]
        threshold: f64,
        /// Largest gap in bp between consecutive windows of a region.
        #[arg(long, default_value_t = DEFAULT_GAP_LIMIT)]
        gap_limit: u64,
    },
    /// Report chromosomes where several genes overlap significant windows.
    Genes {
        /// High-FST window table.
        #[arg(long)]
        input: PathBuf,
        /// GFF annotation.
        #[arg(long)]
        annotation: PathBuf,
        /// Destination GFF.
        #[arg(long, default_value = "cooccurring_genes.gff")]
        output: PathBuf,
        /// Minimum weighted FST for significant windows.
        #[arg(long = "report-threshold", default_value_t = DEFAULT_REPORT_THRESHOLD)]
        threshold: f64,
        #[command(flatten)]
        naming: NamingArgs,
    },
    /// Run every stage and write all reports into one directory.
    Run {
        /// Windowed FST table (tab- or comma-delimited).
        #[arg(long)]
        fst: PathBuf,
        /// GFF annotation.
        #[arg(long)]
        annotation: PathBuf,
        /// Output directory.
        #[arg(long, default_value = "fst_results")]
        outdir: PathBuf,
        #[command(flatten)]
        options: PipelineArgs,
    },
}

#[derive(Args, Debug)]
struct NamingArgs {
    /// Prefix turning a window chromosome into an annotation chromosome.
    #[arg(long, default_value = DEFAULT_CHROM_PREFIX)]
    chrom_prefix: String,
    /// Two-column TSV of explicit window/annotation chromosome names.
    #[arg(long)]
    chrom_aliases: Option<PathBuf>,
}

impl NamingArgs {
    fn into_naming(self) -> Result<ChromosomeNaming> {
        let naming = ChromosomeNaming::with_prefix(self.chrom_prefix);
        match self.chrom_aliases {
            Some(path) => naming
                .load_aliases(&path)
                .with_context(|| format!("failed to load chromosome aliases from {}", path.display())),
            None => Ok(naming),
        }
    }
}

#[derive(Args, Debug)]
struct PipelineArgs {
    /// Thresholds of the diagnostic sweep.
    #[arg(long = "sweep", value_delimiter = ',', default_values_t = DEFAULT_SWEEP_THRESHOLDS.to_vec())]
    sweep_thresholds: Vec<f64>,
    /// Ranked rows shown per sweep threshold.
    #[arg(long = "top", default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
    /// Minimum weighted FST for clustered windows.
    #[arg(long, default_value_t = DEFAULT_CLUSTER_THRESHOLD)]
    cluster_threshold: f64,
    /// Largest gap in bp between consecutive windows of a region.
    #[arg(long, default_value_t = DEFAULT_GAP_LIMIT)]
    gap_limit: u64,
    /// Minimum weighted FST for the high-FST table and gene search.
    #[arg(long, default_value_t = DEFAULT_REPORT_THRESHOLD)]
    report_threshold: f64,
    #[command(flatten)]
    naming: NamingArgs,
}

impl PipelineArgs {
    fn into_config(self) -> Result<PipelineConfig> {
        Ok(PipelineConfig {
            sweep_thresholds: self.sweep_thresholds,
            top_k: self.top_k,
            cluster_threshold: self.cluster_threshold,
            gap_limit: self.gap_limit,
            report_threshold: self.report_threshold,
            naming: self.naming.into_naming()?,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Sweep {
            fst,
            thresholds,
            top,
        } => run_sweep(&fst, thresholds, top)?,
        Commands::Regions {
            fst,
            output,
            threshold,
        } => run_regions(&fst, &output, threshold)?,
        Commands::Clusters {
            input,
            output,
            threshold,
            gap_limit,
        } => run_clusters(&input, &output, threshold, gap_limit)?,
        Commands::Genes {
            input,
            annotation,
            output,
            threshold,
            naming,
        } => run_genes(&input, &annotation, &output, threshold, naming)?,
        Commands::Run {
            fst,
            annotation,
            outdir,
            options,
        } => run_pipeline(&fst, &annotation, &outdir, options)?,
    }

    Ok(())
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load(path: &Path) -> Result<Vec<Window>> {
    windows::load_windows(path)
        .with_context(|| format!("failed to load window table {}", path.display()))
}

fn run_sweep(fst: &Path, thresholds: Vec<f64>, top: usize) -> Result<()> {
    let windows = load(fst)?;
    let pipeline = Pipeline::new(PipelineConfig {
        sweep_thresholds: thresholds,
        top_k: top,
        ..PipelineConfig::default()
    })
    .context("invalid sweep settings")?;

    print!("{}", report::render_summary(&fstregions::FstSummary::from_windows(&windows)));
    print!("{}", report::render_sweep(&pipeline.sweep(&windows)));
    Ok(())
}

fn run_regions(fst: &Path, output: &Path, threshold: f64) -> Result<()> {
    let windows = load(fst)?;
    let pipeline = Pipeline::new(PipelineConfig {
        report_threshold: threshold,
        ..PipelineConfig::default()
    })
    .context("invalid report threshold")?;

    let high = pipeline.high_fst(&windows);
    report::write_table_file(output, |w| report::write_windows(w, high.windows()))?;
    println!(
        "{} windows with FST >= {threshold} written to {}",
        high.len(),
        output.display()
    );
    Ok(())
}

fn run_clusters(input: &Path, output: &Path, threshold: f64, gap_limit: u64) -> Result<()> {
    let windows = load(input)?;
    let pipeline = Pipeline::new(PipelineConfig {
        cluster_threshold: threshold,
        gap_limit,
        ..PipelineConfig::default()
    })
    .context("invalid cluster settings")?;

    let outliers = OutlierSelector::new(threshold).select(&windows).ranked();
    let clusters = pipeline.cluster(&outliers);
    if clusters.is_empty() {
        tracing::warn!(threshold, gap_limit, "no multi-locus clusters found");
    }

    let records = report::cluster_records(&clusters);
    report::write_table_file(output, |w| report::write_clusters(w, &records))?;
    print!("{}", report::render_clusters(&records));
    Ok(())
}

fn run_genes(
    input: &Path,
    annotation: &Path,
    output: &Path,
    threshold: f64,
    naming: NamingArgs,
) -> Result<()> {
    let windows = load(input)?;
    let pipeline = Pipeline::new(PipelineConfig {
        report_threshold: threshold,
        naming: naming.into_naming()?,
        ..PipelineConfig::default()
    })
    .context("invalid report threshold")?;

    let significant = pipeline.high_fst(&windows);
    let reader = AnnotationReader::open(annotation)
        .with_context(|| format!("failed to open annotation {}", annotation.display()))?;
    let cooccurrence = pipeline
        .cooccurring_genes(reader, &significant)
        .with_context(|| format!("failed to intersect annotation {}", annotation.display()))?;
    if cooccurrence.is_empty() {
        tracing::warn!(threshold, "no chromosome with co-occurring genes");
    }

    let text = report::render_cooccurring_genes(&cooccurrence)?;
    std::fs::write(output, text)
        .with_context(|| format!("failed to write {}", output.display()))?;
    print!("{}", report::render_gene_stats(&cooccurrence.stats));
    Ok(())
}

fn run_pipeline(fst: &Path, annotation: &Path, outdir: &Path, options: PipelineArgs) -> Result<()> {
    let pipeline = Pipeline::new(options.into_config()?).context("invalid pipeline settings")?;
    let windows = load(fst)?;

    print!("{}", report::render_summary(&fstregions::FstSummary::from_windows(&windows)));
    print!("{}", report::render_sweep(&pipeline.sweep(&windows)));

    let reader = AnnotationReader::open(annotation)
        .with_context(|| format!("failed to open annotation {}", annotation.display()))?;
    let output = pipeline
        .analyze(&windows, reader)
        .context("pipeline failed")?;
    let files = output
        .write(outdir)
        .with_context(|| format!("failed to write reports into {}", outdir.display()))?;

    println!();
    print!("{}", report::render_clusters(&output.cluster_records));
    println!();
    print!("{}", report::render_gene_stats(&output.cooccurrence.stats));
    println!(
        "\nReports:\n  {}\n  {}\n  {}\n  {}",
        files.high_fst_regions.display(),
        files.multi_locus_clusters.display(),
        files.cooccurring_genes.display(),
        files.gene_groups.display()
    );
    Ok(())
}
