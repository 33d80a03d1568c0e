//! Downloads global relief or geoid grids from ERDDAP as ESRI ASCII files,
//! so the dashboards can run from a local directory with `--data-dir`.
//!
//! The default configuration reads the geoid from the data directory, so
//! the ocean colour map needs `fetch_grids --grid geoid ...` once.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use relief_dashboard::config::default_data_dir;
use relief_dashboard::sources::directory::grid_file_name;
use relief_dashboard::{Dataset, Resolution};
use ron::ser::PrettyConfig;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs as tokio_fs;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

const USER_AGENT: &str = "relief-dashboard";
const DOWNLOAD_CONCURRENCY: usize = 2;
const MANIFEST_FILE: &str = "manifest.ron";

#[derive(Parser, Debug)]
#[command(about = "Download ESRI ASCII relief grids for offline use")]
struct Args {
    /// Output directory (defaults to the user data directory).
    #[arg(long)]
    out: Option<PathBuf>,

    /// Resolutions to fetch.
    #[arg(long, value_delimiter = ',', default_values_t = [
        Resolution::OneDegree,
        Resolution::ThirtyMinutes,
        Resolution::TwentyMinutes,
        Resolution::FifteenMinutes,
        Resolution::TenMinutes,
    ])]
    resolutions: Vec<Resolution>,

    /// Which grid to download; decides the file names.
    #[arg(long, value_enum, default_value_t = Dataset::Relief)]
    grid: Dataset,

    /// ERDDAP server root.
    #[arg(long, default_value = "https://coastwatch.pfeg.noaa.gov/erddap")]
    erddap: String,

    /// Global -180..180 dataset on that server. Defaults to `etopo180` for
    /// relief; required for the geoid.
    #[arg(long)]
    dataset: Option<String>,

    /// Variable of the dataset. Defaults to `altitude` for relief; required
    /// for the geoid.
    #[arg(long)]
    variable: Option<String>,

    /// Download again even when a file exists.
    #[arg(long)]
    force: bool,
}

/// Written next to the grids so a directory documents where it came from.
#[derive(Debug, Serialize)]
struct Manifest {
    grid: Dataset,
    source: String,
    dataset: String,
    variable: String,
    grids: Vec<ManifestEntry>,
}

#[derive(Debug, Serialize)]
struct ManifestEntry {
    resolution: Resolution,
    file: String,
    bytes: u64,
}

/// ERDDAP dataset and variable to read `grid` from.
fn remote_grid(args: &Args) -> color_eyre::Result<(String, String)> {
    let defaults = match args.grid {
        Dataset::Relief => Some(("etopo180", "altitude")),
        Dataset::Geoid => None,
    };
    match (&args.dataset, &args.variable, defaults) {
        (Some(dataset), Some(variable), _) => Ok((dataset.clone(), variable.clone())),
        (dataset, variable, Some((default_dataset, default_variable))) => Ok((
            dataset.clone().unwrap_or_else(|| default_dataset.to_string()),
            variable.clone().unwrap_or_else(|| default_variable.to_string()),
        )),
        (_, _, None) => Err(color_eyre::eyre::eyre!(
            "no default ERDDAP dataset serves the {}; pass --dataset and --variable",
            args.grid
        )),
    }
}

fn grid_url(erddap: &str, dataset: &str, variable: &str, resolution: Resolution) -> String {
    let stride = resolution.arc_minutes();
    format!(
        "{}/griddap/{dataset}.esriAscii?{variable}%5B(-90):{stride}:(90)%5D%5B(-180):{stride}:(180)%5D",
        erddap.trim_end_matches('/'),
    )
}

async fn download_url_to_path(
    client: &reqwest::Client,
    url: &str,
    output_path: &Path,
    force: bool,
) -> color_eyre::Result<u64> {
    if !force && tokio_fs::try_exists(output_path).await.unwrap_or(false) {
        log::info!("Keeping existing {}", output_path.display());
        return Ok(tokio_fs::metadata(output_path).await?.len());
    }

    log::info!("Fetching {url}");
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(color_eyre::eyre::eyre!(
            "Failed to fetch {}: {}",
            url,
            response.status()
        ));
    }

    let bytes = response.bytes().await?;
    // Renamed into place only once complete.
    let partial = output_path.with_extension("part");
    tokio_fs::write(&partial, &bytes).await?;
    tokio_fs::rename(&partial, output_path).await?;

    Ok(bytes.len() as u64)
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let args = Args::parse();
    let (dataset, variable) = remote_grid(&args)?;
    let resolutions = args.resolutions.clone();
    let out = args.out.clone().unwrap_or_else(default_data_dir);
    tokio_fs::create_dir_all(&out).await?;
    println!(
        "Downloading {} {} grids into {}",
        resolutions.len(),
        args.grid,
        out.display()
    );

    let client = reqwest::Client::new();
    let semaphore = Arc::new(Semaphore::new(DOWNLOAD_CONCURRENCY));
    let progress = ProgressBar::new(resolutions.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")?
            .progress_chars("##-"),
    );

    let mut join_set: JoinSet<color_eyre::Result<ManifestEntry>> = JoinSet::new();
    for resolution in resolutions {
        let file = grid_file_name(args.grid, resolution);
        let output_path = out.join(&file);
        let url = grid_url(&args.erddap, &dataset, &variable, resolution);
        let client = client.clone();
        let semaphore = semaphore.clone();
        let force = args.force;

        join_set.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|err| color_eyre::eyre::eyre!(err))?;

            let bytes = download_url_to_path(&client, &url, &output_path, force).await?;
            Ok(ManifestEntry {
                resolution,
                file,
                bytes,
            })
        });
    }

    let mut grids = Vec::new();
    while let Some(result) = join_set.join_next().await {
        let entry = result??;
        progress.set_message(entry.file.clone());
        progress.inc(1);
        grids.push(entry);
    }
    progress.finish_with_message("done");
    grids.sort_by_key(|entry| entry.resolution);

    let manifest = Manifest {
        grid: args.grid,
        source: args.erddap.clone(),
        dataset,
        variable,
        grids,
    };
    let pretty_config = PrettyConfig::new()
        .depth_limit(4)
        .indentor("  ".to_string())
        .struct_names(true);
    let ron_string = ron::ser::to_string_pretty(&manifest, pretty_config)?;
    let manifest_path = out.join(format!("{}_{MANIFEST_FILE}", args.grid));
    tokio_fs::write(&manifest_path, ron_string).await?;
    println!("Wrote {}", manifest_path.display());

    Ok(())
}
