//! mrw-meta - Dump metadata from Minolta MRW raw files.
//!
//! Files are loaded concurrently (bounded by `--jobs`); each decode runs on
//! the blocking pool. Results are printed in the order the files were given.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tokio::sync::Semaphore;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mrw_meta::{
    describe_key, load_raw, Config, FileRangeReader, MrwError, MrwMetadata, MrwParser,
    OutputFormat,
};

#[tokio::main]
async fn main() -> ExitCode {
    let config = Config::parse();

    init_logging(config.verbose);

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    info!(
        files = config.files.len(),
        jobs = config.jobs,
        max_size = config.max_size,
        "Decoding MRW files"
    );

    let results = decode_all(&config).await;

    let mut failed = false;
    for (path, result) in &results {
        match result {
            Ok(metadata) => {
                if config.strict && !metadata.diagnostics.is_clean() {
                    failed = true;
                }
            }
            Err(e) => {
                error!(file = %path.display(), "{}", e);
                failed = true;
            }
        }
    }

    let printed = match config.format {
        OutputFormat::Text => {
            for (path, result) in &results {
                print_text(path, result);
            }
            Ok(())
        }
        OutputFormat::Json => print_json(&results),
    };
    if let Err(e) = printed {
        error!("Failed to write output: {}", e);
        return ExitCode::FAILURE;
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "mrw_meta=debug"
    } else {
        "mrw_meta=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// =============================================================================
// Decoding
// =============================================================================

type FileResult = (PathBuf, Result<MrwMetadata, MrwError>);

async fn decode_all(config: &Config) -> Vec<FileResult> {
    let semaphore = Arc::new(Semaphore::new(config.jobs));
    let parser = MrwParser::new().with_max_size(config.max_size);

    let handles: Vec<_> = config
        .files
        .iter()
        .cloned()
        .map(|path| {
            let semaphore = Arc::clone(&semaphore);
            tokio::spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => decode_file(&path, parser).await,
                    Err(e) => Err(MrwError::Io(mrw_meta::IoError::Read(e.to_string()))),
                };
                (path, result)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (handle, path) in handles.into_iter().zip(config.files.iter()) {
        match handle.await {
            Ok(result) => results.push(result),
            Err(e) => results.push((
                path.clone(),
                Err(MrwError::Io(mrw_meta::IoError::Read(format!(
                    "decode task failed: {}",
                    e
                )))),
            )),
        }
    }
    results
}

async fn decode_file(path: &Path, parser: MrwParser) -> Result<MrwMetadata, MrwError> {
    let reader = FileRangeReader::open(path).await?;
    let raw = load_raw(&reader, parser.max_size()).await?;
    debug!(file = %path.display(), bytes = raw.len(), "Loaded file");

    tokio::task::spawn_blocking(move || parser.parse(&raw))
        .await
        .map_err(|e| MrwError::Io(mrw_meta::IoError::Read(format!("decode task failed: {}", e))))?
}

// =============================================================================
// Output
// =============================================================================

fn print_text(path: &Path, result: &Result<MrwMetadata, MrwError>) {
    println!("== {} ==", path.display());

    let metadata = match result {
        Ok(metadata) => metadata,
        Err(e) => {
            println!("error: {}", e);
            println!();
            return;
        }
    };

    if let Some(ref prd) = metadata.prd {
        println!(
            "Camera: {} (version {})",
            prd.camera.unwrap_or("unknown"),
            prd.version
        );
        println!(
            "Sensor: {}x{}, image: {}x{}, {} bit{}",
            prd.sensor_width,
            prd.sensor_height,
            prd.image_width,
            prd.image_height,
            prd.data_size,
            if prd.is_packed() { " packed" } else { "" }
        );
    }
    if let Some(ref wbg) = metadata.wbg {
        println!("White balance: {:?}", wbg.coefficients);
    }
    if let Some(ref rif) = metadata.rif {
        if let Some(iso) = rif.iso {
            println!("ISO: {:.0}", iso);
        }
        if let Some(mode) = rif.color_mode {
            println!("Color mode: {}", mode.name());
        }
    }

    for entry in &metadata.exif {
        match describe_key(&entry.key, &entry.value) {
            Some(meaning) => println!("{} = {} ({})", entry.key, entry.value, meaning),
            None => println!("{} = {}", entry.key, entry.value),
        }
    }

    for warning in metadata.diagnostics.iter() {
        println!("warning: {}", warning);
    }
    println!();
}

fn print_json(results: &[FileResult]) -> Result<(), serde_json::Error> {
    let documents: Vec<_> = results
        .iter()
        .map(|(path, result)| match result {
            Ok(metadata) => serde_json::json!({
                "file": path.display().to_string(),
                "metadata": metadata,
            }),
            Err(e) => serde_json::json!({
                "file": path.display().to_string(),
                "error": e.to_string(),
            }),
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&documents)?);
    Ok(())
}
