use clap::{Parser, Subcommand};
use face_stickers::harvest::FaceHarvester;
use face_stickers::imaging::{
    DetectorExtractor, FileSource, RustfaceDetector, ThumbnailSpec, collect_picks,
};
use face_stickers::store::StickerStore;
use face_stickers::viewmodel::{ChooseFacesViewModel, StickersViewModel};
use face_stickers::{config, output};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "face-stickers")]
#[command(about = "Make rounded face stickers from your photos")]
#[command(long_about = "\
Make rounded face stickers from your photos

Every face found in the photos you pick becomes a 70×70 PNG sticker with
rounded corners, saved into a sticker collection directory.

Collection layout:

  stickers/
  ├── config.toml          # Optional overrides (see gen-config)
  ├── stickers.json        # Manifest, in insertion order
  └── <id>.png             # One file per sticker

Face detection uses the SeetaFace frontal model. Point [detection] model_path
at seeta_fd_frontal_v1.0.bin; relative paths resolve against the collection
directory.

Run 'face-stickers gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Sticker collection directory
    #[arg(long, default_value = "stickers", global = true)]
    store: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). RUST_LOG wins when set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find faces in photos and save them as stickers
    Add {
        /// Photos or directories of photos
        #[arg(required = true)]
        paths: Vec<PathBuf>,
        /// Report what would be saved without touching the collection
        #[arg(long)]
        dry_run: bool,
    },
    /// List the sticker collection
    List,
    /// Delete stickers by id
    Delete {
        /// Sticker ids (see `list`)
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        ids: Vec<String>,
        /// Delete every sticker
        #[arg(long)]
        all: bool,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Add { paths, dry_run } => add(&cli.store, &paths, dry_run)?,
        Command::List => {
            let store = StickerStore::open(&cli.store)?;
            output::print_sticker_list(store.stickers());
        }
        Command::Delete { ids, all } => delete(&cli.store, ids, all)?,
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn add(store_dir: &Path, paths: &[PathBuf], dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = config::load_config(store_dir)?;
    let mut store = StickerStore::open(store_dir)?;

    let picks = collect_picks(paths, config.picker.selection_limit);
    output::print_picks(&picks, config.picker.selection_limit);
    if picks.paths.is_empty() {
        output::print_harvest_summary(0, 0);
        return Ok(());
    }

    let model_path = resolve_model_path(store_dir, &config.detection.model_path);
    let detector = RustfaceDetector::from_file(&model_path, &config.detection)?;
    let extractor = DetectorExtractor::new(detector, config.detection.face_margin);
    init_thread_pool(&config.processing);

    let (tx, rx) = std::sync::mpsc::channel();
    let labels = picks.paths.clone();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_harvest_event(&event, &labels) {
                println!("{}", line);
            }
        }
    });

    let harvester = FaceHarvester::new(
        Arc::new(FileSource),
        Arc::new(extractor),
        ThumbnailSpec::from_settings(&config.thumbnail),
    )
    .with_events(tx);
    let faces = harvester.run(picks.paths.clone())?;
    drop(harvester);
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;

    output::print_harvest_summary(faces.len(), picks.paths.len());
    let Some(mut choose) = ChooseFacesViewModel::from_harvest(faces) else {
        return Ok(());
    };

    if dry_run {
        let discarded = choose.cancel();
        println!("Dry run: {discarded} candidates not saved");
        return Ok(());
    }
    choose.choose_all();
    let summary = choose.save(&mut store)?;
    output::print_add_summary(&summary);
    Ok(())
}

/// Drive the selection state machine the way an interactive session would:
/// enter selecting, pick, delete, leave.
fn delete(store_dir: &Path, ids: Vec<String>, all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut vm = StickersViewModel::new(StickerStore::open(store_dir)?);
    vm.get_stickers()?;

    let ids: Vec<String> = if all {
        vm.stickers().iter().map(|s| s.id.clone()).collect()
    } else {
        ids
    };

    vm.change_view_mode();
    for id in &ids {
        if !vm.toggle_selection(id) {
            tracing::warn!(id = %id, "no such sticker");
        }
    }
    output::print_mode_status(vm.mode(), vm.selected().len(), vm.affordance());

    let removed = vm.remove_selected_stickers()?;
    vm.change_view_mode();
    output::print_delete_summary(removed, ids.len());
    Ok(())
}

/// Relative model paths resolve against the collection directory.
fn resolve_model_path(store_dir: &Path, model_path: &str) -> PathBuf {
    let path = Path::new(model_path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        store_dir.join(path)
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Diagnostics go to stderr so stdout stays the user-facing report.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("face_stickers={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_release_or_dev_build() {
        let version = version_string();
        if env!("ON_RELEASE_TAG") == "true" {
            assert_eq!(version, env!("CARGO_PKG_VERSION"));
        } else {
            assert!(version.starts_with("dev@"), "unexpected version {version}");
            assert!(version.len() > "dev@".len());
        }
    }

    #[test]
    fn relative_model_path_resolves_against_store() {
        let store = Path::new("/data/stickers");
        assert_eq!(
            resolve_model_path(store, "seeta.bin"),
            PathBuf::from("/data/stickers/seeta.bin")
        );
        assert_eq!(
            resolve_model_path(store, "/models/seeta.bin"),
            PathBuf::from("/models/seeta.bin")
        );
    }
}
