/*!
 * Command-line interface for dumptree
 */

use std::io;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use clap::{CommandFactory, Parser};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use dumptree::config::{Args, Config};
use dumptree::error::Result;
use dumptree::export::{self, ExportStats};
use dumptree::report::{print_report, ExportReport};
use dumptree::selection::{self, SelectionState};
use dumptree::worker::{BuildEvent, BuildHandle};
use dumptree::{clipboard, ContentPolicy, Tree};

/// How often the build queue is drained
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> ExitCode {
    let args = Args::parse();
    setup_tracing(&args);

    if let Some(shell) = args.generate {
        clap_complete::generate(shell, &mut Args::command(), "dumptree", &mut io::stdout());
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn setup_tracing(args: &Args) {
    if let Some(level) = args.log_level.to_tracing_level() {
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .without_time()
            .compact()
            .init();
    }
}

fn run(args: Args) -> Result<()> {
    let config = Config::from_args(args)?;
    config.validate()?;
    debug!("Effective configuration: {:?}", config);

    if config.save_settings {
        if let Some(path) = &config.settings_path {
            config.settings.save(path)?;
            debug!("Saved settings to {}", path.display());
        }
    }

    let start_time = Instant::now();
    let tree = build_tree(&config)?;

    let policy = ContentPolicy::new(config.settings.clone());
    let artifact = if config.select.is_empty() {
        export::generate_full(&tree, &policy)
    } else {
        let mut state = SelectionState::new(&tree);
        for path in &config.select {
            let selected = selection::set(&tree, &mut state, path, true)?;
            debug!("{} {}", selected, path);
        }
        export::generate(&tree, &state, &policy)?
    };

    export::save(&artifact.text, &config.output_file)?;

    let copied = if config.clip {
        match clipboard::copy_to_clipboard(&artifact.text) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to copy to clipboard: {}", e);
                false
            }
        }
    } else {
        false
    };

    print_report(&ExportReport {
        output_file: config.output_file.display().to_string(),
        duration: start_time.elapsed(),
        filtered: !config.select.is_empty(),
        copied,
        stats: ExportStats::new(&artifact),
    });

    Ok(())
}

/// Build the tree on a worker thread, mirroring its progress on a bar
fn build_tree(config: &Config) -> Result<Tree> {
    let progress = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} {prefix:.bold.cyan} {wide_msg:.dim.white} {pos}/{len} ({percent}%)")
    {
        progress.set_style(style);
    }
    progress.enable_steady_tick(POLL_INTERVAL);
    progress.set_prefix("📂 Scanning");

    let mut handle = BuildHandle::spawn(&config.target_dir, config.settings.clone());
    let result = loop {
        let mut finished = None;
        for event in handle.poll() {
            match event {
                BuildEvent::Progress(p) => {
                    progress.set_length(p.total);
                    progress.set_position(p.processed);
                    progress.set_message(p.status);
                }
                BuildEvent::Finished(result) => finished = Some(result),
            }
        }
        if let Some(result) = finished {
            break result;
        }
        thread::sleep(POLL_INTERVAL);
    };

    handle.join();
    progress.finish_and_clear();
    result
}
