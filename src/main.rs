use chrono::Local;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mp3frames::counter::{self, CountResult, Status};
use mp3frames::report::Summary;
use mp3frames::ServeConfig;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "mp3frames")]
#[command(author, version, about = "Count MPEG-1 Layer III audio frames in MP3 files")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Files or directories to count (directories are searched for .mp3)
    paths: Vec<PathBuf>,

    /// Write a report (.csv, .json, or a directory for a timestamped CSV)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print results as JSON on stdout instead of a table
    #[arg(long)]
    json: bool,

    /// Number of parallel workers (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Show audio start, VBR header and resync details
    #[arg(short, long)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP upload service
    Serve {
        /// Interface to bind
        #[arg(long, env = "HOST", default_value = "127.0.0.1")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value = "3000")]
        port: u16,

        /// Largest accepted upload, in MB
        #[arg(long, default_value = "50")]
        max_upload_mb: usize,

        /// Open the upload page in a browser
        #[arg(long)]
        open: bool,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    if let Some(Command::Serve { host, port, max_upload_mb, open }) = args.command {
        let config = ServeConfig::new()
            .with_host(host)
            .with_port(port)
            .with_max_upload_mb(max_upload_mb)
            .with_open_browser(open);

        if let Err(e) = mp3frames::serve::start(config) {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    if args.paths.is_empty() {
        eprintln!("Usage: mp3frames <PATHS>...");
        eprintln!("       mp3frames serve [--port PORT]");
        eprintln!("Run 'mp3frames --help' for more options.");
        std::process::exit(2);
    }

    // Set up thread pool
    if let Some(jobs) = args.jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let files = counter::collect_files(&args.paths);
    if files.is_empty() {
        eprintln!("No MP3 files found");
        std::process::exit(2);
    }

    let show_table = !args.quiet && !args.json;

    if show_table {
        eprintln!("\x1b[1mmp3frames - MPEG-1 Layer III frame counter\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!("Found {} file(s)\n", files.len());
    }

    // Set up progress bar
    let pb = if show_table && files.len() > 1 {
        let pb = ProgressBar::new(files.len() as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|s| s.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);
        Some(pb)
    } else {
        None
    };

    // Count files in parallel
    let results: Vec<CountResult> = files
        .par_iter()
        .map(|path| {
            let result = counter::count_file(path);
            if let Some(ref pb) = pb {
                pb.inc(1);
                pb.set_message(result.file_name.clone());
            }
            result
        })
        .collect();

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    if args.json {
        match serde_json::to_string_pretty(&results) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Failed to encode results: {}", e);
                std::process::exit(1);
            }
        }
    } else if !args.quiet {
        for r in &results {
            print_result(r, args.verbose);
        }
    }

    let summary = Summary::from_results(&results);

    if show_table {
        eprintln!("\n{}", "─".repeat(70));
        eprintln!("\x1b[1mSummary:\x1b[0m");
        eprintln!("  \x1b[32m✓ Counted:\x1b[0m   {}", summary.ok);
        eprintln!("  \x1b[33m? No frames:\x1b[0m {}", summary.no_frames);
        if summary.error > 0 {
            eprintln!("  \x1b[90mErrors:\x1b[0m      {}", summary.error);
        }
        eprintln!(
            "  Frames:      {} ({})",
            summary.total_frames,
            format_duration(summary.total_duration_secs)
        );
    }

    if let Some(ref output) = args.output {
        let report_path = report_path(output);
        if let Err(e) = mp3frames::report::generate(&report_path, &results) {
            eprintln!("Failed to write report: {}", e);
            std::process::exit(1);
        }
        if !args.quiet {
            eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", report_path.display());
        }
    }

    // Exit with appropriate code
    if summary.no_frames > 0 || summary.error > 0 {
        std::process::exit(1);
    }
}

fn print_result(r: &CountResult, verbose: bool) {
    let color = match r.status {
        Status::Ok => "\x1b[32m",       // Green
        Status::NoFrames => "\x1b[33m", // Yellow
        Status::Error => "\x1b[90m",    // Gray
    };
    let reset = "\x1b[0m";

    println!(
        "{}{:<12}{} {:>8}  {:>8}  {}",
        color,
        format!("[{}]", r.status),
        reset,
        r.frame_count,
        format_duration(r.duration_secs),
        &r.file_name
    );

    if let Some(ref error) = r.error {
        eprintln!("    {}", error);
    }

    if verbose && r.status != Status::Error {
        eprintln!(
            "    audio_start={} vbr={} declared={} skipped={}B",
            r.audio_start,
            r.vbr_tag.map(|t| format!("{:?}", t)).unwrap_or_else(|| "-".to_string()),
            r.declared_frames.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            r.skipped_bytes
        );
        if r.declared_mismatch() {
            eprintln!("    \x1b[33mheader declares a different frame total\x1b[0m");
        }
    }
}

/// `m:ss`, or `h:mm:ss` past an hour
fn format_duration(secs: f64) -> String {
    let total = secs.round() as u64;
    let (h, m, s) = (total / 3600, (total / 60) % 60, total % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{}:{:02}", m, s)
    }
}

/// A directory gets a timestamped CSV inside it
fn report_path(output: &Path) -> PathBuf {
    if output.is_dir() {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        output.join(format!("mp3frames_report_{}.csv", timestamp))
    } else {
        output.to_path_buf()
    }
}
