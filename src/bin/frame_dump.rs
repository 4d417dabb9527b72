//! Frame-by-frame listing for investigating odd counts

use mp3frames::mp3::Frames;
use std::env;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: frame_dump <file1> [file2] [--limit N]");
        std::process::exit(1);
    }

    let mut limit = usize::MAX;
    let mut paths = Vec::new();
    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        if arg == "--limit" {
            match rest.next().and_then(|n| n.parse().ok()) {
                Some(n) => limit = n,
                None => {
                    eprintln!("--limit needs a number");
                    std::process::exit(1);
                }
            }
        } else {
            paths.push(arg);
        }
    }

    for path in paths {
        println!("\n{}", "=".repeat(60));
        println!("FILE: {}", path);
        println!("{}", "=".repeat(60));
        dump_file(path, limit);
    }
}

fn dump_file(path: &str, limit: usize) {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read file: {}", e);
            return;
        }
    };

    let mut frames = Frames::new(&data);
    println!("Size: {} bytes", data.len());
    println!("Audio start: {}", frames.offset());

    println!(
        "\n{:>7}  {:>10}  {:>6}  {:>8}  {:>6}  {:>3}  {}",
        "#", "OFFSET", "SIZE", "KBPS", "HZ", "PAD", "MODE"
    );
    println!("{}", "-".repeat(60));

    let mut count = 0usize;
    let mut duration = 0.0f64;
    let mut last_end = frames.offset();

    for frame in frames.by_ref() {
        let h = frame.header;
        if count < limit {
            // Gap since the previous frame ended: junk or a metadata frame
            if frame.offset > last_end {
                println!("{:>7}  {:>10}  (+{} bytes skipped)", "", "", frame.offset - last_end);
            }
            println!(
                "{:>7}  {:>10}  {:>6}  {:>8}  {:>6}  {:>3}  {} {:?}",
                count,
                frame.offset,
                h.frame_size,
                h.bitrate,
                h.sample_rate,
                if h.padding { "y" } else { "" },
                h.channel_mode.code(),
                h.channel_mode
            );
        }
        last_end = frame.offset + h.frame_size as usize;
        count += 1;
        duration += h.duration_secs();
    }

    if count > limit {
        println!("... {} more", count - limit);
    }

    println!("\nFrames: {}", count);
    println!("Duration: {:.2}s", duration);
    println!("Resync bytes: {}", frames.skipped_bytes());
    match frames.vbr_header() {
        Some(vbr) => println!(
            "VBR header: {:?} (declared frames: {}, bytes: {})",
            vbr.tag,
            vbr.total_frames.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string()),
            vbr.total_bytes.map(|n| n.to_string()).unwrap_or_else(|| "-".to_string())
        ),
        None => println!("VBR header: none"),
    }
}
