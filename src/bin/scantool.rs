use clap::{Parser, Subcommand};
use rust_barcode::sink::{AppendLog, DedupPolicy, dispatch};
use rust_barcode::tools::render::{
    LinearRenderOptions, QrRenderOptions, code128_widths, ean13_widths, render_linear, render_qr,
    upca_widths,
};
use rust_barcode::tools::{binary_stats, grayscale_stats, image_files, load_gray};
use rust_barcode::{
    CandidateShape, DecodedSymbol, ECLevel, ImageBuffer, MaskPattern, ScanOptions, binarize, decode,
    decode_batch, locate,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "scantool", version, about = "Barcode scanning CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode every symbol in a single image
    Scan {
        #[arg(long)]
        image: PathBuf,
        /// Append decoded payloads to this file
        #[arg(long)]
        log: Option<PathBuf>,
        /// Which repeats the log skips: consecutive or distinct
        #[arg(long, default_value = "consecutive")]
        dedup: DedupPolicy,
    },
    /// Decode every image under a directory in parallel
    Batch {
        #[arg(long)]
        root: PathBuf,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print grayscale/binary stats and located candidates for an image
    Debug {
        #[arg(long)]
        image: PathBuf,
    },
    /// Write a synthetic symbol image
    Render {
        #[command(subcommand)]
        symbol: RenderCommand,
    },
    /// Inspect or reset a payload log
    Log {
        #[command(subcommand)]
        action: LogCommand,
    },
}

#[derive(Subcommand)]
enum RenderCommand {
    /// QR code in byte mode
    Qr {
        payload: String,
        #[arg(long, default_value = "M", value_parser = parse_ec_level)]
        ec: ECLevel,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..8))]
        mask: Option<u8>,
        #[arg(long, default_value_t = 1)]
        min_version: u8,
        #[arg(long, default_value_t = 4)]
        scale: u32,
        #[arg(long)]
        out: PathBuf,
    },
    /// EAN-13 from 12 or 13 digits
    Ean13 {
        digits: String,
        #[arg(long, default_value_t = 2)]
        scale: u32,
        #[arg(long)]
        out: PathBuf,
    },
    /// UPC-A from 11 or 12 digits
    UpcA {
        digits: String,
        #[arg(long, default_value_t = 2)]
        scale: u32,
        #[arg(long)]
        out: PathBuf,
    },
    /// Code 128 (set C for even-length digit strings, set B otherwise)
    Code128 {
        text: String,
        #[arg(long, default_value_t = 2)]
        scale: u32,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Subcommand)]
enum LogCommand {
    /// Print the logged payloads
    Show {
        #[arg(long)]
        file: PathBuf,
    },
    /// Truncate the log
    Clear {
        #[arg(long)]
        file: PathBuf,
    },
}

fn parse_ec_level(s: &str) -> Result<ECLevel, String> {
    match s.to_ascii_uppercase().as_str() {
        "L" => Ok(ECLevel::L),
        "M" => Ok(ECLevel::M),
        "Q" => Ok(ECLevel::Q),
        "H" => Ok(ECLevel::H),
        other => Err(format!("unknown EC level '{other}', expected L, M, Q or H")),
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let outcome = match cli.command {
        Command::Scan { image, log, dedup } => scan_cmd(&image, log.as_deref(), dedup),
        Command::Batch { root, limit } => batch_cmd(&root, limit),
        Command::Debug { image } => debug_cmd(&image),
        Command::Render { symbol } => render_cmd(symbol),
        Command::Log { action } => log_cmd(action),
    };
    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn print_symbol(i: usize, symbol: &DecodedSymbol) {
    let version = symbol
        .version
        .map(|v| v.number().to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  {}: {} version={} ec={:?} corrected={} confidence={:.2} content={}",
        i,
        symbol.format,
        version,
        symbol.error_correction,
        symbol.corrected_bytes,
        symbol.confidence,
        symbol.text()
    );
}

fn scan_cmd(path: &Path, log: Option<&Path>, dedup: DedupPolicy) -> Result<(), String> {
    let gray = load_gray(path).map_err(|e| format!("Failed to load image {}: {e}", path.display()))?;
    let image = ImageBuffer::from_gray(&gray).map_err(|e| e.to_string())?;
    let options = ScanOptions::from_env();

    let start = Instant::now();
    let outcome = decode(&image, &options);
    let elapsed = start.elapsed();

    println!(
        "Image: {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    match &outcome {
        Ok(symbols) => {
            println!("Found {} symbols in {:.2?}", symbols.len(), elapsed);
            for (i, symbol) in symbols.iter().enumerate() {
                print_symbol(i, symbol);
            }
        }
        Err(e) => return Err(format!("Decode failed: {e}")),
    }

    if let Some(file) = log {
        let mut sink = AppendLog::new(file, dedup);
        dispatch(&outcome, &mut sink);
    }
    Ok(())
}

fn batch_cmd(root: &Path, limit: Option<usize>) -> Result<(), String> {
    let paths = image_files(root, limit);
    if paths.is_empty() {
        return Err(format!("No images found under {}", root.display()));
    }

    let mut loaded = Vec::with_capacity(paths.len());
    for path in &paths {
        match load_gray(path) {
            Ok(gray) => loaded.push((path, gray)),
            Err(e) => eprintln!("Skipping {}: {e}", path.display()),
        }
    }
    let mut images = Vec::with_capacity(loaded.len());
    for (_, gray) in &loaded {
        images.push(ImageBuffer::from_gray(gray).map_err(|e| e.to_string())?);
    }

    let options = ScanOptions::from_env();
    let start = Instant::now();
    let results = decode_batch(&images, &options);
    let elapsed = start.elapsed();

    let mut with_symbols = 0usize;
    for ((path, _), result) in loaded.iter().zip(&results) {
        match result {
            Ok(symbols) => {
                if !symbols.is_empty() {
                    with_symbols += 1;
                }
                println!("{}: {} symbols", path.display(), symbols.len());
                for (i, symbol) in symbols.iter().enumerate() {
                    print_symbol(i, symbol);
                }
            }
            Err(e) => println!("{}: error: {e}", path.display()),
        }
    }
    println!(
        "{}/{} images with at least one symbol in {:.2?}",
        with_symbols,
        results.len(),
        elapsed
    );
    Ok(())
}

fn debug_cmd(path: &Path) -> Result<(), String> {
    let gray = load_gray(path).map_err(|e| format!("Failed to load image {}: {e}", path.display()))?;
    let image = ImageBuffer::from_gray(&gray).map_err(|e| e.to_string())?;
    let options = ScanOptions::from_env();
    println!(
        "Image: {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );

    let stats = grayscale_stats(gray.as_raw());
    println!(
        "Grayscale range: {}-{}, average: {}",
        stats.min, stats.max, stats.avg
    );

    let binary = binarize(&image, &options);
    let stats = binary_stats(&binary);
    println!(
        "Binary: black_pixels={} total={} black_ratio={:.2}%",
        stats.black_pixels,
        stats.total_pixels,
        stats.black_ratio * 100.0
    );

    let candidates: Vec<_> = locate(&binary, &options).collect();
    println!("Located {} candidates", candidates.len());
    for (i, candidate) in candidates.iter().enumerate() {
        let shape = match &candidate.shape {
            CandidateShape::Matrix { dimension, .. } => format!("matrix {dimension}x{dimension}"),
            CandidateShape::Linear { format, .. } => format!("linear {format:?}"),
        };
        let [a, b, c, d] = candidate.bounding_polygon();
        println!(
            "  Candidate {}: {} module_size={:.2} confidence={:.2} corners=({:.1},{:.1}) ({:.1},{:.1}) ({:.1},{:.1}) ({:.1},{:.1})",
            i,
            shape,
            candidate.module_size,
            candidate.confidence,
            a.x,
            a.y,
            b.x,
            b.y,
            c.x,
            c.y,
            d.x,
            d.y
        );
    }

    match decode(&image, &options) {
        Ok(symbols) => println!("Full decode found {} symbols", symbols.len()),
        Err(e) => println!("Full decode failed: {e}"),
    }
    Ok(())
}

fn render_cmd(symbol: RenderCommand) -> Result<(), String> {
    let linear = |scale| LinearRenderOptions {
        scale,
        ..LinearRenderOptions::default()
    };
    let (image, out) = match symbol {
        RenderCommand::Qr {
            payload,
            ec,
            mask,
            min_version,
            scale,
            out,
        } => {
            let options = QrRenderOptions {
                ec_level: ec,
                mask: mask.map(MaskPattern::from_bits),
                min_version,
                scale,
                ..QrRenderOptions::default()
            };
            (
                render_qr(payload.as_bytes(), &options).map_err(|e| e.to_string())?,
                out,
            )
        }
        RenderCommand::Ean13 { digits, scale, out } => {
            let widths = ean13_widths(&digits).map_err(|e| e.to_string())?;
            (render_linear(&widths, &linear(scale)), out)
        }
        RenderCommand::UpcA { digits, scale, out } => {
            let widths = upca_widths(&digits).map_err(|e| e.to_string())?;
            (render_linear(&widths, &linear(scale)), out)
        }
        RenderCommand::Code128 { text, scale, out } => {
            let widths = code128_widths(text.as_bytes()).map_err(|e| e.to_string())?;
            (render_linear(&widths, &linear(scale)), out)
        }
    };
    image
        .save(&out)
        .map_err(|e| format!("Failed to write {}: {e}", out.display()))?;
    println!(
        "Wrote {} ({}x{})",
        out.display(),
        image.width(),
        image.height()
    );
    Ok(())
}

fn log_cmd(action: LogCommand) -> Result<(), String> {
    match action {
        LogCommand::Show { file } => {
            let log = AppendLog::new(&file, DedupPolicy::default());
            let lines = log
                .read_lines()
                .map_err(|e| format!("Failed to read {}: {e}", file.display()))?;
            for line in lines {
                println!("{line}");
            }
        }
        LogCommand::Clear { file } => {
            let mut log = AppendLog::new(&file, DedupPolicy::default());
            log.clear()
                .map_err(|e| format!("Failed to clear {}: {e}", file.display()))?;
            println!("Cleared {}", file.display());
        }
    }
    Ok(())
}
