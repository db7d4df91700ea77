use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use log::info;

use nrrd_codecs::{codec_for, open_volume, AsciiCodec, Bzip2Codec, GzipCodec, RawCodec};
use nrrd_core::{Codec, ElementKind, Encoding, Plane, Reader, Writer};

// ── CLI definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "nrrd",
    about = "Inspect, export, and re-encode NRRD volumes",
    version
)]
struct Cli {
    /// Log decoding steps (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print header fields and the resolved volume layout
    Inspect {
        /// NRRD file to inspect
        file: PathBuf,
    },
    /// Decode every slice and print per-slice statistics
    Slices {
        /// NRRD file to decode
        file: PathBuf,
    },
    /// Write each slice as a min-max normalized 8-bit PGM image
    Export {
        /// NRRD file to decode
        file: PathBuf,
        /// Directory receiving slice_0000.pgm, slice_0001.pgm, ...
        output_dir: PathBuf,
    },
    /// Re-encode a volume with another payload encoding and/or data type
    Convert {
        /// Source NRRD file
        input: PathBuf,
        /// Destination NRRD file
        output: PathBuf,
        /// Payload encoding: raw | gzip | bzip2 | ascii (aliases accepted)
        #[arg(short, long, default_value = "gzip")]
        encoding: String,
        /// Element type; defaults to the source type
        #[arg(short = 't', long = "type")]
        data_type: Option<String>,
        /// Compression level for gzip (0-9) and bzip2 (1-9), clamped to range
        #[arg(short, long, default_value_t = 6)]
        level: u32,
    },
}

// ── Helpers ────────────────────────────────────────────────────────────────

fn codec_with_level(encoding: Encoding, level: u32) -> Box<dyn Codec> {
    match encoding {
        Encoding::Gzip => Box::new(GzipCodec::new(level)),
        Encoding::Bzip2 => Box::new(Bzip2Codec::new(level)),
        Encoding::Raw => Box::new(RawCodec),
        Encoding::Ascii => Box::new(AsciiCodec),
    }
}

fn human_bytes(n: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    let mut v = n as f64;
    let mut unit = 0;
    while v >= 1024.0 && unit < UNITS.len() - 1 {
        v /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", n)
    } else {
        format!("{:.2} {}", v, UNITS[unit])
    }
}

fn write_pgm(path: &Path, plane: &Plane) -> anyhow::Result<()> {
    let mut out = BufWriter::new(
        File::create(path).with_context(|| format!("creating {:?}", path))?,
    );
    // P5 stores width (columns) before height (rows).
    write!(out, "P5\n{} {}\n255\n", plane.cols(), plane.rows())?;
    out.write_all(&plane.to_u8_normalized())?;
    out.flush()?;
    Ok(())
}

// ── Subcommand implementations ─────────────────────────────────────────────

fn run_inspect(file: PathBuf) -> anyhow::Result<()> {
    let reader = Reader::open(&file).with_context(|| format!("reading header of {:?}", file))?;
    let header = reader.header();
    let shape = reader.shape();
    let file_size = fs::metadata(&file)?.len();

    println!("=== NRRD File: {:?} ===", file);
    println!();
    println!("header info ({}):", header.magic());
    for (key, value) in header.fields() {
        println!("  {:?} : {}", key, value);
    }
    println!();
    println!("  element type   : {:?} ({} bytes)", reader.element_kind(), reader.element_kind().width());
    println!("  codec          : {}", codec_for(reader.encoding()).name());
    println!("  slices         : {}", shape.slices);
    println!("  plane          : {} x {}", shape.width, shape.height);
    println!("  payload offset : {}", reader.payload_offset());
    println!(
        "  decoded size   : {}",
        human_bytes((shape.element_count() * reader.element_kind().width()) as u64)
    );
    println!("  file on disk   : {}", human_bytes(file_size));

    Ok(())
}

fn run_slices(file: PathBuf) -> anyhow::Result<()> {
    let t0 = Instant::now();
    let volume = open_volume(&file).with_context(|| format!("decoding {:?}", file))?;
    let elapsed = t0.elapsed();

    println!(
        "  {:>6}  {:>14}  {:>14}  {:>14}",
        "slice", "min", "max", "mean"
    );
    println!("  {}", "-".repeat(54));
    for (i, plane) in volume.planes.iter().enumerate() {
        let (lo, hi) = plane.min_max();
        println!("  {:>6}  {:>14.4}  {:>14.4}  {:>14.4}", i, lo, hi, plane.mean());
    }
    eprintln!("  decoded {} slices in {:.3}s", volume.planes.len(), elapsed.as_secs_f64());
    Ok(())
}

fn run_export(file: PathBuf, output_dir: PathBuf) -> anyhow::Result<()> {
    let volume = open_volume(&file).with_context(|| format!("decoding {:?}", file))?;
    fs::create_dir_all(&output_dir)
        .with_context(|| format!("creating output directory {:?}", output_dir))?;

    for (i, plane) in volume.planes.iter().enumerate() {
        let path = output_dir.join(format!("slice_{:04}.pgm", i));
        write_pgm(&path, plane)?;
    }
    info!("exported {} slices to {:?}", volume.planes.len(), output_dir);
    eprintln!("  slices      : {}", volume.planes.len());
    eprintln!("  written to  : {:?}", output_dir);
    Ok(())
}

fn run_convert(
    input: PathBuf,
    output: PathBuf,
    encoding_name: &str,
    data_type: Option<String>,
    level: u32,
) -> anyhow::Result<()> {
    let encoding = Encoding::from_name(encoding_name)?;
    let volume = open_volume(&input).with_context(|| format!("decoding {:?}", input))?;
    let kind = match data_type {
        Some(name) => ElementKind::from_name(&name)?,
        None => volume.header.element_kind()?,
    };

    let codec = codec_with_level(encoding, level);
    let codec_display = codec.name();
    let t0 = Instant::now();
    Writer::new(codec, kind)
        .create(&output, &volume.planes)
        .with_context(|| format!("writing {:?}", output))?;
    let elapsed = t0.elapsed();

    eprintln!("  codec       : {}", codec_display);
    eprintln!("  type        : {}", kind.name());
    eprintln!("  slices      : {}", volume.planes.len());
    eprintln!("  input size  : {}", human_bytes(fs::metadata(&input)?.len()));
    eprintln!("  output size : {}", human_bytes(fs::metadata(&output)?.len()));
    eprintln!("  elapsed     : {:.3}s", elapsed.as_secs_f64());
    Ok(())
}

// ── Entry point ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    match cli.command {
        Commands::Inspect { file } => run_inspect(file),
        Commands::Slices { file } => run_slices(file),
        Commands::Export { file, output_dir } => run_export(file, output_dir),
        Commands::Convert {
            input,
            output,
            encoding,
            data_type,
            level,
        } => run_convert(input, output, &encoding, data_type, level),
    }
}
