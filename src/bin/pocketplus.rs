//! POCKET+ command-line interface.
//!
//! A unified command-line interface for CCSDS 124.0-B-1 compression and
//! decompression, built on `clap`'s derive API.
//!
//! References:
//!   CCSDS 124.0-B-1: <https://ccsds.org/Pubs/124x0b1.pdf>
//!   ESA POCKET+: <https://opssat.esa.int/pocket-plus/>
//!
//! D. Evans, G. Labreche, D. Marszk, S. Bammens, M. Hernandez-Cabronero,
//! V. Zelenevskiy, V. Shiradhonkar, M. Starcik, and M. Henkel. 2022.
//! "Implementing the New CCSDS Housekeeping Data Compression Standard
//! 124.0-B-1 (based on POCKET+) on OPS-SAT-1," Proceedings of the
//! Small Satellite Conference, Communications, SSC22-XII-03.

#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]

use clap::{Parser, Subcommand};
use pocketplus::{compress, decompress};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::process::ExitCode;

#[derive(Parser)]
#[command(
    name = "pocketplus",
    version,
    about = "CCSDS 124.0-B-1 lossless compression for fixed-length housekeeping packets"
)]
struct Cli {
    /// Increase log verbosity (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compress a fixed-length packet stream.
    Compress {
        /// Input file containing whole packets back to back.
        input: String,
        /// Packet size in bytes (e.g. 90).
        #[arg(long)]
        packet_size: usize,
        /// New-mask period (ṗₜ scheduling). 0 disables automatic scheduling.
        #[arg(long, default_value_t = 0)]
        pt: usize,
        /// Send-mask period (ḟₜ scheduling). 0 disables automatic scheduling.
        #[arg(long, default_value_t = 0)]
        ft: usize,
        /// Uncompressed-packet period (ṙₜ scheduling). 0 disables automatic scheduling.
        #[arg(long, default_value_t = 0)]
        rt: usize,
        /// Robustness level R (0-7).
        #[arg(long, default_value_t = 1)]
        robustness: usize,
    },
    /// Decompress a POCKET+ packet stream.
    Decompress {
        /// Compressed input file (typically produced by `compress`).
        input: String,
        /// Original packet size in bytes, matching the compression run.
        #[arg(long)]
        packet_size: usize,
        /// Robustness level R, matching the compression run.
        #[arg(long, default_value_t = 1)]
        robustness: usize,
    },
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new().filter_level(level).init();
}

/// Create output filename for decompression: strips a trailing `.pkt`/`.PKT`
/// extension (if present), then appends `.depkt`.
fn make_decompress_filename(input: &str) -> String {
    if let Some(stripped) = input.strip_suffix(".pkt") {
        format!("{stripped}.depkt")
    } else if let Some(stripped) = input.strip_suffix(".PKT") {
        format!("{stripped}.depkt")
    } else {
        format!("{input}.depkt")
    }
}

fn read_file(path: &str) -> Result<Vec<u8>, String> {
    let mut file = File::open(path).map_err(|e| format!("cannot open input file: {e}"))?;
    let metadata = fs::metadata(path).map_err(|e| format!("cannot read file metadata: {e}"))?;

    let mut buffer = Vec::with_capacity(metadata.len() as usize);
    file.read_to_end(&mut buffer)
        .map_err(|e| format!("failed to read input file: {e}"))?;

    if buffer.is_empty() {
        return Err("input file is empty".to_string());
    }
    Ok(buffer)
}

fn write_file(path: &str, data: &[u8]) -> Result<(), String> {
    let mut file = File::create(path).map_err(|e| format!("cannot create output file: {e}"))?;
    file.write_all(data)
        .map_err(|e| format!("failed to write output file: {e}"))?;
    Ok(())
}

fn do_compress(
    input_path: &str,
    packet_size: usize,
    pt_period: usize,
    ft_period: usize,
    rt_period: usize,
    robustness: usize,
) -> Result<(), String> {
    let input_data = read_file(input_path)?;
    let input_size = input_data.len();

    if input_size % packet_size != 0 {
        return Err(format!(
            "input size ({input_size}) not divisible by packet size ({packet_size})"
        ));
    }
    if robustness > 7 {
        return Err("robustness must be 0-7".to_string());
    }

    log::debug!(
        "compressing {input_path}: {input_size} bytes, packet_size={packet_size}, \
         pt={pt_period} ft={ft_period} rt={rt_period} R={robustness}"
    );

    let output_path = format!("{input_path}.pkt");
    let packet_bits = packet_size * 8;
    let output_data = compress(
        &input_data,
        packet_bits,
        robustness,
        pt_period,
        ft_period,
        rt_period,
    )
    .map_err(|e| format!("compression failed: {e}"))?;

    let output_size = output_data.len();
    write_file(&output_path, &output_data)?;

    let num_packets = input_size / packet_size;
    let ratio = input_size as f64 / output_size as f64;
    println!("Input:       {input_path} ({input_size} bytes, {num_packets} packets)");
    println!("Output:      {output_path} ({output_size} bytes)");
    println!("Ratio:       {ratio:.2}x");
    println!("Parameters:  R={robustness}, pt={pt_period}, ft={ft_period}, rt={rt_period}");

    Ok(())
}

fn do_decompress(input_path: &str, packet_size: usize, robustness: usize) -> Result<(), String> {
    let input_data = read_file(input_path)?;
    let input_size = input_data.len();

    if robustness > 7 {
        return Err("robustness must be 0-7".to_string());
    }

    log::debug!("decompressing {input_path}: {input_size} bytes, packet_size={packet_size} R={robustness}");

    let output_path = make_decompress_filename(input_path);
    let packet_bits = packet_size * 8;
    let output_data = decompress(&input_data, packet_bits, robustness)
        .map_err(|e| format!("decompression failed: {e}"))?;

    let output_size = output_data.len();
    write_file(&output_path, &output_data)?;

    let num_packets = output_size / packet_size;
    let ratio = output_size as f64 / input_size as f64;
    println!("Input:       {input_path} ({input_size} bytes)");
    println!("Output:      {output_path} ({output_size} bytes, {num_packets} packets)");
    println!("Expansion:   {ratio:.2}x");
    println!("Parameters:  packet_size={packet_size}, R={robustness}");

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Command::Compress {
            input,
            packet_size,
            pt,
            ft,
            rt,
            robustness,
        } => do_compress(&input, packet_size, pt, ft, rt, robustness),
        Command::Decompress {
            input,
            packet_size,
            robustness,
        } => do_decompress(&input, packet_size, robustness),
    };

    if let Err(e) = result {
        log::error!("{e}");
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_make_decompress_filename_strips_pkt_extension() {
        assert_eq!(make_decompress_filename("data.bin.pkt"), "data.bin.depkt");
    }

    #[test]
    fn test_make_decompress_filename_appends_when_no_extension() {
        assert_eq!(make_decompress_filename("data.bin"), "data.bin.depkt");
    }

    #[test]
    fn test_compress_then_decompress_round_trips_through_real_files() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("housekeeping.bin");
        std::fs::write(&input_path, vec![0x42u8; 90 * 4]).unwrap();

        let input_str = input_path.to_str().unwrap();
        do_compress(input_str, 90, 10, 20, 50, 1).unwrap();

        let compressed_path = format!("{input_str}.pkt");
        assert!(std::path::Path::new(&compressed_path).exists());

        do_decompress(&compressed_path, 90, 1).unwrap();
        let restored = std::fs::read(make_decompress_filename(&compressed_path)).unwrap();

        assert_eq!(restored, std::fs::read(&input_path).unwrap());
    }

    #[test]
    fn test_cli_parses_compress_subcommand() {
        let cli = Cli::parse_from([
            "pocketplus",
            "compress",
            "data.bin",
            "--packet-size",
            "90",
            "--pt",
            "10",
            "--ft",
            "20",
            "--rt",
            "50",
            "--robustness",
            "1",
        ]);
        match cli.command {
            Command::Compress {
                input,
                packet_size,
                pt,
                ft,
                rt,
                robustness,
            } => {
                assert_eq!(input, "data.bin");
                assert_eq!(packet_size, 90);
                assert_eq!((pt, ft, rt, robustness), (10, 20, 50, 1));
            }
            Command::Decompress { .. } => panic!("expected Compress"),
        }
    }

    #[test]
    fn test_cli_parses_decompress_subcommand() {
        let cli = Cli::parse_from([
            "pocketplus",
            "decompress",
            "data.bin.pkt",
            "--packet-size",
            "90",
            "--robustness",
            "1",
        ]);
        match cli.command {
            Command::Decompress {
                input,
                packet_size,
                robustness,
            } => {
                assert_eq!(input, "data.bin.pkt");
                assert_eq!((packet_size, robustness), (90, 1));
            }
            Command::Compress { .. } => panic!("expected Decompress"),
        }
    }
}
