//! Analyze record pointer behavior around the end of the address space.
//!
//! Input is whitespace-separated `<seconds> <address>` lines, one pointer
//! sample per line; blank lines and `#` comments are skipped.
//!
//! Run with: cargo run --bin `analyze-pointer-wraps` -- <`samples_file`> [`modulus`]
#![allow(clippy::cast_precision_loss, clippy::cast_possible_wrap)]

use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};

const DEFAULT_MODULUS: u64 = 134_217_696;

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <samples_file> [modulus]", args[0]);
        std::process::exit(1);
    }
    let modulus = match args.get(2) {
        Some(text) => match text.parse::<u64>() {
            Ok(value) if value > 0 => value,
            _ => {
                eprintln!("Invalid modulus: {text}");
                std::process::exit(1);
            }
        },
        None => DEFAULT_MODULUS,
    };

    let reader = BufReader::new(File::open(&args[1])?);
    let mut samples: Vec<(f64, u64)> = Vec::new();
    let mut skipped = 0usize;
    for line in reader.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let mut fields = trimmed.split_whitespace();
        let parsed = match (fields.next(), fields.next()) {
            (Some(t), Some(a)) => t.parse::<f64>().ok().zip(a.parse::<u64>().ok()),
            _ => None,
        };
        match parsed {
            Some(sample) => samples.push(sample),
            None => skipped += 1,
        }
    }

    let mut wraps = 0usize;
    let mut unwrapped_total: i64 = 0;
    for (i, pair) in samples.windows(2).enumerate() {
        let (t0, a0) = pair[0];
        let (t1, a1) = pair[1];

        let mut step = a1 as i64 - a0 as i64;
        // A drop of more than half the buffer is the pointer passing the end
        if a1 < a0 && a0 - a1 > modulus / 2 {
            wraps += 1;
            step += modulus as i64;
            let dt = t1 - t0;
            println!("=== POINTER WRAP DETECTED ===");
            println!("Sample {}: address {a0} -> {a1} over {dt:.1} s", i + 1);
            if dt > 0.0 {
                println!("Implied rate across wrap: {:.1} words/s", step as f64 / dt);
            }
            println!();
        } else if a1 > a0 && a1 - a0 > modulus / 2 {
            println!("Sample {}: suspicious jump {a0} -> {a1} (pointer moved backward?)", i + 1);
        }
        unwrapped_total += step;
    }

    if let (Some(first), Some(last)) = (samples.first(), samples.last()) {
        let span = last.0 - first.0;
        if span > 0.0 {
            println!(
                "Mean record rate: {:.2} words/s over {span:.1} s",
                unwrapped_total as f64 / span
            );
        }
    }
    println!(
        "Analysis complete. {} samples, {wraps} wrap(s), {skipped} unparseable line(s).",
        samples.len()
    );
    Ok(())
}
