//! Cycle report for a directory of `Cycle N` exports
//!
//! Usage: cycle_report <data dir> [folder] [config.json]

use std::env;

use battery_dqdv::analysis::valid_cycles;
use battery_dqdv::io::{build_cycle_file_map, read_folder};
use battery_dqdv::plot::derivative_series;
use battery_dqdv::{compute_derivatives, process_cycle, PipelineConfig, ProcessMode, SegmentKind};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let base = args.get(1).map(String::as_str).unwrap_or(".");
    let config = match args.get(3) {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };
    config.validate()?;

    let map = build_cycle_file_map(base)?;
    println!("=== Folders under {base} ===");
    for (folder, path) in &map {
        println!("  {folder:>4}: {}", path.display());
    }

    let folder = match args.get(2) {
        Some(folder) => folder.parse()?,
        None => match map.keys().next() {
            Some(&folder) => folder,
            None => {
                println!("no data folders found");
                return Ok(());
            }
        },
    };

    let record = read_folder(folder, &map)?;
    let valid = valid_cycles(&record, folder, &config);
    println!(
        "\n=== Folder {folder}: {} rows, {} valid cycles ===",
        record.len(),
        valid.len()
    );

    for valid_cycle in &valid {
        let processed = process_cycle(valid_cycle, &config, ProcessMode::Preprocess)?;
        let cycle = processed.cycle;
        for kind in SegmentKind::ALL {
            let derivative = compute_derivatives(processed.curve(kind), config.eps)?;
            let [dqdv, _] = derivative_series(&derivative, ProcessMode::Preprocess, folder, cycle);

            let peak = dqdv
                .x
                .iter()
                .zip(&dqdv.y)
                .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()));
            match peak {
                Some((v, q)) => println!(
                    "  cycle {cycle:>4} {:<9} {:>4} points, |dQ/dV| peak {q:.4} Ah/V at {v:.4} V",
                    kind.as_str(),
                    derivative.len()
                ),
                None => println!("  cycle {cycle:>4} {:<9} no defined dQ/dV", kind.as_str()),
            }
        }
    }

    Ok(())
}
