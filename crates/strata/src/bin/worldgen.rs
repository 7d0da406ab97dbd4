//! # STRATA World Preview
//!
//! Headless tool for inspecting a seed without running a host.
//!
//! ```bash
//! # Spawn point and the region around it
//! worldgen --seed 12345 --preview
//!
//! # A specific region with a custom config
//! worldgen --config world.toml --region -3 7 --preview
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use strata::procedural::{Biome, RegionGeneration, WorldGenerator, WorldSeed};
use strata::shared::{Layer, RegionCoord, TilePos};
use strata::{init_logging, EngineConfig, EngineResult};

const USAGE: &str = "\
usage: worldgen [--config <path>] [--seed <n>] [--region <x> <y>] [--preview]

  --config <path>    engine config (TOML); defaults apply otherwise
  --seed <n>         overrides the configured seed
  --region <x> <y>   region to generate; defaults to the spawn region
  --preview          prints an ASCII biome map of the region
";

/// Parsed command line.
#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    seed: Option<u32>,
    region: Option<RegionCoord>,
    preview: bool,
}

/// Parses arguments; `Ok(None)` means help was requested.
fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Option<Args>, String> {
    fn value<T: std::str::FromStr>(
        args: &mut impl Iterator<Item = String>,
        flag: &str,
    ) -> Result<T, String> {
        let raw = args.next().ok_or_else(|| format!("{flag} needs a value"))?;
        raw.parse()
            .map_err(|_| format!("{flag}: '{raw}' is not a valid value"))
    }

    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => parsed.config = Some(value(&mut args, "--config")?),
            "--seed" => parsed.seed = Some(value(&mut args, "--seed")?),
            "--region" => {
                let x = value(&mut args, "--region")?;
                let y = value(&mut args, "--region")?;
                parsed.region = Some(RegionCoord::new(x, y));
            }
            "--preview" => parsed.preview = true,
            "-h" | "--help" => return Ok(None),
            other => return Err(format!("unknown argument '{other}'")),
        }
    }
    Ok(Some(parsed))
}

fn main() -> ExitCode {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {message}\n\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> EngineResult<()> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = WorldSeed::new(seed);
    }
    init_logging(Some(&config.log_level));

    let region_size = config.generator.region_size;
    let generator = WorldGenerator::new(config.seed, config.generator)?;

    println!("═══════════════════════════════════════════════════════════════════");
    println!("                    STRATA WORLD PREVIEW");
    println!("═══════════════════════════════════════════════════════════════════");
    println!();
    println!("  Seed:        {}", generator.seed().value());

    let spawn = generator.find_spawn_point();
    println!(
        "  Spawn:       {spawn} ({})",
        generator.biome_at(spawn.x, spawn.y)
    );

    let coord = args
        .region
        .unwrap_or_else(|| RegionCoord::from_world(spawn.x, spawn.y, region_size));
    let generation = generator.generate_region(coord);

    println!("  Region:      {coord} ({region_size}x{region_size} tiles)");
    println!("  Generated:   {:.2?}", generation.generation_time);
    println!("  Macro area:  {}", generation.macro_region);
    println!("  Objects:     {}", generation.object_count());
    println!();
    print_distribution(&generation);

    if args.preview {
        println!();
        print_map(&generation, region_size, spawn);
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn print_distribution(generation: &RegionGeneration) {
    let total: usize = generation.biome_distribution.values().sum();
    let mut entries: Vec<_> = generation.biome_distribution.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));

    println!("  Biomes:");
    for (biome, count) in entries {
        let share = *count as f64 / total.max(1) as f64 * 100.0;
        println!(
            "    {} {:<12} {:>6} tiles {:>5.1}%",
            biome.glyph(),
            biome.to_string(),
            count,
            share
        );
    }
}

fn print_map(generation: &RegionGeneration, region_size: u32, spawn: TilePos) {
    let width = usize::try_from(region_size).unwrap_or(usize::MAX);
    let ground: Vec<_> = generation
        .tiles
        .iter()
        .filter(|tile| tile.layer == Layer::Ground)
        .collect();

    for row in ground.chunks(width) {
        let line: String = row
            .iter()
            .map(|tile| {
                if TilePos::new(tile.world_x, tile.world_y) == spawn {
                    '@'
                } else {
                    tile.biome.glyph()
                }
            })
            .collect();
        println!("  {line}");
    }

    println!();
    let legend: Vec<String> = Biome::ALL
        .iter()
        .map(|biome| format!("{} {biome}", biome.glyph()))
        .collect();
    println!("  Legend: @ spawn, {}", legend.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Option<Args>, String> {
        parse_args(args.iter().map(ToString::to_string))
    }

    #[test]
    fn test_parse_all_flags() {
        let args = parse(&["--config", "w.toml", "--seed", "9", "--region", "-3", "7", "--preview"])
            .expect("valid")
            .expect("not help");
        assert_eq!(args.config, Some(PathBuf::from("w.toml")));
        assert_eq!(args.seed, Some(9));
        assert_eq!(args.region, Some(RegionCoord::new(-3, 7)));
        assert!(args.preview);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&["--seed"]).is_err());
        assert!(parse(&["--seed", "x"]).is_err());
        assert!(parse(&["--region", "1"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
        assert!(matches!(parse(&["--help"]), Ok(None)));
    }
}
