use std::{fs, path::PathBuf, str::FromStr};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rand::{rngs::StdRng, Rng, SeedableRng};
use rect_packer::{render, Bin, Item, Packer};
use serde::Deserialize;

#[derive(Debug, Parser)]
#[command(name = "demo")]
#[command(about = "Pack rectangles into a bin and print the layout")]
struct Args {
    /// Bin width
    #[arg(long, default_value_t = 10)]
    width: u32,

    /// Bin height
    #[arg(long, default_value_t = 10)]
    height: u32,

    /// Item to pack as WxH, may be repeated
    #[arg(short, long = "item")]
    items: Vec<Dims>,

    /// JSON problem file with a bin and items, overrides the flags above
    #[arg(long, conflicts_with_all = ["items", "random"])]
    input: Option<PathBuf>,

    /// Generate this many random items instead
    #[arg(long, conflicts_with = "items")]
    random: Option<usize>,

    /// Seed for --random
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Largest side of a random item
    #[arg(long, default_value_t = 5)]
    max_side: u32,

    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Also draw the layout to a PNG file
    #[arg(long)]
    png: Option<PathBuf>,

    /// Pixels per grid cell in the PNG
    #[arg(long, default_value_t = 16)]
    scale: u32,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy)]
struct Dims {
    width: u32,
    height: u32,
}

impl FromStr for Dims {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| anyhow::anyhow!("expected WxH, got {:?}", s))?;
        Ok(Self {
            width: w.trim().parse()?,
            height: h.trim().parse()?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Problem {
    bin: Bin,
    items: Vec<Item>,
}

fn fixture() -> rect_packer::Result<Vec<Item>> {
    [(2, 4), (6, 3), (3, 2), (4, 4), (3, 6), (4, 6)]
        .into_iter()
        .map(|(w, h)| Item::new(w, h))
        .collect()
}

fn load_problem(args: &Args) -> anyhow::Result<Problem> {
    if let Some(path) = &args.input {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", path.display()));
    }

    let bin = Bin::new(args.width, args.height)?;
    let items = if let Some(count) = args.random {
        anyhow::ensure!(args.max_side > 0, "--max-side must be positive");
        let mut rng = StdRng::seed_from_u64(args.seed);
        (0..count)
            .map(|_| {
                Item::new(
                    rng.gen_range(1..=args.max_side),
                    rng.gen_range(1..=args.max_side),
                )
            })
            .collect::<rect_packer::Result<Vec<_>>>()?
    } else if !args.items.is_empty() {
        args.items
            .iter()
            .map(|d| Item::new(d.width, d.height))
            .collect::<rect_packer::Result<Vec<_>>>()?
    } else {
        fixture()?
    };
    Ok(Problem { bin, items })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let problem = load_problem(&args)?;
    log::info!(
        "packing {} items into a {}x{} bin",
        problem.items.len(),
        problem.bin.width(),
        problem.bin.height()
    );
    let result = Packer::new(problem.bin).pack(&problem.items);

    match args.format {
        Format::Text => println!("{}", render::text(&result)),
        Format::Json => println!("{}", render::json(&result)?),
    }

    if let Some(path) = &args.png {
        render::save_png(&result, args.scale, path)
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("wrote {}", path.display());
    }

    if !result.unplaced.is_empty() {
        log::warn!("{} of {} items did not fit", result.unplaced.len(), problem.items.len());
    }

    Ok(())
}
