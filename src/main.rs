//! bpl-optimize-type — sample a character type and refine it under its prior.
//!
//! Pipeline:
//! 1. Load the primitive library from `--lib-dir`, or build a synthetic one.
//! 2. Sample a type with `--ns` strokes (drawn from the library if omitted).
//! 3. Register shapes (unbounded) and inverse scales (lower bound 1e-4).
//! 4. Run projected gradient ascent on the prior log-probability; every
//!    `--every` iterations, sample two tokens and print their images.
//! 5. Report the objective trajectory.
use anyhow::{Context, Result};
use bpl_rs::{
    library::Library,
    model::prelude::*,
    optimization::{
        ascent::{
            AscentOptions, BoundPolicy, DEFAULT_CHECKPOINT_EVERY, DEFAULT_MAX_ITER,
            DEFAULT_STEP_SIZE, maximize_projected_with,
        },
        errors::{OptError, OptResult},
    },
};
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use slog::{Drain, Level, LevelFilter, Logger, info, o};
use std::{io::Write, path::PathBuf};

/// Sample a character type from a stroke-primitive prior and refine its
/// continuous parameters by projected gradient ascent on the prior
/// log-probability.
#[derive(Parser, Debug)]
#[command(name = "bpl-optimize-type", version, about, long_about = None)]
struct Cli {
    /// Number of strokes; drawn from the library when omitted
    #[arg(long)]
    ns: Option<usize>,

    /// Directory containing `library.json`; a synthetic library is used when omitted
    #[arg(long, value_name = "DIR")]
    lib_dir: Option<PathBuf>,

    /// Primitives in the synthetic library
    #[arg(long, default_value_t = 24)]
    n_primitives: usize,

    /// Iterations of projected ascent
    #[arg(long, default_value_t = DEFAULT_MAX_ITER)]
    iters: usize,

    /// Step size α
    #[arg(long, default_value_t = DEFAULT_STEP_SIZE)]
    lr: f64,

    /// Checkpoint cadence (iterations)
    #[arg(long, default_value_t = DEFAULT_CHECKPOINT_EVERY)]
    every: usize,

    /// Seed for the library, the type and the tokens
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Stop with an error on NaN/±inf objective or parameters
    #[arg(long)]
    halt_on_non_finite: bool,

    /// Print the full objective trajectory at the end
    #[arg(long)]
    print_trajectory: bool,

    /// Log every iteration
    #[arg(short, long)]
    verbose: bool,
}

/// Downsampling factor for ASCII images.
const ASCII_CELL: usize = 3;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let logger = terminal_logger(cli.verbose);

    let lib = match &cli.lib_dir {
        Some(dir) => Library::load(dir)
            .with_context(|| format!("loading primitive library from {}", dir.display()))?,
        None => Library::synthetic(cli.n_primitives, cli.seed)
            .context("building synthetic library")?,
    };
    info!(logger, "library ready"; "primitives" => lib.n_primitives(), "ncpt" => lib.ncpt());

    let mut rng = StdRng::seed_from_u64(cli.seed);
    let dist = TypeDistribution::new(&lib);
    let mut ctype = dist.sample_type(cli.ns, &mut rng).context("sampling character type")?;
    let registered = BoundPolicy::default().register(&mut ctype)?;
    info!(logger, "type sampled";
        "strokes" => ctype.n_strokes(), "registered_tensors" => registered);

    let opts =
        AscentOptions::new(cli.iters, cli.lr, cli.every, cli.halt_on_non_finite, cli.verbose)?;
    let sampler = TokenSampler::default();
    let mut show_tokens = |iteration: usize, ctype: &CharacterType| -> OptResult<()> {
        let (_, first) = sampler.sample_image(ctype, &mut rng)?;
        let (_, second) = sampler.sample_image(ctype, &mut rng)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "--- iteration {iteration} ---")
            .and_then(|_| out.write_all(ascii_pair(&first, &second).as_bytes()))
            .map_err(|e| OptError::CheckpointFailed { iteration, text: e.to_string() })
    };

    let outcome = maximize_projected_with(
        &PriorObjective::new(dist),
        &mut ctype,
        &opts,
        &mut show_tokens,
        &logger,
    )?;

    if cli.print_trajectory {
        for (iter, value) in outcome.trajectory.iter().enumerate() {
            println!("{iter}\t{value}");
        }
    }
    let (best_iter, best) = outcome.best().unwrap_or((0, f64::NAN));
    println!(
        "objective: first = {:.4}, last = {:.4}, best = {best:.4} (iteration {best_iter}), \
         final = {:.4}",
        outcome.first().unwrap_or(f64::NAN),
        outcome.last().unwrap_or(f64::NAN),
        outcome.final_value,
    );
    Ok(())
}

/// Terminal logger on a background thread.
fn terminal_logger(verbose: bool) -> Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let level = if verbose { Level::Debug } else { Level::Info };
    Logger::root(LevelFilter::new(drain, level).fuse(), o!())
}

/// Two binary images side by side, one character per `ASCII_CELL²` block
/// (`#` if any pixel in the block is on).
fn ascii_pair(left: &BinaryImage, right: &BinaryImage) -> String {
    let (h, w) = left.dim();
    let rows = h.div_ceil(ASCII_CELL);
    let cols = w.div_ceil(ASCII_CELL);
    let cell = |img: &BinaryImage, r: usize, c: usize| {
        let mut row_span = r * ASCII_CELL..((r + 1) * ASCII_CELL).min(img.nrows());
        let col_span = c * ASCII_CELL..((c + 1) * ASCII_CELL).min(img.ncols());
        let on = row_span.any(|i| col_span.clone().any(|j| img[[i, j]]));
        if on { '#' } else { '.' }
    };
    let mut out = String::with_capacity(rows * (2 * cols + 4));
    for r in 0..rows {
        out.extend((0..cols).map(|c| cell(left, r, c)));
        out.push_str("   ");
        out.extend((0..cols).map(|c| cell(right, r, c)));
        out.push('\n');
    }
    out
}
