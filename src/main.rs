use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use xydata::config::load_config;
use xydata::{report, Range, SampledFunction};

#[derive(Parser)]
#[command(
    name = "xydata",
    version,
    about = "Analyses x-y data sets: fronts, fits, statistics and interpolation"
)]
struct Cli {
    /// Path to a TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct Input {
    /// Input data (two columns: x y)
    #[arg(short, long)]
    input: PathBuf,

    /// Omit the header, only data output
    #[arg(short, long)]
    nohead: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate fronts within the data and print their widths
    FrontWidth {
        #[command(flatten)]
        input: Input,

        /// Lower threshold as a fraction of the y range
        #[arg(long)]
        lower: Option<f64>,

        /// Upper threshold as a fraction of the y range
        #[arg(long)]
        upper: Option<f64>,
    },

    /// Print a linear least squares fit
    Fit {
        #[command(flatten)]
        input: Input,

        /// Number of x values the fit is printed at
        #[arg(short, long)]
        points: Option<usize>,
    },

    /// Print mean value, standard deviation and mean squared error
    Stats {
        #[command(flatten)]
        input: Input,
    },

    /// Find x where f(x) equals given values and evaluate f at given x
    Probe {
        #[command(flatten)]
        input: Input,

        /// Values of y to locate (repeatable)
        #[arg(short = 'y', long = "y-value", allow_negative_numbers = true)]
        ys: Vec<f64>,

        /// Values of x to evaluate f at (repeatable)
        #[arg(short = 'x', long = "x-value", allow_negative_numbers = true)]
        xs: Vec<f64>,
    },

    /// Summarise the data set
    Info {
        #[command(flatten)]
        input: Input,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::FrontWidth {
            input,
            lower,
            upper,
        } => {
            if let Some(lower) = lower {
                config.front.lower = lower;
            }
            if let Some(upper) = upper {
                config.front.upper = upper;
            }
            config.validate()?;

            let f = load(&input.input)?;
            let yrange = f.yrange();
            let thresholds = Range::new(
                yrange.lerp(config.front.lower),
                yrange.lerp(config.front.upper),
            );
            log::info!("searching fronts between y = {thresholds}");
            let steps = f.find_step(thresholds);
            report::write_steps(&mut out, &steps, !input.nohead)?;
        }
        Commands::Fit { input, points } => {
            if let Some(points) = points {
                config.fit.points = points;
            }
            config.validate()?;

            let f = load(&input.input)?;
            let fit = f
                .linear_least_squares_fit()
                .with_context(|| format!("fitting {}", input.input.display()))?;
            report::write_fit(
                &mut out,
                &input.input.display().to_string(),
                &f,
                &fit,
                config.fit.points,
                !input.nohead,
            )?;
        }
        Commands::Stats { input } => {
            let f = load(&input.input)?;
            report::write_stats(&mut out, &f, !input.nohead)?;
        }
        Commands::Probe { input, ys, xs } => {
            let f = load(&input.input)?;
            let stderr = io::stderr();
            let mut err = stderr.lock();
            report::write_probe(&mut out, &mut err, &f, &ys, &xs, !input.nohead)?;
        }
        Commands::Info { input } => {
            let f = load(&input.input)?;
            report::write_info(&mut out, &input.input.display().to_string(), &f)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn load(path: &Path) -> Result<SampledFunction> {
    SampledFunction::load(path).with_context(|| format!("loading {}", path.display()))
}
