use anyhow::{Context, Result};
use clap::Parser;
use clap::builder::styling::{AnsiColor, Color, Style};

use fft_tlm_sim::driver::generator::Generator;
use fft_tlm_sim::driver::Driver;

/// Drive deterministic frames through a simulated radix-2 DIF FFT
/// accelerator and report pass/fail against a direct-DFT reference.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, styles = get_styles())]
struct Args {
    /// Hardware transform width the fabric is built for.
    #[arg(long, default_value_t = 16)]
    hw_size: usize,

    /// Transform sizes to run, one frame per entry (repeat the flag to run
    /// several). Sizes above `hw_size` are routed through 2D decomposition.
    #[arg(long = "size", num_args = 1.., default_values_t = vec![8usize])]
    sizes: Vec<usize>,

    /// Input sequence generator for every frame.
    #[arg(long, value_enum, default_value_t = GeneratorArg::Sequential)]
    generator: GeneratorArg,

    /// Seed for the `random-seeded` generator.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Print per-cycle and per-frame debug logs instead of just lifecycle
    /// events.
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum GeneratorArg {
    Sequential,
    RandomSeeded,
    UnitImpulse,
    Ones,
    Zeros,
}

impl GeneratorArg {
    fn into_generator(self, seed: u64) -> Generator {
        match self {
            GeneratorArg::Sequential => Generator::Sequential { start: 0 },
            GeneratorArg::RandomSeeded => Generator::RandomSeeded { seed },
            GeneratorArg::UnitImpulse => Generator::UnitImpulse { position: 0 },
            GeneratorArg::Ones => Generator::Ones,
            GeneratorArg::Zeros => Generator::Zeros,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose {
        &tracing::Level::DEBUG
    } else {
        &tracing::Level::INFO
    };
    logging_setup(log_level);

    let mut driver = Driver::new(args.hw_size);
    let generator = args.generator.into_generator(args.seed);
    let jobs: Vec<(usize, Generator)> = args.sizes.iter().map(|&s| (s, generator)).collect();

    let report = driver
        .run_batch(&jobs)
        .context("failed to run the requested batch of frames")?;

    for frame in &report.frames {
        let (label, colour) = if frame.passed {
            ("PASS", ansi_term::Colour::Green)
        } else {
            ("FAIL", ansi_term::Colour::Red)
        };
        println!(
            "{} frame {} (real_size={})",
            colour.bold().paint(label),
            frame.id,
            frame.real_size
        );
    }

    println!(
        "\n{} passed, {} failed, {} total",
        report.passed(),
        report.failed(),
        report.frames.len()
    );

    if !report.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

/// Cargo-like terminal color style for the CLI's own help/usage text.
fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .usage(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::BrightGreen))))
        .header(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::BrightGreen))))
        .literal(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
        .invalid(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .error(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
        .valid(
            Style::new()
                .bold()
                .underline()
                .fg_color(Some(Color::Ansi(AnsiColor::Green))),
        )
        .placeholder(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Cyan))))
}

fn logging_setup(max_level: &'static tracing::Level) {
    use tracing_subscriber::{filter, prelude::*};

    let filter = filter::filter_fn(move |meta| meta.level() <= max_level);
    let terminal_log = tracing_subscriber::fmt::layer()
        .compact()
        .with_file(false)
        .with_target(false)
        .without_time()
        .with_thread_names(false)
        .with_filter(filter);

    tracing_subscriber::registry().with(terminal_log).init();
}
