//! OrbFit to integrator initial conditions
//!
//! Reads the cartesian section of an OrbFit `fel`/`eq` file, converts it to
//! barycentric equatorial coordinates and writes the `holman_ic` file used to
//! start an integration.
//!
//! Usage:
//!   cargo run --bin orbfit_ic -- --ephemeris de440s.bsp path/to/object.eq

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::{warn, LevelFilter};
use orbfit_ic::elements::{Converter, InputFormat, IntegratorHeader};
use orbfit_ic::jplephem::{calendar, names};
use orbfit_ic::planetlib::{Ephemeris, FixedEphemeris, SpkEphemeris};
use orbfit_ic::Loader;

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Convert OrbFit elements to barycentric equatorial initial conditions
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Converts OrbFit elements to barycentric equatorial initial conditions",
    long_about = None
)]
struct Args {
    /// Element file to convert
    input: PathBuf,

    /// Input format: fel, eq or ele220
    #[arg(short, long, default_value = "eq")]
    format: InputFormat,

    /// SPK kernel; relative names are also looked up in the data directory
    #[arg(short, long, env = "ORBFIT_EPHEMERIS", default_value = "de440s.bsp")]
    ephemeris: PathBuf,

    /// Directory holding ephemeris kernels (default ~/.cache/orbfit-ic)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Treat the Sun as fixed at the barycenter instead of reading a kernel
    #[arg(long, action = ArgAction::SetTrue)]
    sun_at_barycenter: bool,

    /// Output file
    #[arg(short, long, default_value = orbfit_ic::elements::DEFAULT_OUTPUT)]
    output: PathBuf,

    /// JSON file overriding tstep, trange or geocentric
    #[arg(long)]
    header: Option<PathBuf>,

    /// Convert without writing the output file
    #[arg(long, action = ArgAction::SetTrue)]
    no_save: bool,

    /// Print the parsed and transformed elements as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Print the ephemeris segments before converting
    #[arg(long, action = ArgAction::SetTrue)]
    describe_ephemeris: bool,

    /// Increase log detail (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    let mut builder = pretty_env_logger::formatted_builder();
    builder.filter_level(level);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }
    builder.init();
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

/// Displays the segments of the kernel
fn display_segments(ephemeris: &SpkEphemeris) {
    let spk = ephemeris.spk();
    print_section_header(&format!("Ephemeris {} ({} segments)", spk.daf.ifname, spk.segments.len()));
    println!("{:<25} {:<25} {:<12} {:<12}", "Target", "Center", "Start Date", "End Date");

    let mut sorted_segments = spk.segments.clone();
    sorted_segments.sort_by(|a, b| a.center.cmp(&b.center).then_with(|| a.target.cmp(&b.target)));
    for segment in &sorted_segments {
        println!(
            "{:<25} {:<25} {:<12} {:<12}",
            names::describe_target(segment.target),
            names::describe_target(segment.center),
            calendar::format_date(segment.start_jd),
            calendar::format_date(segment.end_jd)
        );
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut loader = Loader::new();
    if let Some(dir) = &args.data_dir {
        loader = loader.with_data_dir(dir);
    }

    let ephemeris: Box<dyn Ephemeris> = if args.sun_at_barycenter {
        warn!("Sun fixed at the barycenter; output is heliocentric in all but name");
        Box::new(FixedEphemeris::zero())
    } else {
        let spk = loader.load_ephemeris(&args.ephemeris)?;
        if args.describe_ephemeris {
            display_segments(&spk);
        }
        Box::new(spk)
    };

    let header = match &args.header {
        Some(path) => IntegratorHeader::from_json_file(path)?,
        None => IntegratorHeader::default(),
    };

    let mut converter = Converter::new(ephemeris.as_ref()).with_header(header);
    converter = if args.no_save {
        converter.without_saving()
    } else {
        converter.save_to(&args.output)
    };

    let elements = converter.convert(&args.input, args.format)?;

    if args.json {
        println!("{}", elements.to_json()?);
    }
    if let Some(output) = converter.output() {
        println!("Wrote {}", output.display());
    }

    Ok(())
}
