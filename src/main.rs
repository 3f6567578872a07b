use btorsim::engine::{defaults, Simulation, SimulationOptions};
use btorsim::parser::parse_model;
use btorsim::witness::check_witnesses;
use clap::error::ErrorKind;
use clap::Parser;
use log::{info, LevelFilter};
use std::fmt::Display;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::PathBuf;
use std::process;

#[derive(Parser, Debug)]
#[command(name = "btorsim")]
#[command(version)]
#[command(about = "Simulates a BTOR2 model and checks BTOR2 witnesses.", long_about = None)]
struct Args {
    /// Check only <WITNESS> and do not print the trace
    #[arg(short = 'c')]
    check_only: bool,

    /// Increase verbosity level (repeat for more)
    #[arg(short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,

    /// Generate <N> random transitions (default 20)
    #[arg(short = 'r', value_name = "N", value_parser = clap::value_parser!(i64).range(0..))]
    random_steps: Option<i64>,

    /// Random seed (default 0)
    #[arg(short = 's', value_name = "S")]
    seed: Option<u32>,

    /// Fake the trace header to claim bad state property 'b<N>'
    #[arg(short = 'b', value_name = "N", value_parser = clap::value_parser!(i64).range(0..))]
    fake_bad: Option<i64>,

    /// Fake the trace header to claim justice property 'j<N>'
    #[arg(short = 'j', value_name = "N", value_parser = clap::value_parser!(i64).range(0..))]
    fake_justice: Option<i64>,

    /// Print state assignments at every cycle, not just at '#0'
    #[arg(long = "states")]
    print_states: bool,

    /// Sequential model in BTOR2 format (stdin when omitted)
    #[arg(value_name = "BTOR")]
    model: Option<PathBuf>,

    /// Trace in BTOR2 witness format (enables checking mode)
    #[arg(value_name = "WITNESS")]
    witness: Option<PathBuf>,
}

fn die(message: impl Display) -> ! {
    eprintln!("*** 'btorsim' error: {message}");
    process::exit(1);
}

/// Parse errors render their own position information.
fn die_parse(message: impl Display) -> ! {
    eprintln!("*** 'btorsim' {message}");
    process::exit(1);
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            print!("{err}");
            process::exit(0);
        }
        Err(err) => {
            eprint!("{err}");
            process::exit(1);
        }
    };

    env_logger::builder()
        .filter_level(match args.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        })
        .format(|buf, record| writeln!(buf, "[btorsim] {}", record.args()))
        .init();

    let checking_mode = args.witness.is_some();
    if checking_mode {
        if args.random_steps.is_some() {
            die("number of random test vectors specified in checking mode");
        }
        if args.seed.is_some() {
            die("random seed specified in checking mode");
        }
        if args.fake_bad.is_some() {
            die("can not fake bad state property in checking mode");
        }
        if args.fake_justice.is_some() {
            die("can not fake justice property in checking mode");
        }
    } else if let Some(fake) = args.fake_justice {
        // justice properties are rejected at parse time, so no model can
        // satisfy this claim
        die(format!("invalid faked justice property number {fake}"));
    }

    let model = match &args.model {
        Some(path) => {
            info!("reading BTOR model from '{}'", path.display());
            let file = File::open(path).unwrap_or_else(|_| {
                die(format!(
                    "failed to open BTOR model file '{}' for reading",
                    path.display()
                ))
            });
            parse_model(BufReader::new(file), &path.display().to_string())
        }
        None => {
            info!("reading BTOR model from '<stdin>'");
            parse_model(io::stdin().lock(), "<stdin>")
        }
    }
    .unwrap_or_else(|err| die_parse(err));

    let stdout = io::stdout().lock();
    if let Some(witness_path) = &args.witness {
        info!("checking mode: both model and witness specified");
        let witness_file = File::open(witness_path).unwrap_or_else(|_| {
            die(format!(
                "failed to open witness file '{}' for reading",
                witness_path.display()
            ))
        });
        let options = SimulationOptions {
            print_trace: !args.check_only,
            ..Default::default()
        };
        info!("reading BTOR witness from '{}'", witness_path.display());
        if let Err(err) = check_witnesses(
            &model,
            BufReader::new(witness_file),
            &witness_path.display().to_string(),
            options,
            stdout,
        ) {
            if err.is_positional() {
                die_parse(err);
            } else {
                die(err);
            }
        }
    } else {
        info!("random mode: witness not specified");
        let options = SimulationOptions {
            bound: args.random_steps.unwrap_or(defaults::BOUND),
            seed: args.seed.unwrap_or(defaults::SEED),
            print_trace: !args.check_only,
            print_states: args.print_states,
            fake_bad: args.fake_bad,
        };
        info!("using random seed {}", options.seed);
        let mut sim = Simulation::new(&model, options, stdout).unwrap_or_else(|err| die(err));
        if let Err(err) = sim.run_random() {
            die(err);
        }
    }
}
