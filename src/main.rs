use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use rustdeflate::deflate::lz77::DEFAULT_MAX_CHAIN;
use rustdeflate::CompressOptions;

/// Compress a file into a raw single-block DEFLATE stream
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// The input file to be compressed
    input: PathBuf,
    /// The output file [default: <INPUT>.deflate]
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Hash chain hops examined per match search
    #[arg(long, default_value_t = DEFAULT_MAX_CHAIN)]
    max_chain: usize,
    /// Log more (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            let mut name = self.input.clone().into_os_string();
            name.push(".deflate");
            PathBuf::from(name)
        })
    }

    fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to install logger: {}", err);
    }

    let output = args.output_path();
    let options = CompressOptions { max_chain: args.max_chain };

    println!("Compressing '{}' to '{}' using DEFLATE...", args.input.display(), output.display());

    match rustdeflate::compress(&args.input, &output, &options) {
        Ok(stats) => {
            println!("Compression complete!");
            println!("Input size:  {} bytes", stats.input_size);
            println!("Output size: {} bytes", stats.output_size);
            if let Some(ratio) = stats.ratio() {
                println!("Compression ratio: {:.2}%", ratio);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
