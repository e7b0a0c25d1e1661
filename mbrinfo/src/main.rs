//! mbrinfo: shows information about a Master Boot Record (MBR) volume system

mod logger;

use std::process::ExitCode;

use log::error;
use mbr::{partition_type, MbrError, Volume};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn print_usage() {
    eprintln!("Use mbrinfo to determine information about a Master Boot Record");
    eprintln!("(MBR) volume system.");
    eprintln!();
    eprintln!("Usage: mbrinfo [ -b bytes_per_sector ] [ -hvV ] source");
    eprintln!();
    eprintln!("\tsource: the source file");
    eprintln!();
    eprintln!("\t-b:     specify the number of bytes per sector (default is 512)");
    eprintln!("\t        supported values: 512, 1024, 2048, 4096");
    eprintln!("\t-h:     shows this help");
    eprintln!("\t-v:     verbose output to stderr");
    eprintln!("\t-V:     print version");
}

/// Parsed command line
#[derive(Debug, Default, PartialEq, Eq)]
struct Options {
    bytes_per_sector: Option<u32>,
    verbose: bool,
    source: Option<String>,
}

/// What the command line asks for
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Info(Options),
    Help,
    Version,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Command, String> {
    let mut options = Options::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" => return Ok(Command::Help),
            "-V" => return Ok(Command::Version),
            "-v" => options.verbose = true,
            "-b" => {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value for -b".to_string())?;
                let bytes_per_sector = value
                    .parse::<u32>()
                    .map_err(|_| format!("unsupported bytes per sector: {value}"))?;
                options.bytes_per_sector = Some(bytes_per_sector);
            }
            flag if flag.starts_with('-') && flag.len() > 1 => {
                return Err(format!("invalid argument: {flag}"));
            }
            source => {
                if options.source.is_some() {
                    return Err(format!("unexpected argument: {source}"));
                }
                options.source = Some(source.to_string());
            }
        }
    }

    Ok(Command::Info(options))
}

fn print_info(options: &Options, source: &str) -> Result<(), MbrError> {
    let mut volume = Volume::new();
    if let Some(bytes_per_sector) = options.bytes_per_sector {
        volume.set_bytes_per_sector(bytes_per_sector)?;
    }
    volume.open(source)?;

    println!("Master Boot Record (MBR) information:");
    println!("\tDisk identity\t\t: 0x{:08x}", volume.disk_identity());
    println!("\tBytes per sector\t: {}", volume.bytes_per_sector());
    println!("\tNumber of partitions\t: {}", volume.number_of_partitions());
    println!();

    for index in 0..volume.number_of_partitions() {
        let partition = volume.partition(index)?;
        let offset = partition.volume_offset();

        println!("Partition: {}", index + 1);
        println!(
            "\tType\t\t\t: 0x{:02x} ({})",
            partition.partition_type(),
            partition_type::description(partition.partition_type())
        );
        println!("\tOffset\t\t\t: {} (0x{:08x})", offset, offset);
        println!("\tSize\t\t\t: {}", partition.size());
        println!();
    }

    volume.close()
}

fn main() -> ExitCode {
    println!("mbrinfo {VERSION}");
    println!();

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let options = match command {
        Command::Help => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Command::Version => return ExitCode::SUCCESS,
        Command::Info(options) => options,
    };

    let Some(source) = options.source.as_deref() else {
        eprintln!("Missing source file.");
        print_usage();
        return ExitCode::FAILURE;
    };

    logger::init(options.verbose);

    match print_info(&options, source) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("unable to read volume {}: {}", source, err);
            eprintln!("Unable to open: {source}: {err}");
            ExitCode::FAILURE
        }
    }
}
