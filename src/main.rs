
extern crate clap;
#[macro_use] extern crate log;
extern crate fern;
extern crate chrono;
extern crate term_grid;

pub mod frontend;

use clap::{Arg, ArgMatches, App};
use term_grid::{Grid, GridOptions, Direction, Filling, Cell};

use frontend::ir::OperationRecord;
use frontend::scanner::TokenKind;

fn main() {
    let args = process_arguments();
    initialize_logging(args.occurrences_of("verbose"));

    debug!("Arguments:\n\tVerbosity: {}\n\tScan Only: {}\n\tDump Intermediate: {}\n\tInfile: {}",
        match args.occurrences_of("verbose") {
            0 => log::LevelFilter::Error.to_string(),
            1 => log::LevelFilter::Warn.to_string(),
            2 => log::LevelFilter::Info.to_string(),
            3 | _ => log::LevelFilter::Debug.to_string(),
        },
        args.is_present("scan"),
        args.is_present("intermediate"),
        args.value_of("INPUT").unwrap()
    );

    let ifile = args.value_of("INPUT").unwrap();

    if args.is_present("scan") {
        let tokens = match frontend::scan_all(ifile) {
            Err(err) => {
                error!("fatal: unable to open input file `{}`: {}", ifile, err);
                std::process::exit(1);
            },
            Ok(tokens) => tokens,
        };

        for token in tokens.iter().filter(|token| token.kind != TokenKind::Eof) {
            println!("Line {}: Type: {}, Token: {}", token.line, token.kind, token.lexeme);
        }
        return;
    }

    let (status, records) = match frontend::parse(ifile) {
        Err(err) => {
            error!("fatal: unable to open input file `{}`: {}", ifile, err);
            std::process::exit(1);
        },
        Ok(result) => result,
    };

    if args.is_present("intermediate") {
        print_intermediate(&records);
    } else {
        println!("{}", status);
    }
}

/// Prints the intermediate form as a table: source line, opcode, then the
/// four sub-fields of each operand slot.
fn print_intermediate(records: &[OperationRecord]) {
    let mut grid = Grid::new(GridOptions {
        filling:     Filling::Spaces(1),
        direction:   Direction::LeftToRight,
    });

    for record in records {
        grid.add(Cell::from(format!("{}:", record.line)));
        grid.add(Cell::from(record.opcode.to_string()));
        for operand in record.operands.iter() {
            for field in operand.fields().iter() {
                grid.add(Cell::from(field.to_string()));
            }
        }
    }

    println!("{}", grid.fit_into_columns(14));
}

fn process_arguments() -> ArgMatches<'static> {
    App::new(option_env!("CARGO_PKG_NAME").unwrap())
        .version(option_env!("CARGO_PKG_VERSION").unwrap())
        .about(option_env!("CARGO_PKG_DESCRIPTION").unwrap())
        .arg(Arg::with_name("INPUT")
            .help("Sets the input file to use")
            .required(true)
            .multiple(false)
            .index(1))
        .arg(Arg::with_name("verbose")
            .short("v")
            .multiple(true)
            .takes_value(false)
            .help("Sets the level of verbosity"))
        .arg(Arg::with_name("scan")
            .short("s")
            .long("scan")
            .takes_value(false)
            .help("scan the input and list every token without parsing"))
        .arg(Arg::with_name("intermediate")
            .short("r")
            .long("intermediate")
            .takes_value(false)
            .conflicts_with("scan")
            .help("parse the input and print its intermediate representation"))
        .get_matches()
}

fn initialize_logging(verbosity: u64) {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(match verbosity {
            0 => log::LevelFilter::Error,
            1 => log::LevelFilter::Warn,
            2 => log::LevelFilter::Info,
            3 | _ => log::LevelFilter::Debug,
        })
        .chain(std::io::stdout())
        .apply().ok();
}
