//! `mtfind` CLI driver.
//!
//! ```text
//! mtfind <INPUT> <PATTERN>
//! ```
//!
//! Everything outside the core lives here: argument handling, the help
//! page, input classification (stdin vs file, mappable vs not), searcher
//! selection, and exit codes. Mapped files run divide-and-conquer over the
//! mapped region; stdin and unmappable files run round-robin over a
//! buffered stream.

use std::cell::RefCell;
use std::env;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use std::process::ExitCode;

use mtfind::input::{check_regular_file, map_file, InputError};
use mtfind::sink::FindingWriter;
use mtfind::strat::StrategyError;
use mtfind::{
    divide_and_conquer, round_robin, Finding, MaskedBoyerMooreSearcher, MemmemSearcher, Pattern,
    Searcher, StreamSplitter, Tokenizer,
};

const STREAM_BUF_CAPACITY: usize = 64 * 1024;

fn print_help() {
    println!(
        r#"usage: mtfind INPUT PATTERN

    INPUT   - an input file to process, or '-' to read stdin
    PATTERN - the mask to search for

    A pattern must meet the following format (EBNF):
        PATTERN = SYMBOL, {{ SYMBOL }}

        SYMBOL is a 7-bit symbol encoded from 0 up to 126, excluding line
        terminators, or '?', which matches any single symbol.

    Output is one line with the total number of findings, then one line
    per finding: the 1-based line number, the 1-based position in the
    line, and the finding itself.

examples:
    > mtfind input.txt "?ad"
        Finds "bad", "mad", "sad", " ad", ";ad", and so on; separators
        and whitespace also meet '?'.

    > mtfind input.txt "??"
        Splits every line into pairs of symbols.

    > mtfind input.txt "wor:d"
        Finds occurrences of "wor:d"; ':' is as ordinary as any letter.

    > cat input.txt | mtfind - "wor:d"
        The same, reading from stdin through a pipe."#
    );
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}

fn main() -> ExitCode {
    let mut args = env::args_os();
    let _exe = args.next();

    let Some(input) = args.next() else {
        print_help();
        return ExitCode::SUCCESS;
    };
    let Some(pattern_arg) = args.next() else {
        eprintln!("error: invalid number of parameters");
        print_help();
        return ExitCode::FAILURE;
    };
    for extra in args {
        eprintln!(
            "warning: redundant parameter '{}' provided, skipped",
            extra.to_string_lossy()
        );
    }

    let pattern = match pattern_arg.to_str().map(str::as_bytes).map(Pattern::parse) {
        Some(Ok(pattern)) => pattern,
        _ => {
            eprintln!("error: pattern has incorrect format");
            print_help();
            return ExitCode::FAILURE;
        }
    };

    let workers = default_workers();

    let outcome = if input == "-" {
        dispatch_stream(io::stdin().lock(), &pattern, workers).map(|()| ExitCode::SUCCESS)
    } else {
        run_file(Path::new(&input), &pattern, workers)
    };

    match outcome {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_file(path: &Path, pattern: &Pattern, workers: usize) -> Result<ExitCode, RunError> {
    let len = check_regular_file(path).map_err(RunError::Input)?;
    if len == 0 {
        // An empty file is a successful no-op, not an error.
        eprintln!("input file {} is empty", path.display());
        return Ok(ExitCode::SUCCESS);
    }

    match map_file(path) {
        Ok(region) => {
            dispatch_region(region.as_bytes(), pattern, workers)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            eprintln!("warning: mapping file {} failed: {err}", path.display());
            eprintln!("warning: falling back to stream-oriented reading");
            let file = File::open(path).map_err(|source| {
                RunError::Input(InputError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            })?;
            let reader = BufReader::with_capacity(STREAM_BUF_CAPACITY, file);
            dispatch_stream(reader, pattern, workers)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn dispatch_region(region: &[u8], pattern: &Pattern, workers: usize) -> Result<(), RunError> {
    if pattern.is_masked() {
        run_region(region, MaskedBoyerMooreSearcher::new(pattern), workers)
    } else {
        run_region(region, MemmemSearcher::new(pattern), workers)
    }
}

fn dispatch_stream<R: io::BufRead>(
    reader: R,
    pattern: &Pattern,
    workers: usize,
) -> Result<(), RunError> {
    if pattern.is_masked() {
        run_stream(reader, MaskedBoyerMooreSearcher::new(pattern), workers)
    } else {
        run_stream(reader, MemmemSearcher::new(pattern), workers)
    }
}

fn run_region<S: Searcher + Sync>(
    region: &[u8],
    searcher: S,
    workers: usize,
) -> Result<(), RunError> {
    let tokenizer = Tokenizer::new(searcher);
    let stdout = io::stdout();
    // The count sink and the item sink both need the writer; they run
    // sequentially on this thread, so a RefCell shares it between them.
    let writer = RefCell::new(FindingWriter::new(stdout.lock()));

    divide_and_conquer(
        region,
        &tokenizer,
        b'\n',
        workers,
        |total| writer.borrow_mut().write_total(total),
        |finding: Finding<&[u8]>| {
            writer
                .borrow_mut()
                .write_finding(finding.line, finding.column, finding.text)
        },
    )?;

    writer.into_inner().finish().map_err(RunError::Output)
}

fn run_stream<S: Searcher + Sync, R: io::BufRead>(
    reader: R,
    searcher: S,
    workers: usize,
) -> Result<(), RunError> {
    let tokenizer = Tokenizer::new(searcher);
    let splitter = StreamSplitter::new(reader, b'\n');
    let stdout = io::stdout();
    let writer = RefCell::new(FindingWriter::new(stdout.lock()));

    round_robin(
        splitter,
        &tokenizer,
        workers,
        |total| writer.borrow_mut().write_total(total),
        |finding: Finding<Vec<u8>>| {
            writer
                .borrow_mut()
                .write_finding(finding.line, finding.column, &finding.text)
        },
    )?;

    writer.into_inner().finish().map_err(RunError::Output)
}

/// Driver-level failures mapped to nonzero exit codes.
#[derive(Debug)]
enum RunError {
    Input(InputError),
    Strategy(StrategyError),
    Output(io::Error),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Input(err) => err.fmt(f),
            Self::Strategy(err) => err.fmt(f),
            Self::Output(err) => write!(f, "writing output failed: {err}"),
        }
    }
}

impl From<StrategyError> for RunError {
    fn from(err: StrategyError) -> Self {
        Self::Strategy(err)
    }
}
