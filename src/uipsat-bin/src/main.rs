/*****************************************************************************************[main.rs]
Copyright (c) 2003-2006, Niklas Een, Niklas Sorensson (MiniSat)
Copyright (c) 2007-2010, Niklas Sorensson (MiniSat)
Copyright (c) 2018-2018, Masaki Hara

Permission is hereby granted, free of charge, to any person obtaining a copy of this software and
associated documentation files (the "Software"), to deal in the Software without restriction,
including without limitation the rights to use, copy, modify, merge, publish, distribute,
sublicense, and/or sell copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all copies or
substantial portions of the Software.

THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING BUT
NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT
OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.
**************************************************************************************************/

extern crate clap;
extern crate cpu_time;
extern crate env_logger;
extern crate flate2;
#[macro_use]
extern crate log;
extern crate uipsat;

use clap::{App, Arg, ArgMatches};
use flate2::bufread::GzDecoder;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::process::exit;
use std::str::FromStr;
use std::time::Instant;
use uipsat::{
    dimacs, lbool, Callbacks, ProgressStatus, SimpStats, Solver, SolverInterface, SolverOpts,
};

mod system;

/// Callbacks of the command line solver: progress printing, and the
/// CPU time limit.
struct CliCallbacks {
    verbosity: i32,
    limit: Option<system::CpuLimit>,
}

impl Callbacks for CliCallbacks {
    fn on_start(&mut self) {
        if self.verbosity > 0 {
            println!("c {:=^79}", "[ Search Statistics ]");
        }
    }

    fn on_simplify(&mut self, stats: &SimpStats) {
        if self.verbosity > 0 {
            println!(
                "c |  Simplified: {:8} clauses removed, {:6} vars eliminated, {:6} units  |",
                stats.removed, stats.eliminated_vars, stats.units
            );
        }
    }

    fn on_progress(&mut self, p: &ProgressStatus) {
        if self.verbosity > 1 {
            println!(
                "c | {:9} conflicts | {:9} decisions | {:7} learnt | {:7} free vars | level {:4} |",
                p.conflicts, p.decisions, p.n_learnt, p.unassigned, p.level
            );
        }
    }

    fn on_result(&mut self, s: lbool) {
        debug!("result: {:?}", s);
        if self.verbosity > 0 {
            println!("c {:=<79}", "");
        }
    }

    fn stop(&self) -> bool {
        self.limit.as_ref().map_or(false, |l| l.exceeded())
    }
}

type CliSolver = Solver<CliCallbacks>;

fn main() {
    env_logger::init();
    let exitcode = main2().unwrap_or_else(|err| {
        eprintln!("{}", err);
        exit(1)
    });
    exit(exitcode);
}

fn parse_arg<T: FromStr>(matches: &ArgMatches, name: &str, default: T) -> T {
    matches
        .value_of(name)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn main2() -> io::Result<i32> {
    let resource = system::ResourceMeasure::new();

    let mut app = App::new("uipsat")
        .version("0.1.0")
        .about("CDCL SAT solver with first-UIP learning")
        .arg(Arg::with_name("input-file").help("DIMACS CNF file, possibly gzipped"))
        .arg(
            Arg::with_name("result-output-file").help(
                "Where to write the result [default: input file, extension replaced by 'sat']",
            ),
        )
        .arg(
            Arg::with_name("no-output")
                .long("no-output")
                .help("Do not write the result file"),
        )
        .arg(
            Arg::with_name("verbosity")
                .long("verb")
                .default_value("1")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("cpu-lim")
                .long("cpu-lim")
                .help("Give up after this many seconds of CPU time")
                .default_value("-1.0")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("is-strict")
                .long("strict")
                .help("Check the DIMACS problem line against the clauses"),
        )
        .arg(
            Arg::with_name("no-simp")
                .long("no-simp")
                .help("Do not simplify the clauses before search"),
        )
        .arg(Arg::with_name("max-learnt").long("max-learnt")
             .help("Longest learnt clause kept (0 = no limit)")
             .default_value("9")
             .takes_value(true))
        .arg(Arg::with_name("decay-interval").long("decay-interval")
             .help("Number of conflicts between two halvings of the activities")
             .default_value("50")
             .takes_value(true))
        .arg(Arg::with_name("elim-limit").long("elim-limit")
             .help("Occurrence limit for variable elimination (0 = no elimination)")
             .default_value("10")
             .takes_value(true));
    let matches = app.clone().get_matches();

    let mut solver_opts = SolverOpts::default();
    solver_opts.max_learnt_len = parse_arg(&matches, "max-learnt", solver_opts.max_learnt_len);
    solver_opts.decay_interval = parse_arg(&matches, "decay-interval", solver_opts.decay_interval);
    solver_opts.elim_occ_limit = parse_arg(&matches, "elim-limit", solver_opts.elim_occ_limit);
    solver_opts.preprocess = !matches.is_present("no-simp");

    if !solver_opts.check() {
        eprintln!("Invalid option value");
        exit(1);
    }

    let verbosity: i32 = parse_arg(&matches, "verbosity", 0);
    if verbosity < 0 || verbosity > 2 {
        eprintln!("ERROR! value <{}> is out of range for option \"verb\".", verbosity);
        exit(1);
    }
    let is_strict = matches.is_present("is-strict");
    let cpu_lim = matches
        .value_of("cpu-lim")
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|x| *x > 0.);

    let input_file = match matches.value_of("input-file") {
        Some(f) => f,
        None => {
            app.print_help().map_err(|e| io::Error::new(io::ErrorKind::Other, e.to_string()))?;
            println!();
            return Ok(0);
        }
    };
    let result_output_file = if matches.is_present("no-output") {
        None
    } else {
        Some(
            matches
                .value_of("result-output-file")
                .map(String::from)
                .unwrap_or_else(|| default_result_file(input_file)),
        )
    };

    let cb = CliCallbacks {
        verbosity,
        limit: cpu_lim.map(system::CpuLimit::new),
    };
    let mut solver = Solver::new(solver_opts, cb);

    let initial_time = Instant::now();
    debug!("solve file {}", input_file);
    let file = match File::open(input_file) {
        Ok(f) => BufReader::new(f),
        Err(_) => {
            eprintln!("PARSE ERROR: file not found: {}", input_file);
            return Ok(0);
        }
    };
    if let Err(e) = read_input_autogz(file, &mut solver, is_strict) {
        eprintln!("PARSE ERROR: {}", e);
        return Ok(0);
    }

    if verbosity > 0 {
        let duration = initial_time.elapsed();
        println!("c {:=^79}", "[ Problem Statistics ]");
        println!(
            "c |  Number of variables:  {:12}                                         |",
            solver.num_vars()
        );
        println!(
            "c |  Number of clauses:    {:12}                                         |",
            solver.num_clauses()
        );
        println!(
            "c |  Parse time:           {:9}.{:02} s                                       |",
            duration.as_secs(),
            duration.subsec_nanos() / 10_000_000
        );
    }

    let ret = solver.solve_limited();
    if verbosity > 0 {
        solver.print_stats();
        println!("c CPU time              : {:.3}s", resource.cpu_time());
    }
    println!("c clauses learned: {}", solver.num_learnts());
    println!("c branching decisions: {}", solver.num_decisions());
    if ret == lbool::TRUE {
        println!("s SATISFIABLE");
    } else if ret == lbool::FALSE {
        println!("s UNSATISFIABLE");
    } else {
        println!("s INDETERMINATE");
    }

    if let Some(path) = result_output_file {
        let mut resfile = BufWriter::new(File::create(&path)?);
        dimacs::write_result(&mut resfile, &solver, ret)?;
        resfile.flush()?;
        debug!("result written to {}", path);
    }

    let exitcode = if ret == lbool::TRUE {
        10
    } else if ret == lbool::FALSE {
        20
    } else {
        0
    };
    Ok(exitcode)
}

/// `foo.cnf` gives `foo.sat`; a `.gz` suffix is dropped first.
fn default_result_file(input: &str) -> String {
    let base = input.strip_suffix(".gz").unwrap_or(input);
    let mut end = base.len().saturating_sub(3);
    while !base.is_char_boundary(end) {
        end -= 1;
    }
    if end == 0 {
        format!("{}.sat", base)
    } else {
        format!("{}sat", &base[..end])
    }
}

fn read_input_autogz<R: BufRead>(
    mut input: R,
    solver: &mut CliSolver,
    is_strict: bool,
) -> io::Result<()> {
    let is_gz = input.fill_buf()?.starts_with(b"\x1F\x8B");
    if is_gz {
        dimacs::parse(&mut BufReader::new(GzDecoder::new(input)), solver, is_strict)
    } else {
        dimacs::parse(&mut input, solver, is_strict)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_default_result_file() {
        assert_eq!(default_result_file("foo.cnf"), "foo.sat");
        assert_eq!(default_result_file("dir/bar.cnf.gz"), "dir/bar.sat");
        assert_eq!(default_result_file("problem"), "probsat");
        assert_eq!(default_result_file("ab"), "ab.sat");
    }

    #[test]
    fn test_read_gz_input() {
        use flate2::{write::GzEncoder, Compression};

        let mut enc = GzEncoder::new(vec![], Compression::default());
        enc.write_all(b"p cnf 2 2\n1 2 0\n-1 0\n").unwrap();
        let bytes = enc.finish().unwrap();

        let cb = CliCallbacks {
            verbosity: 0,
            limit: None,
        };
        let mut solver = Solver::new(SolverOpts::default(), cb);
        read_input_autogz(&bytes[..], &mut solver, true).unwrap();
        assert_eq!(solver.num_clauses(), 2);
        assert_eq!(solver.solve_limited(), lbool::TRUE);
        let x2 = solver.var_of_int(1);
        assert_eq!(solver.value_var(x2), lbool::TRUE);
    }
}
