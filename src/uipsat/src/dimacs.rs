/*****************************************************************************************[dimacs.rs]
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

//! Reading problems in DIMACS CNF, and writing results.

use {
    crate::{
        interface::SolverInterface,
        {lbool, Lit},
    },
    std::io::{self, BufRead, Write},
};

/// Largest variable index the reader accepts, in the header or in a clause.
pub const MAX_VARS: i32 = 1 << 24;

/// `parse(input, solver, is_strict)` adds the content of `input` to the solver
///
/// The problem line `p cnf <vars> <clauses>` allocates its variables in
/// `solver`, so that variables absent from every clause still get a value
/// in the model.
///
/// ## Params
/// - `is_strict` if true, will fail if number of clauses/vars does not match the declared header
pub fn parse<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &mut S,
    is_strict: bool,
) -> io::Result<()> {
    let mut lits = vec![];
    let mut header: Option<(i32, i32)> = None;
    let mut num_read_clauses = 0;
    let mut max_var = 0;
    loop {
        skip_whitespace(input)?;
        let ch = next_byte(input)?;
        if ch == Some(b'p') {
            let mut prefix = [0; 5];
            input.read_exact(&mut prefix)?;
            if &prefix != b"p cnf" {
                return parse_error(format!("unexpected char: p"));
            }
            let num_vars = parse_int(input)?;
            let num_clauses = parse_int(input)?;
            if num_vars < 0 || num_clauses < 0 {
                return parse_error(format!("negative count in problem line"));
            }
            if num_vars > MAX_VARS {
                return parse_error(format!("too many variables: {}", num_vars));
            }
            debug!("header: {} vars, {} clauses", num_vars, num_clauses);
            if num_vars > 0 {
                solver.var_of_int(num_vars as u32 - 1);
            }
            header = Some((num_vars, num_clauses));
        } else if ch == Some(b'c') {
            skip_line(input)?;
        } else if let Some(_) = ch {
            read_clause(input, solver, &mut lits)?;
            for lit in &lits {
                max_var = max_var.max(lit.var().idx() as i32 + 1);
            }
            solver.add_clause_reuse(&mut lits);
            num_read_clauses += 1;
        } else {
            break;
        }
    }
    if is_strict {
        match header {
            None => return parse_error(format!("missing problem line")),
            Some((_, num_clauses)) if num_clauses != num_read_clauses => {
                return parse_error(format!(
                    "DIMACS header mismatch: wrong number of clauses"
                ));
            }
            Some((num_vars, _)) if max_var > num_vars => {
                return parse_error(format!(
                    "DIMACS header mismatch: wrong number of variables"
                ));
            }
            Some(_) => (),
        }
    }
    Ok(())
}

/// Write the result of `solver.solve_limited()` in the usual result file
/// format: `s SATISFIABLE` followed by the model, `s UNSATISFIABLE`,
/// or `s INDETERMINATE`.
pub fn write_result<S: SolverInterface, W: Write>(
    out: &mut W,
    solver: &S,
    res: lbool,
) -> io::Result<()> {
    if res == lbool::TRUE {
        writeln!(out, "s SATISFIABLE")?;
        write!(out, "v ")?;
        for (i, &val) in solver.get_model().iter().enumerate() {
            let lit = i as i32 + 1;
            if val == lbool::TRUE {
                write!(out, "{} ", lit)?;
            } else if val == lbool::FALSE {
                write!(out, "{} ", -lit)?;
            }
        }
        writeln!(out, "0")
    } else if res == lbool::FALSE {
        writeln!(out, "s UNSATISFIABLE")
    } else {
        writeln!(out, "s INDETERMINATE")
    }
}

fn read_clause<S: SolverInterface, R: BufRead>(
    input: &mut R,
    solver: &mut S,
    lits: &mut Vec<Lit>,
) -> io::Result<()> {
    lits.clear();
    loop {
        let parsed_lit = parse_int(input)?;
        if parsed_lit == 0 {
            return Ok(());
        }
        if parsed_lit.unsigned_abs() > MAX_VARS as u32 {
            return parse_error(format!("too many variables: {}", parsed_lit.unsigned_abs()));
        }
        let var = parsed_lit.unsigned_abs() - 1;
        let lit = Lit::new(solver.var_of_int(var), parsed_lit > 0);
        lits.push(lit);
    }
}

fn parse_int<R: BufRead>(input: &mut R) -> io::Result<i32> {
    skip_whitespace(input)?;
    let ch = next_byte(input)?;
    let neg = if ch == Some(b'+') || ch == Some(b'-') {
        input.consume(1);
        ch == Some(b'-')
    } else {
        false
    };
    if let Some(ch) = next_byte(input)? {
        if !(b'0' <= ch && ch <= b'9') {
            return parse_error(format!("unexpected char: {}", ch as char));
        }
    } else {
        return parse_error(format!("unexpected EOF"));
    };
    let mut val: i32 = 0;
    while let Some(ch) = next_byte(input)? {
        if !(b'0' <= ch && ch <= b'9') {
            break;
        }
        input.consume(1);
        val = match val.checked_mul(10).and_then(|v| v.checked_add((ch - b'0') as i32)) {
            Some(v) => v,
            None => return parse_error(format!("integer too large")),
        };
    }
    if neg {
        Ok(-val)
    } else {
        Ok(val)
    }
}

#[inline(always)]
fn is_whitespace(ch: Option<u8>) -> bool {
    ch.map(|ch| b'\x09' <= ch && ch <= b'\x0d' || ch == b' ')
        .unwrap_or(false)
}

fn skip_whitespace<R: BufRead>(input: &mut R) -> io::Result<()> {
    while is_whitespace(next_byte(input)?) {
        input.consume(1);
    }
    Ok(())
}

fn skip_line<R: BufRead>(input: &mut R) -> io::Result<()> {
    while let Some(ch) = next_byte(input)? {
        input.consume(1);
        if ch == b'\n' {
            break;
        }
    }
    Ok(())
}

fn next_byte<R: BufRead>(input: &mut R) -> io::Result<Option<u8>> {
    Ok(input.fill_buf()?.first().copied())
}

fn parse_error<T>(message: String) -> io::Result<T> {
    Err(io::Error::new(io::ErrorKind::InvalidInput, message))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::BasicSolver;

    fn parse_str(s: &str, is_strict: bool) -> io::Result<BasicSolver> {
        let mut solver = BasicSolver::default();
        parse(&mut s.as_bytes(), &mut solver, is_strict)?;
        Ok(solver)
    }

    #[test]
    fn test_parse_simple() {
        let s = parse_str("c a comment\np cnf 4 2\n1 -2 0\n2 3 0\n", true).unwrap();
        assert_eq!(s.num_vars(), 4);
        assert_eq!(s.num_clauses(), 2);
    }

    #[test]
    fn test_parse_multiline_clause() {
        let s = parse_str("p cnf 3 1\n1\n  -2\n\t3 0", true).unwrap();
        assert_eq!(s.num_clauses(), 1);
    }

    #[test]
    fn test_parse_without_header() {
        let s = parse_str("1 -5 0 2 0", false).unwrap();
        assert_eq!(s.num_vars(), 5);
        assert_eq!(s.num_clauses(), 2);
        assert!(parse_str("1 -5 0", true).is_err());
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_str("p cnf 2 1\n1 x 0\n", false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "unexpected char: x");

        let err = parse_str("p cnf 2 1\n1 2", false).unwrap_err();
        assert_eq!(err.to_string(), "unexpected EOF");

        assert!(parse_str("p dnf 2 1\n1 2 0", false).is_err());
        assert!(parse_str("1 99999999999 0", false).is_err());
    }

    #[test]
    fn test_parse_too_many_vars() {
        let err = parse_str("p cnf 2000000000 0\n", false).unwrap_err();
        assert_eq!(err.to_string(), "too many variables: 2000000000");
        let err = parse_str("1 -2000000000 0\n", false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);

        let max = format!("p cnf {} 1\n-{} 0\n", MAX_VARS, MAX_VARS);
        let s = parse_str(&max, true).unwrap();
        assert_eq!(s.num_vars(), MAX_VARS as u32);
        assert!(parse_str(&format!("{} 0", MAX_VARS + 1), false).is_err());
    }

    #[test]
    fn test_parse_strict_header() {
        assert!(parse_str("p cnf 2 2\n1 2 0\n", false).is_ok());
        let err = parse_str("p cnf 2 2\n1 2 0\n", true).unwrap_err();
        assert!(err.to_string().contains("wrong number of clauses"));
        let err = parse_str("p cnf 2 1\n1 3 0\n", true).unwrap_err();
        assert!(err.to_string().contains("wrong number of variables"));
    }

    #[test]
    fn test_write_result() {
        let mut s = parse_str("p cnf 3 2\n-1 0\n2 0\n", true).unwrap();
        let res = s.solve_limited();
        let mut out = vec![];
        write_result(&mut out, &s, res).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "s SATISFIABLE\nv -1 2 -3 0\n");

        let mut s = parse_str("p cnf 1 2\n-1 0\n1 0\n", true).unwrap();
        let res = s.solve_limited();
        let mut out = vec![];
        write_result(&mut out, &s, res).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "s UNSATISFIABLE\n");
    }
}
