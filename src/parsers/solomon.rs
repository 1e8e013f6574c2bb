//! Solomon VRPTW instance reader.
//!
//! Each data row holds seven numeric columns:
//! `id x y demand ready due service`. The first data row is the depot.
//! Blank lines, `#` comments, and header lines whose first token is not a
//! number are skipped. A two-column numeric line before the depot row is
//! read as the classic `vehicles capacity` header and ignored. Columns may
//! be separated by whitespace or commas.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::models::{Customer, Depot, Problem, ProblemError, TimeWindow, Vehicle};

const COLUMNS: usize = 7;

/// Failure to read or interpret an instance.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to read instance: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {reason}")]
    InvalidLine { line: usize, reason: String },
    #[error("instance contains no depot row")]
    Empty,
    #[error("instance describes an invalid problem: {0}")]
    Problem(#[from] ProblemError),
}

/// Parses instance text into the depot and its customers.
///
/// # Examples
///
/// ```
/// use ev_routing::parsers::parse_solomon;
///
/// let text = "\
/// # Customer: ID X Y Demand ReadyTime DueTime ServiceTime
/// 0 50 50 0 0 1000 0
/// 1 20 20 10 161 171 10
/// 2,30,40,7,50,60,10
/// ";
/// let (depot, customers) = parse_solomon(text).unwrap();
/// assert_eq!(depot.position(), (50.0, 50.0));
/// assert_eq!(customers.len(), 2);
/// assert_eq!(customers[1].time_window().due(), 60.0);
/// ```
pub fn parse_solomon(text: &str) -> Result<(Depot, Vec<Customer>), ParseError> {
    read_solomon_from(text.as_bytes())
}

/// Reads an instance file. See [`parse_solomon`] for the format.
pub fn read_solomon(path: impl AsRef<Path>) -> Result<(Depot, Vec<Customer>), ParseError> {
    let file = File::open(path.as_ref())?;
    read_solomon_from(file)
}

/// Reads an instance from any byte source.
pub fn read_solomon_from<R: Read>(source: R) -> Result<(Depot, Vec<Customer>), ParseError> {
    let reader = BufReader::new(source);
    let mut depot: Option<Depot> = None;
    let mut customers = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let tokens: Vec<&str> = trimmed
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.first().is_none_or(|t| t.parse::<f64>().is_err()) {
            continue;
        }

        if tokens.len() == 2 && depot.is_none() {
            debug!(line = number, "skipping fleet header");
            continue;
        }

        let row = parse_row(&tokens, number)?;
        match depot {
            None => {
                depot = Some(Depot::new(row.x, row.y).with_time_window(row.window));
            }
            Some(_) => {
                customers.push(
                    Customer::new(row.id, row.x, row.y, row.demand, row.service)
                        .with_time_window(row.window),
                );
            }
        }
    }

    let depot = depot.ok_or(ParseError::Empty)?;
    debug!(customers = customers.len(), "instance parsed");
    Ok((depot, customers))
}

/// Reads an instance file and builds a [`Problem`] served by `vehicles`.
pub fn load_problem(path: impl AsRef<Path>, vehicles: Vec<Vehicle>) -> Result<Problem, ParseError> {
    let (depot, customers) = read_solomon(path)?;
    Ok(Problem::new(depot, customers, vehicles)?)
}

struct Row {
    id: usize,
    x: f64,
    y: f64,
    demand: f64,
    window: TimeWindow,
    service: f64,
}

fn parse_row(tokens: &[&str], line: usize) -> Result<Row, ParseError> {
    if tokens.len() != COLUMNS {
        return Err(ParseError::InvalidLine {
            line,
            reason: format!("expected {COLUMNS} columns, found {}", tokens.len()),
        });
    }

    let mut values = [0.0; COLUMNS];
    for (slot, token) in values.iter_mut().zip(tokens) {
        *slot = token.parse::<f64>().map_err(|_| ParseError::InvalidLine {
            line,
            reason: format!("`{token}` is not a number"),
        })?;
    }
    let [id, x, y, demand, ready, due, service] = values;

    if id < 0.0 || id.fract() != 0.0 {
        return Err(ParseError::InvalidLine {
            line,
            reason: format!("id {id} is not a non-negative integer"),
        });
    }
    let window = TimeWindow::new(ready, due).ok_or_else(|| ParseError::InvalidLine {
        line,
        reason: format!("time window [{ready}, {due}] is empty"),
    })?;

    Ok(Row {
        id: id as usize,
        x,
        y,
        demand,
        window,
        service,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const C101_HEAD: &str = "\
# Sample Solomon C101 format data
# Customer: ID X Y Demand ReadyTime DueTime ServiceTime
0 50 50 0 0 1000 0
1 20 20 10 161 171 10
2 30 40 7 50 60 10
3 35 35 13 116 126 10
4 25 45 19 149 159 10
5 55 20 26 34 44 10
";

    #[test]
    fn test_parse_sample_rows() {
        let (depot, customers) = parse_solomon(C101_HEAD).expect("parses");
        assert_eq!(depot.position(), (50.0, 50.0));
        assert_eq!(depot.time_window().due(), 1000.0);
        assert_eq!(customers.len(), 5);

        let c4 = &customers[3];
        assert_eq!(c4.id(), 4);
        assert_eq!(c4.position(), (25.0, 45.0));
        assert_eq!(c4.demand(), 19.0);
        assert_eq!(c4.time_window().ready(), 149.0);
        assert_eq!(c4.service_duration(), 10.0);
    }

    #[test]
    fn test_classic_header_is_skipped() {
        let text = "\
C101

VEHICLE
NUMBER     CAPACITY
  25         200

CUSTOMER
CUST NO.  XCOORD.   YCOORD.    DEMAND   READY TIME  DUE DATE   SERVICE   TIME

    0      40         50          0          0       1236          0
    1      45         68         10        912        967         90
";
        let (depot, customers) = parse_solomon(text).expect("parses");
        assert_eq!(depot.position(), (40.0, 50.0));
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].service_duration(), 90.0);
    }

    #[test]
    fn test_parsed_rows_build_a_problem() {
        let (depot, customers) = parse_solomon(C101_HEAD).expect("parses");
        let problem = Problem::new(depot, customers, vec![Vehicle::default()]).expect("valid");
        assert_eq!(problem.num_customers(), 5);
    }

    #[test]
    fn test_wrong_column_count_names_line() {
        let err = parse_solomon("0 50 50 0 0 1000 0\n1 20 20 10 161\n").unwrap_err();
        match err {
            ParseError::InvalidLine { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_field() {
        let err = parse_solomon("0 50 50 0 0 1000 0\n1 20 x 10 161 171 10\n").unwrap_err();
        assert!(err.to_string().contains("`x` is not a number"));
    }

    #[test]
    fn test_empty_window_rejected() {
        let err = parse_solomon("0 50 50 0 0 1000 0\n1 20 20 10 50 50 10\n").unwrap_err();
        assert!(matches!(err, ParseError::InvalidLine { line: 2, .. }));
    }

    #[test]
    fn test_no_rows() {
        assert!(matches!(parse_solomon("# nothing here\n\n"), Err(ParseError::Empty)));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            read_solomon("/nonexistent/instance.txt"),
            Err(ParseError::Io(_))
        ));
    }
}
