//! Interactive series picker.
//!
//! This is kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `labor show` and choose a series" UX

use std::io::{self, BufRead, Write};

use crate::domain::{Catalog, SeriesDef};
use crate::error::AppError;

/// Prompt the user to select a catalog series on stdin.
pub fn prompt_for_series(catalog: &Catalog) -> Result<SeriesDef, AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    pick_series(catalog, &mut stdin.lock(), &mut stdout.lock())
}

/// Picker loop over arbitrary input/output.
///
/// Behavior:
/// - list catalog series
/// - accept either a number (from the list), a series name, or an id
/// - `q` cancels
pub fn pick_series<R: BufRead, W: Write>(catalog: &Catalog, input: &mut R, out: &mut W) -> Result<SeriesDef, AppError> {
    let io_err = |e: io::Error| AppError::invalid_input(format!("Failed to prompt for a series: {e}"));

    writeln!(out, "Configured series:").map_err(io_err)?;
    for (idx, series) in catalog.iter().enumerate() {
        writeln!(out, "{:>3}) {}", idx + 1, series.name).map_err(io_err)?;
    }

    loop {
        write!(out, "Select a series by number (1-{}) or name (q to quit): ", catalog.len()).map_err(io_err)?;
        out.flush().map_err(io_err)?;

        let mut line = String::new();
        let bytes = input.read_line(&mut line).map_err(io_err)?;
        if bytes == 0 {
            return Err(AppError::invalid_input(
                "No input received. Pass a series with `labor show -s <name>`.",
            ));
        }

        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Err(AppError::invalid_input("Canceled."));
        }
        if line.is_empty() {
            continue;
        }

        if let Ok(choice) = line.parse::<usize>() {
            if let Some(series) = choice.checked_sub(1).and_then(|i| catalog.get(i)) {
                return Ok(series.clone());
            }
            writeln!(out, "Invalid choice: {choice}. Enter a number between 1 and {}.", catalog.len())
                .map_err(io_err)?;
            continue;
        }

        match catalog.resolve(line) {
            Ok(series) => return Ok(series.clone()),
            Err(err) => {
                writeln!(out, "{err}").map_err(io_err)?;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_catalog;

    fn catalog() -> Catalog {
        Catalog::new(default_catalog()).unwrap()
    }

    #[test]
    fn picks_by_number() {
        let mut input = "2\n".as_bytes();
        let mut out = Vec::new();
        let s = pick_series(&catalog(), &mut input, &mut out).unwrap();
        assert_eq!(s.id, "LNS14000000");
        assert!(String::from_utf8(out).unwrap().contains("  1) Total Nonfarm Employment"));
    }

    #[test]
    fn retries_after_bad_input_then_accepts_name() {
        let mut input = "99\nnonsense\nmanufacturing employment\n".as_bytes();
        let mut out = Vec::new();
        let s = pick_series(&catalog(), &mut input, &mut out).unwrap();
        assert_eq!(s.id, "CES3000000001");
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Invalid choice: 99"));
        assert!(text.contains("Unknown series 'nonsense'"));
    }

    #[test]
    fn quit_and_eof_cancel() {
        let mut out = Vec::new();
        assert!(pick_series(&catalog(), &mut "q\n".as_bytes(), &mut out).is_err());
        assert!(pick_series(&catalog(), &mut "".as_bytes(), &mut out).is_err());
    }
}
