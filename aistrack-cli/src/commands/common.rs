//! Output helpers shared across commands.

use std::io::{self, Write};

use aistrack::render::RenderTuple;

use crate::error::CliError;

/// Column header for text output.
pub const TABLE_HEADER: &str = "      MMSI          X          Y  HEADING  SCALE  COLOR";

/// One ship as a fixed-width text row.
pub fn format_row(ship: &RenderTuple) -> String {
    format!(
        "{:>10} {:>10} {:>10} {:>8.1} {:>6.2}  {}",
        ship.mmsi, ship.x, ship.y, ship.heading, ship.scale, ship.color
    )
}

/// Print a set of render tuples as a table, or as one JSON array.
pub fn print_ships(ships: &[RenderTuple], json: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_ships(&mut out, ships, json)
}

pub fn write_ships<W: Write>(out: &mut W, ships: &[RenderTuple], json: bool) -> Result<(), CliError> {
    if json {
        serde_json::to_writer(&mut *out, ships)
            .map_err(|e| CliError::Output(io::Error::other(e)))?;
        writeln!(out).map_err(CliError::Output)?;
    } else {
        writeln!(out, "{}", TABLE_HEADER).map_err(CliError::Output)?;
        for ship in ships {
            writeln!(out, "{}", format_row(ship)).map_err(CliError::Output)?;
        }
        writeln!(out, "{} ship(s)", ships.len()).map_err(CliError::Output)?;
    }
    out.flush().map_err(CliError::Output)
}
