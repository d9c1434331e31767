use std::io::{self, IsTerminal, Write};

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

fn stderr() -> StandardStream {
    let choice = if io::stderr().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    StandardStream::stderr(choice)
}

/// Print schema warnings as a header line followed by one bullet each.
pub fn print_warnings(warnings: &[String]) -> io::Result<()> {
    if warnings.is_empty() {
        return Ok(());
    }

    let mut err = stderr();
    err.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)).set_bold(true))?;
    write!(
        err,
        "zedmap parser generated {} warnings while processing the schema:",
        warnings.len()
    )?;
    err.reset()?;
    writeln!(err)?;

    for w in warnings {
        writeln!(err, "* {w}")?;
    }
    err.flush()
}

pub fn error(msg: &str) {
    let mut err = stderr();
    let _ = err.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true));
    let _ = write!(err, "error:");
    let _ = err.reset();
    let _ = writeln!(err, " {msg}");
}
