use clap::{Arg, ArgAction, Command};
use std::io::{self, Write};

fn main() -> anyhow::Result<()> {
    let matches = Command::new("gen")
        .about("Write deterministic CSV to stdout")
        .arg(
            Arg::new("rows")
                .long("rows")
                .value_parser(clap::value_parser!(u64))
                .required(true),
        )
        .arg(
            Arg::new("with_header")
                .long("with-header")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("cols")
                .long("cols")
                .value_parser(clap::value_parser!(usize))
                .default_value("3"),
        )
        .arg(
            Arg::new("delim")
                .long("delim")
                .value_parser(clap::value_parser!(char))
                .default_value(","),
        )
        .arg(
            Arg::new("crlf")
                .long("crlf")
                .help("Terminate lines with CRLF (needed for --strict parsing)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("quote_every")
                .long("quote-every")
                .help("Every Nth row gets an escaped field with a doubled quote and a line break")
                .value_parser(clap::value_parser!(u64)),
        )
        .get_matches();

    let rows: u64 = *matches.get_one("rows").unwrap();
    let cols: usize = *matches.get_one("cols").unwrap();
    let delim: char = *matches.get_one("delim").unwrap();
    let with_header = matches.get_flag("with_header");
    let eol = if matches.get_flag("crlf") { "\r\n" } else { "\n" };
    let quote_every = matches.get_one::<u64>("quote_every").copied();

    let mut out = io::BufWriter::new(io::stdout().lock());

    if with_header {
        write!(&mut out, "sku")?;
        for i in 1..cols {
            write!(&mut out, "{delim}col{i}")?;
        }
        write!(&mut out, "{eol}")?;
    }

    // sku, col1, col2, ... with an occasional escaped last column
    for i in 0..rows {
        write!(&mut out, "SKU{:010}", i)?;
        let quoted = quote_every.is_some_and(|n| n > 0 && i % n == 0);
        for c in 1..cols {
            if quoted && c == cols - 1 {
                write!(&mut out, "{delim}\"v{c} \"\"{i}\"\"{eol}next\"")?;
            } else {
                write!(&mut out, "{delim}v{c}_{i}")?;
            }
        }
        write!(&mut out, "{eol}")?;
        if i % 10_000 == 0 {
            out.flush()?;
        }
    }

    out.flush()?;
    Ok(())
}
