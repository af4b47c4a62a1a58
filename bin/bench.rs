use clap::{Arg, ArgAction, Command};
use crc32fast::Hasher as Crc32;
use csv_records::{CsvParser, Encoding, ParserOptions, Record};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_target(true)
        .init();

    let matches = Command::new("bench")
        .arg(Arg::new("path").long("path").required(true).value_parser(clap::value_parser!(PathBuf)))
        .arg(Arg::new("delimiter").long("delimiter").default_value(",").value_parser(clap::value_parser!(char)))
        .arg(Arg::new("no-headers").long("no-headers").help("Treat the first row as data").action(ArgAction::SetTrue))
        .arg(Arg::new("strict").long("strict").help("Require CRLF line endings").action(ArgAction::SetTrue))
        .arg(Arg::new("ascii").long("ascii").help("Only accept printable ASCII field content").action(ArgAction::SetTrue))
        .arg(Arg::new("verify").long("verify").help("CRC32 over every field value, in record order").action(ArgAction::SetTrue))
        .arg(Arg::new("mmap").long("mmap").help("Map the file instead of reading it (feature: fast_local)").action(ArgAction::SetTrue))
        .get_matches();

    let path = matches.get_one::<PathBuf>("path").unwrap();
    let options = ParserOptions::new()
        .delimiter(*matches.get_one::<char>("delimiter").unwrap())
        .headers(!matches.get_flag("no-headers"))
        .strict(matches.get_flag("strict"))
        .encoding(if matches.get_flag("ascii") {
            Encoding::Ascii
        } else {
            Encoding::Utf8
        });
    let mut parser = CsvParser::new(options)?;

    // Checksum as records stream out of the parser rather than afterwards.
    let crc = Arc::new(Mutex::new(Crc32::new()));
    if matches.get_flag("verify") {
        let crc = Arc::clone(&crc);
        parser.on_record(move |record: &Record| {
            let mut crc = crc.lock().unwrap();
            for (fi, value) in record.values().enumerate() {
                if fi > 0 {
                    crc.update(&[0x1f]);
                }
                crc.update(value.as_bytes());
            }
        });
    }

    let start = Instant::now();
    let records = load_and_parse(&parser, path, matches.get_flag("mmap")).await?;
    let elapsed = start.elapsed().as_secs_f64();
    let rps = (records.len() as f64) / elapsed;

    println!(
        "source={} rows={}\nelapsed={:.3}s rows/sec={:.0}",
        path.display(),
        records.len(),
        elapsed,
        rps
    );
    if matches.get_flag("verify") {
        let digest = crc.lock().unwrap().clone().finalize();
        println!("crc=0x{digest:08x}");
    }
    Ok(())
}

async fn load_and_parse(parser: &CsvParser, path: &Path, mmap: bool) -> anyhow::Result<Vec<Record>> {
    #[cfg(feature = "fast_local")]
    if mmap {
        return Ok(parser.parse_mapped(path)?);
    }
    #[cfg(not(feature = "fast_local"))]
    if mmap {
        anyhow::bail!("--mmap needs the fast_local feature");
    }
    Ok(parser.parse_path(path).await?)
}
