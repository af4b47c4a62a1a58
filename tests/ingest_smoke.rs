use async_compression::tokio::write::GzipEncoder;
use csv_records::{CsvParser, ParserOptions, Record};
use std::sync::{Arc, Mutex};
use tokio::io::AsyncWriteExt;

fn sample(rows: usize) -> String {
    let mut csv = String::from("sku,col1\n");
    for i in 0..rows {
        csv.push_str(&format!("SKU{i:06},{i}\n"));
    }
    csv
}

#[tokio::test]
async fn parses_gzip_and_counts_rows() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let gz_path = dir.path().join("tiny.csv.gz");

    let file = tokio::fs::File::create(&gz_path).await?;
    let mut encoder = GzipEncoder::new(file);
    encoder.write_all(sample(10_000).as_bytes()).await?;
    encoder.shutdown().await?;

    let mut parser = CsvParser::default();
    let seen = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&seen);
    parser.on_record(move |_| *counter.lock().unwrap() += 1);

    let records = parser.parse_path(&gz_path).await?;

    assert_eq!(records.len(), 10_000);
    assert_eq!(*seen.lock().unwrap(), 10_000);
    assert_eq!(
        records[42],
        Record::from_pairs([("sku", "SKU000042"), ("col1", "42")])
    );
    Ok(())
}

#[tokio::test]
async fn plain_file_with_crlf_in_strict_mode() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("plain.csv");
    tokio::fs::write(&path, "a;b\r\n\"x\r\ny\";2\r\n").await?;

    let parser = CsvParser::new(ParserOptions::new().delimiter(';').strict(true))?;
    let records = parser.parse_path(&path).await?;

    assert_eq!(records, vec![Record::from_pairs([("a", "x\r\ny"), ("b", "2")])]);
    Ok(())
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let err = CsvParser::default()
        .parse_path(std::path::Path::new("/definitely/not/here.csv"))
        .await
        .unwrap_err();
    assert!(matches!(err, csv_records::CsvError::Io(_)));
}
