use csv_records::{CsvParser, ParserOptions};
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut parser = CsvParser::new(ParserOptions::new().delimiter(';'))?;
    parser.on_header(|names| println!("header: {names:?}"));
    parser.on_record(|record| println!("record: {record:?}"));

    let inline = "name;id;key\r\nFoo;\"123456\";\r\nBar;\"23456\";\"aaaaa\"";
    let records = parser.parse(inline)?;
    println!("{} records", records.len());

    let path = Path::new("./data/sample.csv.gz");
    if path.exists() {
        let records = parser.parse_path(path).await?;
        println!("{}: {} records", path.display(), records.len());
    }
    Ok(())
}
