use anyhow::Error;
use handler::{Frame, Type, Value};
use std::path::Path;

/// Read a CSV file with headers into a `Frame`. Every column gets the one
/// type all of its cells fit in, see `Type::infer`.
pub fn read_csv(path: impl AsRef<Path>) -> Result<Frame, Error> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .from_path(path)?;

    let headers = csv.headers()?.clone();
    let records = csv.records().collect::<Result<Vec<_>, _>>()?;

    let types: Vec<Type> = (0..headers.len())
        .map(|column| Type::infer(records.iter().filter_map(|record| record.get(column))))
        .collect();

    let mut df = Frame::with_columns(headers.iter());
    for record in &records {
        let row = record
            .iter()
            .zip(&types)
            .map(|(cell, &tp)| Value::from_str(cell, tp))
            .collect::<Result<Vec<_>, _>>()?;

        df.push_row(row)?;
    }

    log::debug!(
        "Read {} rows with columns {:?} typed as {:?}",
        df.len(),
        df.columns(),
        types
    );
    Ok(df)
}
