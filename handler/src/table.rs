// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::frame::Frame;
use prettytable::{format::consts::FORMAT_NO_LINESEP, Cell, Row, Table};
use std::collections::HashMap;

pub trait ToTable {
    fn to_table(&self) -> Table;
}

impl ToTable for Frame {
    fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_titles(Row::new(
            self.columns().iter().map(|name| Cell::new(name)).collect(),
        ));

        for row in self.rows() {
            table.add_row(Row::new(
                row.into_iter()
                    .map(|value| Cell::new(&value.to_string()))
                    .collect(),
            ));
        }

        table.set_format(*FORMAT_NO_LINESEP);
        table
    }
}

impl<K, V, B> ToTable for HashMap<K, V, B>
where
    K: ToString,
    V: ToString,
{
    fn to_table(&self) -> Table {
        let mut table = Table::new();

        for (key, val) in self {
            table.add_row(Row::new(vec![
                Cell::new(&key.to_string()),
                Cell::new(&val.to_string()),
            ]));
        }

        table.set_format(*FORMAT_NO_LINESEP);
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Value;
    use anyhow::Error;

    #[test]
    fn frame_table_has_one_row_per_record() -> Result<(), Error> {
        let mut frame = Frame::with_columns(vec!["user", "item", "score"]);
        frame.push_row(vec![Value::from(1), "a".into(), 0.5.into()])?;
        frame.push_row(vec![Value::from(1), "b".into(), 0.25.into()])?;

        let table = frame.to_table();
        assert_eq!(table.len(), 2);

        let rendered = table.to_string();
        assert!(rendered.contains("score"));
        assert!(rendered.contains("0.25"));

        Ok(())
    }
}
