// Copyright (c) 2020 White Leaf
//
// This software is released under the MIT License.
// https://opensource.org/licenses/MIT

use crate::{error::ErrorKind, values::Value};
use anyhow::Error;

/// Column oriented table, the tabular dataset handlers receive and return.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    names: Vec<String>,
    columns: Vec<Vec<Value>>,
}

impl Frame {
    pub fn with_columns<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let columns = vec![Vec::new(); names.len()];

        Self { names, columns }
    }

    pub fn push_row(&mut self, row: Vec<Value>) -> Result<(), Error> {
        if row.len() != self.names.len() {
            return Err(ErrorKind::RowLength(self.names.len(), row.len()).into());
        }

        for (column, value) in self.columns.iter_mut().zip(row) {
            column.push(value);
        }

        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.names
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn column(&self, name: &str) -> Result<&[Value], Error> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.columns[idx].as_slice())
            .ok_or_else(|| ErrorKind::MissingColumn(name.into()).into())
    }

    pub fn len(&self) -> usize {
        self.columns.first().map(Vec::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn row(&self, idx: usize) -> Option<Vec<&Value>> {
        if idx >= self.len() {
            return None;
        }

        Some(self.columns.iter().map(|column| &column[idx]).collect())
    }

    pub fn rows(&self) -> impl Iterator<Item = Vec<&Value>> + '_ {
        (0..self.len()).filter_map(move |idx| self.row(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Error;

    fn ratings() -> Result<Frame, Error> {
        let mut frame = Frame::with_columns(vec!["user", "item", "rating"]);
        frame.push_row(vec![1.into(), "a".into(), 4.5.into()])?;
        frame.push_row(vec![2.into(), "b".into(), 3.0.into()])?;

        Ok(frame)
    }

    #[test]
    fn columns_and_rows() -> Result<(), Error> {
        let frame = ratings()?;

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.columns(), &["user", "item", "rating"]);
        assert_eq!(frame.column("item")?, &["a".into(), "b".into()] as &[Value]);
        assert_eq!(
            frame.row(1),
            Some(vec![&Value::Int64(2), &Value::from("b"), &Value::Double(3.0)])
        );
        assert_eq!(frame.rows().count(), 2);
        assert!(frame.row(2).is_none());

        Ok(())
    }

    #[test]
    fn missing_column() -> Result<(), Error> {
        let frame = ratings()?;

        let err = frame.column("timestamp").unwrap_err();
        assert_eq!(
            err.downcast_ref::<ErrorKind>(),
            Some(&ErrorKind::MissingColumn("timestamp".into()))
        );
        assert!(!frame.has_column("timestamp"));

        Ok(())
    }

    #[test]
    fn row_length_must_match() {
        let mut frame = Frame::with_columns(vec!["user", "item"]);

        let err = frame.push_row(vec![1.into()]).unwrap_err();
        assert_eq!(
            err.downcast_ref::<ErrorKind>(),
            Some(&ErrorKind::RowLength(2, 1))
        );
        assert!(frame.is_empty());
    }
}
