//! Matrix literals for tests: `"[1 2; 3 4]".parse::<Matrix<i64>>()`.

use crate::matrix::Matrix;
use crate::Error;
use std::str::FromStr;

impl FromStr for Matrix<i64> {
    type Err = Error;

    /// Space-separated entries, `;` between rows; the first row fixes the
    /// column count.
    fn from_str(s: &str) -> Result<Matrix<i64>, Error> {
        let t = s.trim();
        if !t.starts_with('[') || !t.ends_with(']') {
            return Err(Error::Parse(format!("missing brackets in {:?}", s)));
        }
        let body = &t[1..t.len() - 1];
        let mut entries: Vec<i64> = Vec::new();
        let mut cols = 0usize;
        let mut rows = 0usize;
        for (r, row) in body.split(';').enumerate() {
            let mut count = 0usize;
            for tok in row.split_whitespace() {
                let v = tok
                    .parse::<i64>()
                    .map_err(|_| Error::Parse(format!("bad entry {:?}", tok)))?;
                entries.push(v);
                count += 1;
            }
            if r == 0 {
                cols = count;
            } else if count != cols {
                return Err(Error::Parse(format!(
                    "row {} has {} entries, expected {}",
                    r, count, cols
                )));
            }
            rows += 1;
        }
        if cols == 0 {
            return Err(Error::Parse("empty literal".to_string()));
        }
        Ok(Matrix::from_rows(rows, cols, &entries))
    }
}
