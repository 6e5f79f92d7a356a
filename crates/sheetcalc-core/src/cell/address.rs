//! Cell address and range types

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "AA10")
///
/// Both coordinates are zero-based. There is no upper bound: arbitrarily
/// large indices produce arbitrarily long labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., AA=26)
    pub col: u32,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// The label must match `[A-Z]+[0-9]+`; lowercase letters are accepted.
    ///
    /// # Examples
    /// ```
    /// use sheetcalc_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("AA1").unwrap();
    /// assert_eq!(addr.row, 0);
    /// assert_eq!(addr.col, 26);
    ///
    /// assert!(CellAddress::parse("1A").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let split = s
            .find(|c: char| !c.is_ascii_alphabetic())
            .unwrap_or(s.len());

        if split == 0 {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[..split])?;

        let row_str = &s[split..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }
        if !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let row: u64 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("row number too large in '{}'", s)))?;

        // Rows are 1-based in labels, 0-based internally
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }
        let row = u32::try_from(row - 1)
            .map_err(|_| Error::InvalidAddress(format!("row number too large in '{}'", s)))?;

        Ok(Self { row, col })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u32) -> String {
        let mut letters = Vec::new();
        let mut n = col as u64 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            letters.push((n % 26) as u8 + b'A');
            n /= 26;
        }

        letters.iter().rev().map(|&b| b as char).collect()
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u32> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u64 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u64 - 'A' as u64 + 1);
            if col > u32::MAX as u64 + 1 {
                return Err(Error::InvalidAddress(format!(
                    "column '{}' is too large",
                    letters
                )));
            }
        }

        Ok((col - 1) as u32)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row as u64 + 1)
    }

    /// Create a range from this address to another
    pub fn to(&self, other: CellAddress) -> CellRange {
        CellRange::new(*self, other)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Format a zero-based (row, col) pair as an A1-style label
pub fn to_address(row: u32, col: u32) -> String {
    CellAddress::new(row, col).to_a1_string()
}

/// Parse an A1-style label into a zero-based address
pub fn from_address(label: &str) -> Result<CellAddress> {
    CellAddress::parse(label)
}

/// A range of cells (e.g., "A1:B10")
///
/// Always normalized: `start` is the top-left corner and `end` the bottom-right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range from two arbitrary corners
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self {
            start: CellAddress::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellAddress::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    /// Create a range from row/column indices
    pub fn from_indices(start_row: u32, start_col: u32, end_row: u32, end_col: u32) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Create a single-cell range
    pub fn single(addr: CellAddress) -> Self {
        Self {
            start: addr,
            end: addr,
        }
    }

    /// Parse a range from A1:B10 notation
    ///
    /// Text without a colon yields a single-cell range. The corners may be
    /// given in any order.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        match s.split_once(':') {
            Some((start, end)) => {
                let start = CellAddress::parse(start)
                    .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
                let end = CellAddress::parse(end)
                    .map_err(|e| Error::InvalidRange(format!("'{}': {}", s, e)))?;
                Ok(Self::new(start, end))
            }
            None => Ok(Self::single(CellAddress::parse(s)?)),
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u64 {
        (self.end.row - self.start.row) as u64 + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u64 {
        (self.end.col - self.start.col) as u64 + 1
    }

    /// Get the total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        self.row_count() * self.col_count()
    }

    /// Iterate over all cell addresses in the range (row by row)
    pub fn cells(&self) -> CellRangeIterator {
        CellRangeIterator {
            range: *self,
            current_row: self.start.row as u64,
            current_col: self.start.col as u64,
        }
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse range notation into a normalized rectangle
pub fn parse_range(text: &str) -> Result<CellRange> {
    CellRange::parse(text)
}

/// Iterator over cells in a range
pub struct CellRangeIterator {
    range: CellRange,
    current_row: u64,
    current_col: u64,
}

impl Iterator for CellRangeIterator {
    type Item = CellAddress;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current_row > self.range.end.row as u64 {
            return None;
        }

        let addr = CellAddress::new(self.current_row as u32, self.current_col as u32);

        self.current_col += 1;
        if self.current_col > self.range.end.col as u64 {
            self.current_col = self.range.start.col as u64;
            self.current_row += 1;
        }

        Some(addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_column_to_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(27), "AB");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(702), "AAA");
        assert_eq!(CellAddress::column_to_letters(16383), "XFD");
    }

    #[test]
    fn test_letters_to_column() {
        assert_eq!(CellAddress::letters_to_column("A").unwrap(), 0);
        assert_eq!(CellAddress::letters_to_column("Z").unwrap(), 25);
        assert_eq!(CellAddress::letters_to_column("AA").unwrap(), 26);
        assert_eq!(CellAddress::letters_to_column("ZZ").unwrap(), 701);
        assert_eq!(CellAddress::letters_to_column("XFD").unwrap(), 16383);

        // Case insensitive
        assert_eq!(CellAddress::letters_to_column("aa").unwrap(), 26);
    }

    #[test]
    fn test_to_and_from_address() {
        assert_eq!(to_address(0, 0), "A1");
        assert_eq!(to_address(0, 26), "AA1");
        assert_eq!(to_address(9, 26), "AA10");
        assert_eq!(from_address("AA1").unwrap(), CellAddress::new(0, 26));
        assert_eq!(from_address("c100").unwrap(), CellAddress::new(99, 2));
    }

    #[test]
    fn test_no_upper_bound() {
        // Beyond the classic XFD/1048576 limits
        let addr = CellAddress::parse("XFE2000000").unwrap();
        assert_eq!(addr.col, 16384);
        assert_eq!(addr.row, 1_999_999);
        assert_eq!(addr.to_string(), "XFE2000000");
    }

    #[test]
    fn test_cell_address_parse_errors() {
        assert!(CellAddress::parse("").is_err());
        assert!(CellAddress::parse("A").is_err());
        assert!(CellAddress::parse("1").is_err());
        assert!(CellAddress::parse("A0").is_err());
        assert!(CellAddress::parse("1A").is_err());
        assert!(CellAddress::parse("A1B").is_err());
        assert!(CellAddress::parse("$A$1").is_err());
        assert!(CellAddress::parse("A+1").is_err());
        assert!(CellAddress::parse("A99999999999").is_err());
    }

    #[test]
    fn test_cell_range_parse() {
        let range = CellRange::parse("A1:C3").unwrap();
        assert_eq!(range.start, CellAddress::new(0, 0));
        assert_eq!(range.end, CellAddress::new(2, 2));

        // Single cell
        let range = CellRange::parse("C3").unwrap();
        assert_eq!(range.start, CellAddress::new(2, 2));
        assert_eq!(range.end, CellAddress::new(2, 2));

        assert!(CellRange::parse("A1:").is_err());
    }

    #[test]
    fn test_cell_range_normalizes_corners() {
        let swapped = parse_range("C3:A1").unwrap();
        assert_eq!(swapped, parse_range("A1:C3").unwrap());
        assert_eq!(swapped.start, CellAddress::new(0, 0));
        assert_eq!(swapped.end, CellAddress::new(2, 2));

        // Mixed corners: top-right to bottom-left
        let mixed = parse_range("C1:A3").unwrap();
        assert_eq!(mixed.start, CellAddress::new(0, 0));
        assert_eq!(mixed.end, CellAddress::new(2, 2));
    }

    #[test]
    fn test_cell_range_contains() {
        let range = CellRange::parse("B2:D4").unwrap();

        assert!(range.contains(&CellAddress::new(1, 1)));
        assert!(range.contains(&CellAddress::new(3, 3)));
        assert!(!range.contains(&CellAddress::new(0, 0)));
        assert!(!range.contains(&CellAddress::new(4, 1)));
        assert_eq!(range.cell_count(), 9);
    }

    #[test]
    fn test_cell_range_iterator() {
        let range = CellRange::parse("A1:B2").unwrap();
        let cells: Vec<_> = range.cells().collect();

        assert_eq!(
            cells,
            vec![
                CellAddress::new(0, 0),
                CellAddress::new(0, 1),
                CellAddress::new(1, 0),
                CellAddress::new(1, 1),
            ]
        );
    }

    proptest! {
        #[test]
        fn prop_address_round_trip(row in any::<u32>(), col in any::<u32>()) {
            let label = to_address(row, col);
            prop_assert_eq!(from_address(&label).unwrap(), CellAddress::new(row, col));
        }
    }
}
