use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Spreadsheet column label ("A", "B", ..., "Z", "AA", ...).
///
/// Labels order by column position, not lexically, so "Z" < "AA".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnLabel(String);

impl ColumnLabel {
    pub fn new(label: &str) -> Self {
        ColumnLabel(label.trim().to_ascii_uppercase())
    }

    /// Label for a zero-based column index (0 -> "A", 26 -> "AA").
    pub fn from_index(index: usize) -> Self {
        let mut n = index + 1;
        let mut letters = Vec::new();
        while n > 0 {
            let rem = (n - 1) % 26;
            letters.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        letters.reverse();
        ColumnLabel(String::from_utf8_lossy(&letters).into_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for ColumnLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for ColumnLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ColumnLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ColumnLabel {
    fn from(s: &str) -> Self {
        ColumnLabel::new(s)
    }
}

/// Raw cell value as delivered by the spreadsheet accessor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // Whole numbers print without a fractional part ("3", not "3.0")
            Cell::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

/// One spreadsheet row keyed by column label. Absent cells are simply missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    cells: BTreeMap<ColumnLabel, Cell>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: ColumnLabel, cell: Cell) {
        self.cells.insert(label, cell);
    }

    pub fn get(&self, label: &str) -> Option<&Cell> {
        self.cells.get(&ColumnLabel::new(label))
    }

    /// Trimmed text of a cell, empty when the cell is absent.
    pub fn text(&self, label: &str) -> String {
        self.get(label)
            .map(|c| c.to_string().trim().to_string())
            .unwrap_or_default()
    }

    /// Cells in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&ColumnLabel, &Cell)> {
        self.cells.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<L: Into<ColumnLabel>, C: Into<Cell>> FromIterator<(L, C)> for Row {
    fn from_iter<I: IntoIterator<Item = (L, C)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (label, cell) in iter {
            row.insert(label.into(), cell.into());
        }
        row
    }
}

/// A canonical product and the number of units to deduct from stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub product: String,
    pub quantity: u32,
}

impl ExtractionResult {
    pub fn new(product: impl Into<String>, quantity: u32) -> Self {
        Self {
            product: product.into(),
            quantity,
        }
    }
}

/// Sum quantities per product, keeping products in first-seen order.
pub fn aggregate_results(results: Vec<ExtractionResult>) -> Vec<ExtractionResult> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<ExtractionResult> = Vec::new();

    for r in results {
        match index.get(&r.product) {
            Some(&i) => out[i].quantity += r.quantity,
            None => {
                index.insert(r.product.clone(), out.len());
                out.push(r);
            }
        }
    }

    out
}

/// Canonical shipping-label row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingRow {
    pub recipient_name: String,
    pub phone: String,
    pub postal_code: String,
    pub address: String,
    pub message: String,
    /// Free-text product description.
    pub product_name: String,
    pub quantity: u32,
    /// Channel label, "/"-joined after consolidation.
    #[serde(default)]
    pub channel: String,
    /// Short name and count behind each part of a consolidated description.
    /// Empty for rows read from an order file.
    #[serde(skip)]
    pub parts: Vec<(String, u32)>,
}

/// Separator used by recipient keys and fingerprints.
pub const KEY_SEPARATOR: &str = "|";

impl ShippingRow {
    /// Trimmed name + phone + address. Phone is not normalized here.
    pub fn recipient_key(&self) -> String {
        [
            self.recipient_name.trim(),
            self.phone.trim(),
            self.address.trim(),
        ]
        .join(KEY_SEPARATOR)
    }

    /// Exact-match identity of an output row.
    pub fn fingerprint(&self) -> String {
        [
            self.recipient_name.as_str(),
            self.phone.as_str(),
            self.address.as_str(),
            self.product_name.as_str(),
            &self.quantity.to_string(),
        ]
        .join(KEY_SEPARATOR)
    }
}
