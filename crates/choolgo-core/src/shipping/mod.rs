pub mod column_maps;
pub mod consolidate;
pub mod courier;
pub mod extract;

pub use consolidate::{apply_name_mapping, consolidate_shipping, find_unmapped_products};
pub use courier::{AppendOutcome, CourierWriter};
pub use extract::{extract_shipping_rows, format_phone};
