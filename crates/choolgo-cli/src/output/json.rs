use choolgo_core::error::ChoolgoError;
use serde::Serialize;

pub fn print<T: Serialize>(value: &T) -> Result<(), ChoolgoError> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{json}");
    Ok(())
}
