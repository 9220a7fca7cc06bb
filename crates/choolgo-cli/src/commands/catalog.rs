use choolgo_core::error::ChoolgoError;
use choolgo_core::rules::builtin;
use choolgo_core::rules::catalog::{PatternSet, ProductCatalog};
use std::path::Path;

pub fn list() -> Result<(), ChoolgoError> {
    let catalog = builtin::load_builtin()?;
    println!(
        "Built-in catalog '{}': {} (v{})\n",
        builtin::BUILTIN_NAME,
        catalog.name,
        catalog.version
    );
    summarize(&catalog);
    Ok(())
}

pub fn show() -> Result<(), ChoolgoError> {
    println!("{}", builtin::builtin_json());
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), ChoolgoError> {
    let catalog = choolgo_core::rules::load_catalog(file)?;
    println!("Catalog '{}' (v{}) is valid.\n", catalog.name, catalog.version);
    summarize(&catalog);
    Ok(())
}

fn summarize(catalog: &ProductCatalog) {
    println!("  Assorted: {}", catalog.assorted.join(", "));
    println!();

    for (channel, set) in [
        ("generic", &catalog.generic),
        ("iwon", &catalog.iwon),
        ("naver", &catalog.naver),
        ("paldogam", &catalog.paldogam),
    ] {
        print_set(channel, set);
    }

    println!("  kakao types: {}", catalog.kakao_types.len());
    println!("  naver types: {}", catalog.naver_types.len());
}

fn print_set(channel: &str, set: &PatternSet) {
    println!("  {channel}:");
    let width = set
        .rules()
        .iter()
        .map(|r| r.regex.as_str().chars().count())
        .max()
        .unwrap_or(10);
    for rule in set.rules() {
        let pattern = rule.regex.as_str();
        let pad = width.saturating_sub(pattern.chars().count());
        println!("    {pattern}{}  -> {}", " ".repeat(pad), rule.product);
    }
    println!();
}
