use choolgo_core::model::ShippingRow;
use choolgo_core::pipeline::{BatchReport, FileStatus, SkipReason};
use choolgo_core::shipping::consolidate::UnmappedProduct;
use choolgo_core::shipping::AppendOutcome;
use choolgo_core::ParsedFile;

/// Display width of a string, counting Hangul and other wide characters as two columns.
fn display_width(s: &str) -> usize {
    s.chars().map(|c| if is_wide(c) { 2 } else { 1 }).sum()
}

fn is_wide(c: char) -> bool {
    matches!(c as u32,
        0x1100..=0x115F | 0x2E80..=0xA4CF | 0xAC00..=0xD7A3 | 0xF900..=0xFAFF | 0xFF00..=0xFF60)
}

fn pad(s: &str, width: usize) -> String {
    format!("{s}{}", " ".repeat(width.saturating_sub(display_width(s))))
}

pub fn format_parsed(parsed: &ParsedFile) -> String {
    let mut out = String::new();

    out.push_str(&format!("File:    {}\n", parsed.path.display()));
    out.push_str(&format!("Channel: {} ({})\n\n", parsed.channel_name, parsed.channel));

    if parsed.results.is_empty() {
        out.push_str("  No products extracted.\n");
    } else {
        let width = parsed
            .results
            .iter()
            .map(|r| display_width(&r.product))
            .max()
            .unwrap_or(10);
        out.push_str("Stock deductions:\n");
        for r in &parsed.results {
            out.push_str(&format!("  {}  {:>4}\n", pad(&r.product, width), r.quantity));
        }
    }

    out.push('\n');
    if parsed.shipping.is_empty() {
        out.push_str("  No shipping rows.\n");
    } else {
        out.push_str(&format!("Shipping rows ({}):\n", parsed.shipping.len()));
        out.push_str(&format_shipping(&parsed.shipping));
    }

    out
}

fn format_shipping(rows: &[ShippingRow]) -> String {
    let name_w = rows
        .iter()
        .map(|r| display_width(&r.recipient_name))
        .max()
        .unwrap_or(4);
    let phone_w = rows.iter().map(|r| r.phone.len()).max().unwrap_or(4);

    let mut out = String::new();
    for r in rows {
        out.push_str(&format!(
            "  {}  {}  {:>3}  {}\n",
            pad(&r.recipient_name, name_w),
            pad(&r.phone, phone_w),
            r.quantity,
            r.product_name
        ));
        if !r.message.is_empty() {
            out.push_str(&format!("  {}  msg: {}\n", " ".repeat(name_w), r.message));
        }
    }
    out
}

pub fn print_report(report: &BatchReport) {
    println!("Files:");
    for f in &report.files {
        let status = match &f.status {
            FileStatus::Processed => format!("ok, {} product(s)", f.results.len()),
            FileStatus::Skipped { reason } => format!("skipped ({})", skip_label(*reason)),
            FileStatus::Failed { error } => format!("FAILED: {error}"),
        };
        let channel = f.channel.as_deref().unwrap_or("-");
        println!("  {}  [{}]  {}", f.path.display(), channel, status);
    }
    println!();

    if report.shipping.is_empty() {
        println!("No shipping rows.");
    } else {
        println!("Consolidated shipping ({} recipient(s)):", report.shipping.len());
        print!("{}", format_shipping(&report.shipping));
    }

    match &report.courier {
        Some(AppendOutcome::Written { path, added, total }) => {
            println!("\nCourier form: {} (+{added}, {total} total)", path.display())
        }
        Some(AppendOutcome::AllDuplicates { path }) => {
            println!("\nCourier form: {} unchanged (all rows already present)", path.display())
        }
        Some(AppendOutcome::Deferred { pending_path, rows }) => println!(
            "\nCourier form is open in Excel; {rows} row(s) saved to {}",
            pending_path.display()
        ),
        None => {}
    }
    if let Some(error) = &report.courier_error {
        println!("\nCourier form NOT written: {error}");
    }

    if !report.unmapped.is_empty() {
        println!();
        print_unmapped(&report.unmapped, report.shipping.len());
    }
}

pub fn print_totals(totals: &[(String, u32)]) {
    if totals.is_empty() {
        return;
    }
    let width = totals.iter().map(|(p, _)| display_width(p)).max().unwrap_or(10);
    println!("\nStock deducted:");
    for (product, qty) in totals {
        println!("  {}  {:>4}", pad(product, width), qty);
    }
}

pub fn print_unmapped(unmapped: &[UnmappedProduct], rows: usize) {
    if unmapped.is_empty() {
        println!("All product names are mapped ({rows} row(s) checked).");
        return;
    }
    println!("Unmapped product names ({}):", unmapped.len());
    for u in unmapped {
        println!("  {:>3}x  {}", u.count, u.original_name);
    }
}

fn skip_label(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::NotSpreadsheet => "not a spreadsheet",
        SkipReason::AlreadyProcessed => "already processed",
        SkipReason::BeforeStartDate => "before start date",
        SkipReason::NoChannel => "no channel",
    }
}
