//! Integration tests for the batch pipeline and `parse_file()`.
//!
//! Uses a MockReader that returns pre-built rows per path, so no real
//! spreadsheets are needed. Only the courier form and the ledger touch disk.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use choolgo_core::channel::ChannelId;
use choolgo_core::config::PipelineConfig;
use choolgo_core::error::ChoolgoError;
use choolgo_core::extraction::SheetReader;
use choolgo_core::ledger::ProcessedLedger;
use choolgo_core::model::{ExtractionResult, Row};
use choolgo_core::parse_file;
use choolgo_core::pipeline::{BatchProcessor, FileStatus, SkipReason};
use choolgo_core::rules::builtin::load_builtin;
use choolgo_core::rules::parse_name_mappings;
use choolgo_core::shipping::courier::read_existing_rows;
use choolgo_core::shipping::AppendOutcome;
use choolgo_core::stock::StockSink;

#[derive(Default)]
struct MockReader {
    files: HashMap<PathBuf, Option<Vec<Row>>>,
}

impl MockReader {
    fn with(mut self, path: &str, rows: Vec<Row>) -> Self {
        self.files.insert(PathBuf::from(path), Some(rows));
        self
    }

    fn unreadable(mut self, path: &str) -> Self {
        self.files.insert(PathBuf::from(path), None);
        self
    }
}

impl SheetReader for MockReader {
    fn read_rows(&self, path: &Path) -> Option<Vec<Row>> {
        self.files.get(path).cloned().flatten()
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

/// Records deductions; fails for one product when asked to.
#[derive(Default)]
struct RecordingSink {
    deducted: Vec<(String, u32, String)>,
    fail_on: Option<String>,
}

impl StockSink for RecordingSink {
    fn deduct(&mut self, product: &str, quantity: u32, channel: &str) -> Result<(), ChoolgoError> {
        if self.fail_on.as_deref() == Some(product) {
            return Err(ChoolgoError::StockDeduction {
                product: product.to_string(),
                reason: "inventory store unavailable".into(),
            });
        }
        self.deducted
            .push((product.to_string(), quantity, channel.to_string()));
        Ok(())
    }
}

fn row(cells: &[(&str, &str)]) -> Row {
    cells.iter().map(|(l, c)| (*l, *c)).collect()
}

const KAKAO: &str = "/orders/카카오/0210_카카오.xlsx";
const PALDOGAM: &str = "/orders/팔도감/0210_팔도감.xlsx";
const NAVER: &str = "/orders/직택배/0210_스마트스토어.xlsx";

fn kakao_rows() -> Vec<Row> {
    vec![
        row(&[
            ("E", "상품명"),
            ("F", "옵션"),
            ("G", "수량"),
            ("O", "수령인"),
            ("P", "수령인연락처"),
            ("R", "배송지"),
            ("S", "배송메세지"),
            ("T", "우편번호"),
        ]),
        row(&[
            ("E", "우리곡간 누룽지"),
            ("F", "종합누룽지 12봉"),
            ("G", "1"),
            ("O", "홍길동"),
            ("P", "01012345678"),
            ("R", "서울시 중구 1"),
            ("S", "문 앞"),
            ("T", "04500"),
        ]),
    ]
}

fn paldogam_rows() -> Vec<Row> {
    vec![
        row(&[
            ("C", "수령인"),
            ("D", "우편번호"),
            ("E", "주소"),
            ("F", "배송메세지"),
            ("G", "연락처"),
            ("J", "상품명"),
            ("L", "옵션명"),
            ("N", "수량"),
        ]),
        row(&[
            ("C", "홍길동"),
            ("D", "04500"),
            ("E", "서울시 중구 1"),
            ("F", "경비실"),
            ("G", "010-1234-5678"),
            ("J", "현미누룽지"),
            ("L", "현미누룽지 6봉"),
            ("N", "2"),
        ]),
    ]
}

fn naver_rows() -> Vec<Row> {
    vec![
        row(&[
            ("A", "수취인명"),
            ("B", "연락처"),
            ("C", "통합배송지"),
            ("D", "상품명"),
            ("E", "옵션정보"),
            ("F", "수량"),
            ("G", "배송메세지"),
        ]),
        row(&[
            ("A", "김영희"),
            ("B", "0212345678"),
            ("C", "부산시 해운대구 2"),
            ("D", "우리곡간 서리태"),
            ("E", "종류: 서리태 2봉"),
            ("F", "2"),
        ]),
    ]
}

fn reader() -> MockReader {
    MockReader::default()
        .with(KAKAO, kakao_rows())
        .with(PALDOGAM, paldogam_rows())
        .with(NAVER, naver_rows())
}

fn config(dir: &Path) -> PipelineConfig {
    PipelineConfig {
        choolgo_dir: PathBuf::from("/orders"),
        output_dir: dir.join("out"),
        ledger_path: dir.join("processed.json"),
        start_date: None,
        dry_run: false,
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 10).unwrap()
}

fn paths(list: &[&str]) -> Vec<PathBuf> {
    list.iter().map(PathBuf::from).collect()
}

// ---------------------------------------------------------------------------
// Full batch: three channels, one shared recipient
// ---------------------------------------------------------------------------
#[test]
fn batch_deducts_and_consolidates_across_channels() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = load_builtin().unwrap();
    let reader = reader();
    let mappings = parse_name_mappings(
        r#"[
            { "pattern": "현미누룽지", "shortName": "현미누룽지", "priority": 1 },
            { "pattern": "종합", "shortName": "종합누룽지", "priority": 10 }
        ]"#,
    )
    .unwrap();

    let processor = BatchProcessor::new(config(dir.path()), &catalog, &reader)
        .unwrap()
        .with_mappings(mappings)
        .today(date());
    let mut sink = RecordingSink::default();
    let report = processor
        .run(&paths(&[KAKAO, PALDOGAM, NAVER]), &mut sink)
        .unwrap();

    assert_eq!(report.count(|s| *s == FileStatus::Processed), 3);

    // 종합 12 spread over five products, then 6봉 x 2, then 2봉 x 2
    assert_eq!(
        report.files[0].results,
        vec![
            ExtractionResult::new("우리곡간 현미누룽지", 3),
            ExtractionResult::new("우리곡간 귀리누룽지", 3),
            ExtractionResult::new("우리곡간 강황누룽지", 2),
            ExtractionResult::new("우리곡간 검정깨누룽지", 2),
            ExtractionResult::new("우리곡간 코코넛누룽지", 2),
        ]
    );
    assert_eq!(
        report.files[1].results,
        vec![ExtractionResult::new("@온도감 현미누룽지", 12)]
    );
    assert_eq!(
        report.files[2].results,
        vec![ExtractionResult::new("우리곡간 서리태", 4)]
    );
    assert_eq!(sink.deducted.len(), 7);
    assert!(sink
        .deducted
        .iter()
        .any(|(p, q, c)| p == "우리곡간 서리태" && *q == 4 && c == "직택배/네이버"));

    // 홍길동's kakao and paldogam rows merge into one shipment
    assert_eq!(report.shipping.len(), 2);
    let merged = &report.shipping[0];
    assert_eq!(merged.recipient_name, "홍길동");
    assert_eq!(merged.phone, "010-1234-5678");
    assert_eq!(merged.product_name, "종합누룽지 1, 현미누룽지 2");
    assert_eq!(merged.quantity, 3);
    assert_eq!(merged.message, "문 앞 / 경비실");
    assert_eq!(merged.channel, "카카오/팔도감");

    let other = &report.shipping[1];
    assert_eq!(other.recipient_name, "김영희");
    assert_eq!(other.phone, "02-1234-5678");
    assert_eq!(other.product_name, "우리곡간 서리태 종류: 서리태 2봉 2");

    assert_eq!(report.unmapped.len(), 1);
    assert_eq!(report.unmapped[0].original_name, "우리곡간 서리태 종류: 서리태 2봉");

    let Some(AppendOutcome::Written { path, added, total }) = &report.courier else {
        panic!("expected the courier form to be written, got {:?}", report.courier);
    };
    assert_eq!((*added, *total), (2, 2));
    assert!(path.ends_with("0210_택배양식.xlsx"));
    assert_eq!(read_existing_rows(path).unwrap().len(), 2);

    let ledger = ProcessedLedger::load(&dir.path().join("processed.json")).unwrap();
    assert_eq!(ledger.len(), 3);
    assert_eq!(ledger.entry(KAKAO).unwrap().items, 5);
    assert_eq!(ledger.entry(KAKAO).unwrap().channel, "카카오");
}

// ---------------------------------------------------------------------------
// Ledger: processed files are skipped, unless forced
// ---------------------------------------------------------------------------
#[test]
fn second_run_skips_processed_files_unless_forced() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = load_builtin().unwrap();
    let reader = reader();
    let files = paths(&[KAKAO, NAVER]);

    let first = BatchProcessor::new(config(dir.path()), &catalog, &reader)
        .unwrap()
        .today(date());
    first.run(&files, &mut RecordingSink::default()).unwrap();

    let mut sink = RecordingSink::default();
    let report = first.run(&files, &mut sink).unwrap();
    assert_eq!(
        report.count(|s| *s
            == FileStatus::Skipped {
                reason: SkipReason::AlreadyProcessed
            }),
        2
    );
    assert!(sink.deducted.is_empty());
    assert!(report.shipping.is_empty());
    assert!(report.courier.is_none());

    let forced = BatchProcessor::new(config(dir.path()), &catalog, &reader)
        .unwrap()
        .force(true)
        .today(date());
    let mut sink = RecordingSink::default();
    let report = forced.run(&files, &mut sink).unwrap();
    assert_eq!(report.count(|s| *s == FileStatus::Processed), 2);
    assert_eq!(sink.deducted.len(), 6);

    // Same rows again: fingerprints already in the form
    assert!(matches!(report.courier, Some(AppendOutcome::AllDuplicates { .. })));
}

// ---------------------------------------------------------------------------
// A failing deduction fails that file only; shipping still happens
// ---------------------------------------------------------------------------
#[test]
fn failed_deduction_keeps_shipping_and_batch_going() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = load_builtin().unwrap();
    let reader = reader();
    let mut sink = RecordingSink {
        fail_on: Some("우리곡간 서리태".into()),
        ..Default::default()
    };

    let processor = BatchProcessor::new(config(dir.path()), &catalog, &reader)
        .unwrap()
        .today(date());
    let report = processor.run(&paths(&[NAVER, KAKAO]), &mut sink).unwrap();

    assert!(matches!(report.files[0].status, FileStatus::Failed { .. }));
    assert_eq!(report.files[0].shipping_rows, 1);
    assert_eq!(report.files[1].status, FileStatus::Processed);
    assert_eq!(report.shipping.len(), 2);

    let ledger = ProcessedLedger::load(&dir.path().join("processed.json")).unwrap();
    assert!(!ledger.is_processed(NAVER));
    assert!(ledger.failure(NAVER).unwrap().error.contains("inventory store unavailable"));
    assert!(ledger.is_processed(KAKAO));
}

// ---------------------------------------------------------------------------
// A broken courier form is reported; deducted files are still ledgered
// ---------------------------------------------------------------------------
#[test]
fn unwritable_courier_form_does_not_cause_double_deduction() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = load_builtin().unwrap();
    let reader = reader();
    let form = dir.path().join("out").join("0210_택배양식.xlsx");
    std::fs::create_dir_all(form.parent().unwrap()).unwrap();
    std::fs::write(&form, b"not a workbook").unwrap();

    let processor = BatchProcessor::new(config(dir.path()), &catalog, &reader)
        .unwrap()
        .today(date());
    let mut sink = RecordingSink::default();

    let report = processor.run(&paths(&[KAKAO]), &mut sink).unwrap();
    assert_eq!(report.files[0].status, FileStatus::Processed);
    assert!(report.courier.is_none());
    assert!(report.courier_error.is_some());
    assert_eq!(sink.deducted.len(), 5);

    let ledger = ProcessedLedger::load(&dir.path().join("processed.json")).unwrap();
    assert!(ledger.is_processed(KAKAO));

    let report = processor.run(&paths(&[KAKAO]), &mut sink).unwrap();
    assert_eq!(
        report.files[0].status,
        FileStatus::Skipped {
            reason: SkipReason::AlreadyProcessed
        }
    );
    assert_eq!(sink.deducted.len(), 5);
    assert_eq!(std::fs::read(&form).unwrap(), b"not a workbook");
}

// ---------------------------------------------------------------------------
// Dry run: nothing written
// ---------------------------------------------------------------------------
#[test]
fn dry_run_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = load_builtin().unwrap();
    let reader = reader();
    let mut cfg = config(dir.path());
    cfg.dry_run = true;

    let processor = BatchProcessor::new(cfg, &catalog, &reader).unwrap().today(date());
    let report = processor
        .run(&paths(&[KAKAO, PALDOGAM]), &mut RecordingSink::default())
        .unwrap();

    assert_eq!(report.shipping.len(), 1);
    assert!(report.courier.is_none());
    assert!(!dir.path().join("processed.json").exists());
    assert!(!dir.path().join("out").exists());
}

// ---------------------------------------------------------------------------
// Files that are not order files
// ---------------------------------------------------------------------------
#[test]
fn non_order_files_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = load_builtin().unwrap();
    let reader = reader();
    let processor = BatchProcessor::new(config(dir.path()), &catalog, &reader)
        .unwrap()
        .today(date());

    let report = processor
        .run(
            &paths(&[
                "/orders/카카오/~$0210_카카오.xlsx",
                "/orders/카카오/메모.txt",
                "/orders/기타/주문.xlsx",
            ]),
            &mut RecordingSink::default(),
        )
        .unwrap();

    let reasons: Vec<&FileStatus> = report.files.iter().map(|f| &f.status).collect();
    assert_eq!(
        reasons,
        vec![
            &FileStatus::Skipped { reason: SkipReason::NoChannel },
            &FileStatus::Skipped { reason: SkipReason::NotSpreadsheet },
            &FileStatus::Skipped { reason: SkipReason::NoChannel },
        ]
    );
    assert!(report.courier.is_none());
}

// ---------------------------------------------------------------------------
// Unreadable spreadsheets are zero rows, not errors
// ---------------------------------------------------------------------------
#[test]
fn unreadable_file_is_processed_with_no_items() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = load_builtin().unwrap();
    let reader = MockReader::default().unreadable(KAKAO);
    let processor = BatchProcessor::new(config(dir.path()), &catalog, &reader)
        .unwrap()
        .today(date());

    let report = processor
        .run(&paths(&[KAKAO]), &mut RecordingSink::default())
        .unwrap();

    assert_eq!(report.files[0].status, FileStatus::Processed);
    assert!(report.files[0].results.is_empty());
    assert_eq!(report.files[0].shipping_rows, 0);
}

// ---------------------------------------------------------------------------
// Header mismatch: soft skip for both parsing and shipping
// ---------------------------------------------------------------------------
#[test]
fn shifted_columns_yield_nothing() {
    let mut rows = kakao_rows();
    rows[0] = row(&[("E", "옵션"), ("F", "수량"), ("N", "수령인")]);
    let reader = MockReader::default().with(KAKAO, rows);
    let catalog = load_builtin().unwrap();

    let parsed = parse_file(Path::new(KAKAO), &reader, &catalog).unwrap().unwrap();
    assert_eq!(parsed.channel, ChannelId::Kakao);
    assert!(parsed.results.is_empty());
    assert!(parsed.shipping.is_empty());
}

// ---------------------------------------------------------------------------
// parse_file() classifies loose uploads by file name
// ---------------------------------------------------------------------------
#[test]
fn parse_file_falls_back_to_file_name() {
    let upload = "/tmp/uploads/카카오_주문_0210.xlsx";
    let reader = MockReader::default().with(upload, kakao_rows());
    let catalog = load_builtin().unwrap();

    let parsed = parse_file(Path::new(upload), &reader, &catalog).unwrap().unwrap();
    assert_eq!(parsed.channel, ChannelId::Kakao);
    assert_eq!(parsed.channel_name, "카카오");
    assert_eq!(parsed.results.len(), 5);
    assert_eq!(parsed.shipping[0].channel, "카카오");

    assert!(parse_file(Path::new("/tmp/uploads/~$카카오.xlsx"), &reader, &catalog)
        .unwrap()
        .is_none());
}
