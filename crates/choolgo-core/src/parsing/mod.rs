pub mod assorted;
pub mod generic;
pub mod header;
pub mod iwon;
pub mod kakao;
pub mod naver;
pub mod normalize;
pub mod paldogam;
pub mod values;

use serde::{Deserialize, Serialize};

use crate::model::{ExtractionResult, Row};
use crate::rules::catalog::ProductCatalog;

/// Which row parser a channel uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserKind {
    Generic,
    Iwon,
    Kakao,
    Naver,
    Paldogam,
}

impl ParserKind {
    /// Short tag used in log output.
    pub fn label(&self) -> &'static str {
        match self {
            ParserKind::Generic => "제네릭",
            ParserKind::Iwon => "아이원",
            ParserKind::Kakao => "카카오",
            ParserKind::Naver => "네이버",
            ParserKind::Paldogam => "팔도감",
        }
    }
}

/// Extract stock deductions from one file's rows, aggregated by product.
///
/// The first row is the header. Files with fewer than two rows, or whose
/// header does not match the channel layout, yield nothing.
pub fn parse_rows(
    kind: ParserKind,
    rows: &[Row],
    catalog: &ProductCatalog,
) -> Vec<ExtractionResult> {
    if rows.len() < 2 {
        return Vec::new();
    }

    match kind {
        ParserKind::Generic => generic::parse(rows, catalog),
        ParserKind::Iwon => iwon::parse(rows, catalog),
        ParserKind::Kakao => kakao::parse(rows, catalog),
        ParserKind::Naver => naver::parse(rows, catalog),
        ParserKind::Paldogam => paldogam::parse(rows, catalog),
    }
}
