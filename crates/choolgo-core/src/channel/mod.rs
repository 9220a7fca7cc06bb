pub mod filename;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::ChoolgoError;
use crate::parsing::ParserKind;

/// Excel writes `~$<name>` lock files next to open workbooks.
pub const EXCEL_LOCK_PREFIX: &str = "~$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelId {
    Kakao,
    PaldogamNaver,
    Paldogam,
    Iwon,
    JiktaebaeNaver,
    JiktaebaeGeneric,
}

impl ChannelId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelId::Kakao => "kakao",
            ChannelId::PaldogamNaver => "paldogam-naver",
            ChannelId::Paldogam => "paldogam",
            ChannelId::Iwon => "iwon",
            ChannelId::JiktaebaeNaver => "jiktaebae-naver",
            ChannelId::JiktaebaeGeneric => "jiktaebae-generic",
        }
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of the ordered channel table.
#[derive(Debug, Clone)]
pub struct ChannelRule {
    pub id: ChannelId,
    pub name: String,
    pub path_match: String,
    pub path_require: Option<String>,
    pub file_match: Option<Regex>,
    pub parser: ParserKind,
}

impl ChannelRule {
    fn matches(&self, normalized_path: &str, file_name: &str) -> bool {
        if !normalized_path.contains(&self.path_match) {
            return false;
        }
        if let Some(ref required) = self.path_require {
            if !normalized_path.contains(required.as_str()) {
                return false;
            }
        }
        match self.file_match {
            Some(ref re) => re.is_match(file_name),
            None => true,
        }
    }
}

/// Path-based channel detection over an ordered rule list (first match wins).
#[derive(Debug, Clone)]
pub struct ChannelClassifier {
    rules: Vec<ChannelRule>,
}

impl ChannelClassifier {
    pub fn new(rules: Vec<ChannelRule>) -> Self {
        Self { rules }
    }

    /// The standard folder layout: 카카오/, 팔도감/[네이버/], 직택배/.
    ///
    /// "팔도감 + 네이버" must stay ahead of plain "팔도감", and the named
    /// 직택배 vendors ahead of the 직택배 catch-all.
    pub fn standard() -> Result<Self, ChoolgoError> {
        let rules = vec![
            rule(ChannelId::Kakao, "카카오", "/카카오/", None, None, ParserKind::Kakao)?,
            rule(
                ChannelId::PaldogamNaver,
                "팔도감/네이버",
                "/팔도감/",
                Some("/네이버/"),
                None,
                ParserKind::Naver,
            )?,
            rule(ChannelId::Paldogam, "팔도감", "/팔도감/", None, None, ParserKind::Paldogam)?,
            rule(
                ChannelId::Iwon,
                "직택배/아이원",
                "/직택배/",
                None,
                Some("아이원|발주서"),
                ParserKind::Iwon,
            )?,
            rule(
                ChannelId::JiktaebaeNaver,
                "직택배/네이버",
                "/직택배/",
                None,
                Some("네이버|스마트스토어"),
                ParserKind::Naver,
            )?,
            rule(
                ChannelId::JiktaebaeGeneric,
                "직택배/기타",
                "/직택배/",
                None,
                None,
                ParserKind::Generic,
            )?,
        ];
        Ok(Self::new(rules))
    }

    pub fn rules(&self) -> &[ChannelRule] {
        &self.rules
    }

    /// Detect the channel of an order file. `None` means the file is not an
    /// order file for this system, including Excel lock files.
    pub fn detect_channel(&self, path: &Path) -> Option<&ChannelRule> {
        let normalized = normalize_path(path);
        let file_name = file_name(path);

        if file_name.starts_with(EXCEL_LOCK_PREFIX) {
            return None;
        }

        self.rules.iter().find(|r| r.matches(&normalized, &file_name))
    }

    /// Rule by id, used when the channel was decided elsewhere.
    pub fn rule(&self, id: ChannelId) -> Option<&ChannelRule> {
        self.rules.iter().find(|r| r.id == id)
    }
}

fn rule(
    id: ChannelId,
    name: &str,
    path_match: &str,
    path_require: Option<&str>,
    file_match: Option<&str>,
    parser: ParserKind,
) -> Result<ChannelRule, ChoolgoError> {
    let file_match = file_match
        .map(|p| {
            Regex::new(p).map_err(|source| ChoolgoError::Pattern {
                pattern: p.to_string(),
                source,
            })
        })
        .transpose()?;

    Ok(ChannelRule {
        id,
        name: name.to_string(),
        path_match: path_match.to_string(),
        path_require: path_require.map(str::to_string),
        file_match,
        parser,
    })
}

/// Path with Windows separators turned into `/`.
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Base file name, tolerant of either separator.
pub fn file_name(path: &Path) -> String {
    let normalized = normalize_path(path);
    normalized
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(path: &str) -> Option<ChannelId> {
        let classifier = ChannelClassifier::standard().unwrap();
        classifier.detect_channel(Path::new(path)).map(|r| r.id)
    }

    #[test]
    fn test_kakao_folder() {
        assert_eq!(detect("/data/07_CJ/카카오/0210 주문.xlsx"), Some(ChannelId::Kakao));
    }

    #[test]
    fn test_paldogam_naver_precedes_paldogam() {
        assert_eq!(
            detect("/data/팔도감/네이버/주문.xlsx"),
            Some(ChannelId::PaldogamNaver)
        );
        assert_eq!(detect("/data/팔도감/주문.xlsx"), Some(ChannelId::Paldogam));
    }

    #[test]
    fn test_jiktaebae_file_rules() {
        assert_eq!(detect("/data/직택배/0210_아이원.xlsx"), Some(ChannelId::Iwon));
        assert_eq!(detect("/data/직택배/발주서_0210.xlsx"), Some(ChannelId::Iwon));
        assert_eq!(
            detect("/data/직택배/스마트스토어_주문.xlsx"),
            Some(ChannelId::JiktaebaeNaver)
        );
        assert_eq!(
            detect("/data/직택배/20260210_J우리곡간.xlsx"),
            Some(ChannelId::JiktaebaeGeneric)
        );
    }

    #[test]
    fn test_windows_separators_normalized() {
        assert_eq!(
            detect(r"C:\choolgo\카카오\주문.xlsx"),
            Some(ChannelId::Kakao)
        );
    }

    #[test]
    fn test_lock_file_rejected() {
        assert_eq!(detect("/data/카카오/~$주문.xlsx"), None);
        assert_eq!(detect(r"C:\data\직택배\~$아이원.xlsx"), None);
    }

    #[test]
    fn test_unknown_folder_is_none() {
        assert_eq!(detect("/data/기타/주문.xlsx"), None);
    }

    #[test]
    fn test_file_name_handles_both_separators() {
        assert_eq!(file_name(Path::new(r"a\b\c.xlsx")), "c.xlsx");
        assert_eq!(file_name(Path::new("a/b/c.xlsx")), "c.xlsx");
    }
}
