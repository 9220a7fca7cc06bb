use regex::Regex;
use std::path::Path;

use crate::channel::{file_name, ChannelClassifier, ChannelId, ChannelRule, EXCEL_LOCK_PREFIX};
use crate::error::ChoolgoError;

/// Channel detection for files that arrive without their folder (uploads,
/// mail attachments). Tries the folder rules first, then filename keywords,
/// and finally falls back to the generic channel in auto-detect mode.
#[derive(Debug, Clone)]
pub struct FilenameClassifier {
    paths: ChannelClassifier,
    keywords: Vec<(Regex, ChannelId)>,
}

impl FilenameClassifier {
    pub fn new(paths: ChannelClassifier) -> Result<Self, ChoolgoError> {
        let table = [
            ("카카오", ChannelId::Kakao),
            ("팔도감.*네이버|네이버.*팔도감", ChannelId::PaldogamNaver),
            ("팔도감", ChannelId::Paldogam),
            ("아이원|발주서", ChannelId::Iwon),
            ("네이버|스마트스토어", ChannelId::JiktaebaeNaver),
        ];
        let keywords = table
            .iter()
            .map(|(p, id)| {
                Regex::new(p)
                    .map(|re| (re, *id))
                    .map_err(|source| ChoolgoError::Pattern {
                        pattern: p.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { paths, keywords })
    }

    /// The folder rules tried first.
    pub fn paths(&self) -> &ChannelClassifier {
        &self.paths
    }

    pub fn detect(&self, path: &Path) -> Option<&ChannelRule> {
        let name = file_name(path);
        if name.starts_with(EXCEL_LOCK_PREFIX) {
            return None;
        }

        if let Some(rule) = self.paths.detect_channel(path) {
            return Some(rule);
        }

        let id = self
            .keywords
            .iter()
            .find(|(re, _)| re.is_match(&name))
            .map(|(_, id)| *id)
            .unwrap_or(ChannelId::JiktaebaeGeneric);

        self.paths.rule(id)
    }
}
