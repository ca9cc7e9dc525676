//! Image picker over the vault's image files

use super::{ComponentKey, DisplayProps, SelectOutcome, SuggesterStrategy};
use crate::fuzzy::{FuzzySearch, KEY_BASENAME, KEY_NAME, SearchKey, SearchOptions, SearchResult};
use crate::host::Vault;
use crate::index::paths::parent_of;
use crate::model::{FileType, SearchRecord};
use crate::suggest::error::Result;
use crate::suggest::keymap::SelectMode;
use async_trait::async_trait;

const MAX_RESULTS: usize = 100;

/// Picks an image file and writes its name into the input
pub struct ImageStrategy {
    search: FuzzySearch<SearchRecord>,
}

impl ImageStrategy {
    /// Snapshot the image files of `vault`
    #[must_use]
    pub fn new(vault: &dyn Vault) -> Self {
        let images: Vec<SearchRecord> = vault
            .files()
            .into_iter()
            .map(|file| SearchRecord::file(file.path))
            .filter(|record| record.file_type == FileType::Image)
            .collect();
        tracing::debug!("Image picker over {} files", images.len());

        let options = SearchOptions::default()
            .with_keys(vec![SearchKey::new(KEY_NAME, 1.0), SearchKey::new(KEY_BASENAME, 1.0)]);
        Self {
            search: FuzzySearch::new(images, options),
        }
    }
}

#[async_trait(?Send)]
impl SuggesterStrategy for ImageStrategy {
    type Item = SearchResult<SearchRecord>;

    async fn get_suggestions(&self, input: &str) -> Vec<Self::Item> {
        self.search.raw_search(input, Some(MAX_RESULTS))
    }

    async fn use_selected_item(
        &self,
        result: Self::Item,
        _mode: SelectMode,
        _input: &str,
    ) -> Result<SelectOutcome> {
        Ok(SelectOutcome::SetInput(result.item.name))
    }

    fn display_props(&self, result: &Self::Item, _input: &str) -> DisplayProps {
        let parent = parent_of(&result.item.path);
        DisplayProps {
            label: result.item.name.clone(),
            label_matches: result
                .matched_key(KEY_NAME)
                .map(|m| m.indices.clone())
                .unwrap_or_default(),
            detail: Some(if parent.is_empty() { "/" } else { parent }.to_string()),
            ..DisplayProps::default()
        }
    }

    fn component_key(&self) -> ComponentKey {
        ComponentKey::ImageSuggestion
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHost;

    #[tokio::test]
    async fn test_only_images_are_offered() {
        let host = TestHost::new().with_files(&[
            ("assets/cover.png", ""),
            ("cover letter.md", ""),
            ("scan.jpg", ""),
        ]);
        let strategy = ImageStrategy::new(host.vault.as_ref());

        let results = strategy.get_suggestions("cover").await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].item.path, "assets/cover.png");

        let props = strategy.display_props(&results[0], "cover");
        assert_eq!(props.label, "cover.png");
        assert_eq!(props.detail.as_deref(), Some("assets"));

        let scan = strategy.get_suggestions("scan").await.remove(0);
        assert_eq!(strategy.display_props(&scan, "scan").detail.as_deref(), Some("/"));
        assert_eq!(
            strategy
                .use_selected_item(scan, SelectMode::Default, "scan")
                .await
                .unwrap(),
            SelectOutcome::SetInput("scan.jpg".to_string())
        );
    }
}
