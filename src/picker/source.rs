use async_trait::async_trait;
use std::hash::Hash;

use crate::api::{AdminApi, ApiError};
use crate::models::{Category, CategoryId, Color, ColorId, Page, Size, SizeId};

// ============================================================================
// Picker Sources - what a picker lists and how it fetches a page
// ============================================================================

#[async_trait]
pub trait PickerSource: Send + Sync {
    type Item: Clone + Send + Sync + 'static;
    type Id: Clone + Eq + Hash + Send + Sync + 'static;

    /// Label used in logs and metrics
    fn entity(&self) -> &'static str;

    /// Whether the backend listing accepts a search term
    fn searchable(&self) -> bool {
        false
    }

    fn id_of<'a>(&self, item: &'a Self::Item) -> &'a Self::Id;

    async fn fetch(
        &self,
        api: &dyn AdminApi,
        page: u32,
        page_size: u32,
        search: Option<&str>,
    ) -> Result<Page<Self::Item>, ApiError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ColorSource;

#[async_trait]
impl PickerSource for ColorSource {
    type Item = Color;
    type Id = ColorId;

    fn entity(&self) -> &'static str {
        "color"
    }

    fn searchable(&self) -> bool {
        true
    }

    fn id_of<'a>(&self, item: &'a Color) -> &'a ColorId {
        &item.id
    }

    async fn fetch(
        &self,
        api: &dyn AdminApi,
        page: u32,
        page_size: u32,
        search: Option<&str>,
    ) -> Result<Page<Color>, ApiError> {
        api.list_colors(page, page_size, search).await
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SizeSource;

#[async_trait]
impl PickerSource for SizeSource {
    type Item = Size;
    type Id = SizeId;

    fn entity(&self) -> &'static str {
        "size"
    }

    fn id_of<'a>(&self, item: &'a Size) -> &'a SizeId {
        &item.id
    }

    async fn fetch(
        &self,
        api: &dyn AdminApi,
        page: u32,
        page_size: u32,
        _search: Option<&str>,
    ) -> Result<Page<Size>, ApiError> {
        api.list_sizes(page, page_size).await
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CategorySource;

#[async_trait]
impl PickerSource for CategorySource {
    type Item = Category;
    type Id = CategoryId;

    fn entity(&self) -> &'static str {
        "category"
    }

    fn id_of<'a>(&self, item: &'a Category) -> &'a CategoryId {
        &item.id
    }

    async fn fetch(
        &self,
        api: &dyn AdminApi,
        page: u32,
        page_size: u32,
        _search: Option<&str>,
    ) -> Result<Page<Category>, ApiError> {
        api.list_categories(page, page_size).await
    }
}
