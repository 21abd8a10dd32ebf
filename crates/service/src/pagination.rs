//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

use common::types::PaginationMeta;
use sea_orm::{DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, Select};

use crate::errors::ServiceError;

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults and convert to `u64`
    pub fn normalize(self) -> (u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as u64, per_page as u64)
    }

    /// Build from raw `page`/`limit` query strings; unparsable values fall back to defaults.
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let d = Self::default();
        let parse = |v: Option<&str>, fallback: u32| {
            v.and_then(|s| s.trim().parse::<u32>().ok()).filter(|n| *n > 0).unwrap_or(fallback)
        };
        Self { page: parse(page, d.page), per_page: parse(limit, d.per_page) }
    }

    /// Response block for a page holding `rows` items out of `total_pages`.
    pub fn meta(self, rows: usize, total_pages: u64) -> PaginationMeta {
        let (idx, _) = self.normalize();
        PaginationMeta { current_page: idx + 1, page_count: rows as u64, total_pages_count: total_pages }
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 20 } }
}

/// One page of results with its pagination block.
#[derive(Clone, Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Page<T> {
    /// Slice an in-memory list; used by the mock repositories.
    pub fn from_vec(all: Vec<T>, opts: Pagination) -> Self {
        let (idx, per_page) = opts.normalize();
        let total = all.len() as u64;
        let total_pages = total.div_ceil(per_page);
        let items: Vec<T> = all.into_iter().skip((idx * per_page) as usize).take(per_page as usize).collect();
        let meta = opts.meta(items.len(), total_pages);
        Page { items, meta }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page { items: self.items.into_iter().map(f).collect(), meta: self.meta }
    }
}

/// Run `select` through SeaORM's paginator and attach the pagination block.
pub async fn fetch_page<'db, E, M>(
    db: &'db DatabaseConnection,
    select: Select<E>,
    opts: Pagination,
) -> Result<Page<M>, ServiceError>
where
    E: EntityTrait<Model = M>,
    M: FromQueryResult + Sized + Send + Sync + 'db,
{
    let (page_idx, per_page) = opts.normalize();
    // SeaORM's paginate uses 0-based page index internally via fetch_page
    let paginator = select.paginate(db, per_page);
    let total_pages = paginator.num_pages().await?;
    let items = paginator.fetch_page(page_idx).await?;
    let meta = opts.meta(items.len(), total_pages);
    Ok(Page { items, meta })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (idx, per) = Pagination { page: 0, per_page: 0 }.normalize();
        assert_eq!(idx, 0);
        assert_eq!(per, 1);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (idx, per) = Pagination { page: 5, per_page: 1000 }.normalize();
        assert_eq!(idx, 4);
        assert_eq!(per, 100);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.per_page, 20);
    }

    #[test]
    fn from_query_falls_back_on_garbage() {
        let p = Pagination::from_query(Some("abc"), Some("-3"));
        assert_eq!((p.page, p.per_page), (1, 20));
        let p = Pagination::from_query(Some("3"), None);
        assert_eq!((p.page, p.per_page), (3, 20));
    }

    #[test]
    fn page_from_vec_reports_counts() {
        let page = Page::from_vec((0..45).collect::<Vec<_>>(), Pagination { page: 3, per_page: 20 });
        assert_eq!(page.items, (40..45).collect::<Vec<_>>());
        assert_eq!(page.meta.current_page, 3);
        assert_eq!(page.meta.page_count, 5);
        assert_eq!(page.meta.total_pages_count, 3);
    }
}
