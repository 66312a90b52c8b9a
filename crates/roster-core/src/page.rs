//! The response envelope shared by every listing endpoint.

use serde::{Deserialize, Serialize};

use crate::filter::PageRequest;

/// A page of records as returned by the store, before projection.
#[derive(Debug, Clone)]
pub struct RawPage<R> {
  pub content: Vec<R>,
  /// Matching records across all pages.
  pub total:   u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
  pub content:        Vec<T>,
  pub total_elements: u64,
  /// 0-based page index.
  pub page:           u32,
  pub size:           u32,
  pub total_pages:    u32,
}

impl<T> Page<T> {
  /// Project every record and wrap the result with page metadata. Store
  /// order is preserved.
  pub fn assemble<R>(raw: RawPage<R>, request: PageRequest) -> Self
  where
    T: for<'a> From<&'a R>,
  {
    let total_pages = match request.size {
      0 => 0,
      size => u32::try_from(raw.total.div_ceil(u64::from(size))).unwrap_or(u32::MAX),
    };
    Self {
      content: raw.content.iter().map(T::from).collect(),
      total_elements: raw.total,
      page: request.index,
      size: request.size,
      total_pages,
    }
  }
}
