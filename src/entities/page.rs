use serde::{Deserialize, Serialize};

/// Pagination window for list queries. `limit: None` returns everything.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Page {
    pub fn all() -> Self {
        Self::default()
    }

    /// Clamps the window to `max_limit`; negative values are treated as zero.
    pub fn clamp(self, max_limit: i64) -> Self {
        Self {
            limit: self.limit.map(|l| l.clamp(0, max_limit)),
            offset: self.offset.map(|o| o.max(0)),
        }
    }
}

#[test]
fn page_clamp_test() {
    let page = Page {
        limit: Some(500),
        offset: Some(-4),
    }
    .clamp(100);

    assert_eq!(page.limit, Some(100));
    assert_eq!(page.offset, Some(0));
    assert_eq!(Page::all().clamp(100), Page::all());
}
