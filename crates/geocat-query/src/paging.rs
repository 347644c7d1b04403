use geocat_core::error::{CatalogError, Result};

/// Hard ceiling the search backend imposes on `from + size` result windows.
pub const MAX_RESULT_WINDOW: usize = 10_000;

/// Configured pagination bounds.
#[derive(Debug, Clone)]
pub struct PageLimits {
    pub default_page_size: usize,
    pub max_page_size: usize,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self { default_page_size: 100, max_page_size: 1000 }
    }
}

/// A validated result window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    pub page_size: usize,
}

impl PageWindow {
    /// Resolve requested paging parameters against configured limits.
    ///
    /// Runs before any query executes so an oversized window fails as a
    /// stable validation error instead of a backend-surfaced one.
    pub fn resolve(
        page_size: Option<usize>,
        offset: Option<usize>,
        limits: &PageLimits,
    ) -> Result<Self> {
        let page_size = page_size.unwrap_or(limits.default_page_size);
        if page_size > limits.max_page_size {
            return Err(CatalogError::PageSizeTooLarge {
                requested: page_size,
                max: limits.max_page_size,
            });
        }

        let offset = offset.unwrap_or(0);
        if page_size.saturating_add(offset) > MAX_RESULT_WINDOW {
            return Err(CatalogError::ResultWindowTooLarge {
                page_size,
                offset,
                limit: MAX_RESULT_WINDOW,
            });
        }

        Ok(Self { offset, page_size })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn limits() -> PageLimits {
        PageLimits { default_page_size: 100, max_page_size: MAX_RESULT_WINDOW }
    }

    #[test]
    fn defaults_apply_when_params_absent() {
        let window = PageWindow::resolve(None, None, &PageLimits::default()).unwrap();
        assert_eq!(window, PageWindow { offset: 0, page_size: 100 });
    }

    #[test]
    fn page_size_over_configured_max_is_rejected() {
        let err = PageWindow::resolve(Some(1001), None, &PageLimits::default()).unwrap_err();
        assert!(matches!(err, CatalogError::PageSizeTooLarge { requested: 1001, max: 1000 }));
        assert!(err.is_validation());
    }

    #[test]
    fn window_at_the_backend_ceiling_is_allowed() {
        let window = PageWindow::resolve(Some(2000), Some(8000), &limits()).unwrap();
        assert_eq!(window, PageWindow { offset: 8000, page_size: 2000 });
    }

    #[test]
    fn window_over_the_backend_ceiling_is_rejected() {
        let err = PageWindow::resolve(Some(2000), Some(8001), &limits()).unwrap_err();
        assert!(matches!(err, CatalogError::ResultWindowTooLarge { .. }));
        assert!(err.is_validation());
    }

    proptest! {
        #[test]
        fn resolves_iff_window_fits(page_size in 0usize..=MAX_RESULT_WINDOW, offset in 0usize..=MAX_RESULT_WINDOW) {
            let resolved = PageWindow::resolve(Some(page_size), Some(offset), &limits());
            if page_size + offset <= MAX_RESULT_WINDOW {
                prop_assert_eq!(resolved.unwrap(), PageWindow { offset, page_size });
            } else {
                let is_window_err = matches!(resolved.unwrap_err(), CatalogError::ResultWindowTooLarge { .. });
                prop_assert!(is_window_err);
            }
        }
    }
}
