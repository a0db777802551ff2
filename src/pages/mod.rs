//! Page model: route keys, the route table (page -> loader), and the
//! loaded-bundle store.
//!
//! Pages are a closed set, so the route key is an enum rather than a path
//! string. The store is the in-process analog of a module cache: loaders
//! build a `PageBundle` and insert it as a side effect, while the preloader
//! only observes success/failure.

pub mod content;

use anyhow::Result;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

pub use content::{ContactLink, ExperienceRole, PageBody, ProjectEntry};

/// Route key for one page of the site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub enum PageId {
    Home,
    Projects,
    Experience,
    Contact,
}

impl PageId {
    /// All pages, in navigation order.
    pub const ALL: [PageId; 4] = [
        PageId::Home,
        PageId::Projects,
        PageId::Experience,
        PageId::Contact,
    ];

    /// Pages warmed first, independent of navigation order.
    pub const PRIORITY: [PageId; 2] = [PageId::Projects, PageId::Experience];

    pub fn label(self) -> &'static str {
        match self {
            PageId::Home => "Home",
            PageId::Projects => "Projects",
            PageId::Experience => "Experience",
            PageId::Contact => "Contact",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            PageId::Home => "/",
            PageId::Projects => "/projects",
            PageId::Experience => "/experience",
            PageId::Contact => "/contact",
        }
    }

    /// Parse a CLI/page argument ("projects", "/projects", "Projects").
    pub fn parse(s: &str) -> Option<PageId> {
        let s = s.trim().trim_start_matches('/');
        PageId::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s) || p.path().trim_start_matches('/') == s)
    }
}

/// One loaded page: the content the shell renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PageBundle {
    pub page: PageId,
    pub body: PageBody,
}

/// Loader for one page. Opaque to the preloader: only success/failure
/// matter; the built-in loaders populate the `PageStore` as a side effect.
pub type PageLoader = Arc<dyn Fn() -> Result<()> + Send + Sync>;

/// Cache of loaded page bundles, shared between loaders and the shell.
#[derive(Clone, Default)]
pub struct PageStore {
    inner: Arc<RwLock<HashMap<PageId, Arc<PageBundle>>>>,
}

impl PageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, bundle: PageBundle) {
        self.inner
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(bundle.page, Arc::new(bundle));
    }

    pub fn get(&self, page: PageId) -> Option<Arc<PageBundle>> {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&page)
            .cloned()
    }

    pub fn contains(&self, page: PageId) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains_key(&page)
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Page -> loader mapping handed to the preloader and to the on-demand
/// fallback path.
#[derive(Clone)]
pub struct RouteTable {
    loaders: HashMap<PageId, PageLoader>,
}

impl RouteTable {
    /// Route table over the built-in static content. Loaders build the
    /// bundle and insert it into `store`.
    pub fn builtin(store: PageStore) -> Self {
        let mut loaders: HashMap<PageId, PageLoader> = HashMap::new();
        for page in PageId::ALL {
            let store = store.clone();
            loaders.insert(
                page,
                Arc::new(move || {
                    store.insert(content::bundle(page));
                    Ok(())
                }),
            );
        }
        Self { loaders }
    }

    /// Build a table from explicit loaders (tests inject failing ones).
    pub fn from_loaders(loaders: HashMap<PageId, PageLoader>) -> Self {
        Self { loaders }
    }

    pub fn loader(&self, page: PageId) -> Option<PageLoader> {
        self.loaders.get(&page).cloned()
    }

    /// Pages present in the table, in `PageId::ALL` order.
    pub fn pages(&self) -> Vec<PageId> {
        PageId::ALL
            .into_iter()
            .filter(|p| self.loaders.contains_key(p))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_parse() {
        assert_eq!(PageId::parse("projects"), Some(PageId::Projects));
        assert_eq!(PageId::parse("/experience"), Some(PageId::Experience));
        assert_eq!(PageId::parse("Home"), Some(PageId::Home));
        assert_eq!(PageId::parse("/"), Some(PageId::Home));
        assert_eq!(PageId::parse("nope"), None);
    }

    #[test]
    fn test_builtin_loaders_populate_store() {
        let store = PageStore::new();
        let routes = RouteTable::builtin(store.clone());

        assert!(!store.contains(PageId::Contact));
        let loader = routes.loader(PageId::Contact).unwrap();
        loader().unwrap();

        let bundle = store.get(PageId::Contact).unwrap();
        assert_eq!(bundle.page, PageId::Contact);
        assert!(matches!(bundle.body, PageBody::Contact { .. }));
    }

    #[test]
    fn test_route_table_page_order() {
        let store = PageStore::new();
        let routes = RouteTable::builtin(store);
        assert_eq!(routes.pages(), PageId::ALL.to_vec());
    }
}
