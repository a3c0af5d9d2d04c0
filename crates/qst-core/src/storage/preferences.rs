use super::{KeyValueStore, LAST_QUOTE_KEY, SELECTED_FILTER_KEY};
use crate::error::Result;
use crate::view::Filter;
use std::sync::Arc;

/// User preferences split across the durable and the session store
#[derive(Clone)]
pub struct Preferences {
    durable: Arc<dyn KeyValueStore>,
    session: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(durable: Arc<dyn KeyValueStore>, session: Arc<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    /// Saved category filter; an unset slot means all categories
    pub fn selected_filter(&self) -> Result<Filter> {
        Ok(self
            .durable
            .get(SELECTED_FILTER_KEY)?
            .map(|raw| Filter::parse(&raw))
            .unwrap_or_default())
    }

    pub fn set_selected_filter(&self, filter: &Filter) -> Result<()> {
        self.durable.set(SELECTED_FILTER_KEY, filter.as_str())
    }

    /// Text of the last quote shown in this session
    pub fn last_quote(&self) -> Result<Option<String>> {
        self.session.get(LAST_QUOTE_KEY)
    }

    pub fn set_last_quote(&self, text: &str) -> Result<()> {
        self.session.set(LAST_QUOTE_KEY, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn prefs() -> (Preferences, Arc<MemoryStore>, Arc<MemoryStore>) {
        let durable = Arc::new(MemoryStore::new());
        let session = Arc::new(MemoryStore::new());
        (
            Preferences::new(durable.clone(), session.clone()),
            durable,
            session,
        )
    }

    #[test]
    fn filter_defaults_to_all() {
        let (prefs, _, _) = prefs();
        assert_eq!(prefs.selected_filter().unwrap(), Filter::All);
    }

    #[test]
    fn filter_lands_in_durable_store() {
        let (prefs, durable, session) = prefs();
        prefs
            .set_selected_filter(&Filter::Category("Life".into()))
            .unwrap();

        assert_eq!(durable.get(SELECTED_FILTER_KEY).unwrap().as_deref(), Some("Life"));
        assert_eq!(session.get(SELECTED_FILTER_KEY).unwrap(), None);
        assert_eq!(
            prefs.selected_filter().unwrap(),
            Filter::Category("Life".into())
        );
    }

    #[test]
    fn last_quote_lands_in_session_store() {
        let (prefs, durable, session) = prefs();
        prefs.set_last_quote("Stay hungry, stay foolish.").unwrap();

        assert_eq!(durable.get(LAST_QUOTE_KEY).unwrap(), None);
        assert!(session.get(LAST_QUOTE_KEY).unwrap().is_some());

        session.clear();
        assert_eq!(prefs.last_quote().unwrap(), None);
    }
}
