use crate::models::{SortOption, Todo, TodoStatus};
use std::collections::HashMap;

/// Cache key for list queries. Any change to the filter, sort, or search
/// text produces a different key and therefore a separate cache entry.
#[derive(Clone, Default, Debug, PartialEq, Eq, Hash)]
pub struct ListKey {
    pub status: TodoStatus,
    pub sort: SortOption,
    pub search: String,
}

/// Lifecycle of one query key. A tagged variant instead of boolean flags,
/// so "loading with data" or "error with data" cannot be represented.
#[derive(Clone, Debug, PartialEq)]
pub enum QueryState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

#[derive(Clone, Debug)]
struct Entry<T> {
    state: QueryState<T>,
    stale: bool,
}

impl<T> Default for Entry<T> {
    fn default() -> Self {
        Entry {
            state: QueryState::Idle,
            stale: false,
        }
    }
}

impl<T> Entry<T> {
    // Loading entries are never re-fetched: at most one fetch per key.
    // Settled entries re-fetch only after invalidation.
    fn needs_fetch(&self) -> bool {
        match self.state {
            QueryState::Idle => true,
            QueryState::Loading => false,
            QueryState::Success(_) | QueryState::Error(_) => self.stale,
        }
    }
}

/// Keyed store for list and detail reads. Mutations do not write into the
/// cache; they only mark entries stale via the `invalidate_*` methods, and
/// only after the server accepted the mutation. The next read for a stale
/// key re-fetches; a failed mutation leaves every entry untouched.
#[derive(Default, Debug)]
pub struct QueryCache {
    lists: HashMap<ListKey, Entry<Vec<Todo>>>,
    details: HashMap<String, Entry<Todo>>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list(&self, key: &ListKey) -> QueryState<&[Todo]> {
        match self.lists.get(key) {
            None => QueryState::Idle,
            Some(entry) => match &entry.state {
                QueryState::Idle => QueryState::Idle,
                QueryState::Loading => QueryState::Loading,
                QueryState::Success(todos) => QueryState::Success(todos.as_slice()),
                QueryState::Error(msg) => QueryState::Error(msg.clone()),
            },
        }
    }

    pub fn list_needs_fetch(&self, key: &ListKey) -> bool {
        self.lists.get(key).map_or(true, Entry::needs_fetch)
    }

    pub fn begin_list(&mut self, key: ListKey) {
        let entry = self.lists.entry(key).or_default();
        entry.state = QueryState::Loading;
        entry.stale = false;
    }

    pub fn finish_list(&mut self, key: &ListKey, result: Result<Vec<Todo>, String>) {
        if let Some(entry) = self.lists.get_mut(key) {
            entry.state = match result {
                Ok(todos) => QueryState::Success(todos),
                Err(msg) => QueryState::Error(msg),
            };
        }
    }

    pub fn detail(&self, id: &str) -> QueryState<&Todo> {
        match self.details.get(id) {
            None => QueryState::Idle,
            Some(entry) => match &entry.state {
                QueryState::Idle => QueryState::Idle,
                QueryState::Loading => QueryState::Loading,
                QueryState::Success(todo) => QueryState::Success(todo),
                QueryState::Error(msg) => QueryState::Error(msg.clone()),
            },
        }
    }

    pub fn detail_needs_fetch(&self, id: &str) -> bool {
        self.details.get(id).map_or(true, Entry::needs_fetch)
    }

    pub fn begin_detail(&mut self, id: String) {
        let entry = self.details.entry(id).or_default();
        entry.state = QueryState::Loading;
        entry.stale = false;
    }

    pub fn finish_detail(&mut self, id: &str, result: Result<Todo, String>) {
        if let Some(entry) = self.details.get_mut(id) {
            entry.state = match result {
                Ok(todo) => QueryState::Success(todo),
                Err(msg) => QueryState::Error(msg),
            };
        }
    }

    /// Mark every cached list variant stale after a successful mutation.
    pub fn invalidate_lists(&mut self) {
        for entry in self.lists.values_mut() {
            entry.stale = true;
        }
    }

    pub fn invalidate_detail(&mut self, id: &str) {
        if let Some(entry) = self.details.get_mut(id) {
            entry.stale = true;
        }
    }

    /// Drop a detail entry entirely, used once a todo has been deleted.
    pub fn remove_detail(&mut self, id: &str) {
        self.details.remove(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn todo(id: &str, title: &str) -> Todo {
        let ts = Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap();
        Todo {
            id: id.to_string(),
            title: title.to_string(),
            description: None,
            completed: false,
            priority: 3,
            created_at: ts,
            updated_at: ts,
        }
    }

    #[test]
    fn unknown_key_is_idle_and_needs_fetch() {
        let cache = QueryCache::new();
        let key = ListKey::default();
        assert_eq!(cache.list(&key), QueryState::Idle);
        assert!(cache.list_needs_fetch(&key));
    }

    #[test]
    fn loading_key_is_not_fetched_again() {
        let mut cache = QueryCache::new();
        let key = ListKey::default();
        cache.begin_list(key.clone());
        assert_eq!(cache.list(&key), QueryState::Loading);
        assert!(!cache.list_needs_fetch(&key));
    }

    #[test]
    fn successful_fetch_is_served_from_cache() {
        let mut cache = QueryCache::new();
        let key = ListKey::default();
        cache.begin_list(key.clone());
        cache.finish_list(&key, Ok(vec![todo("a", "First")]));
        assert!(!cache.list_needs_fetch(&key));
        match cache.list(&key) {
            QueryState::Success(todos) => assert_eq!(todos[0].title, "First"),
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[test]
    fn failed_fetch_settles_in_error_without_retry() {
        let mut cache = QueryCache::new();
        let key = ListKey::default();
        cache.begin_list(key.clone());
        cache.finish_list(&key, Err("connection refused".to_string()));
        assert_eq!(
            cache.list(&key),
            QueryState::Error("connection refused".to_string())
        );
        // no automatic retry: the error is persistent until invalidated
        assert!(!cache.list_needs_fetch(&key));
    }

    #[test]
    fn invalidation_marks_all_list_variants_stale() {
        let mut cache = QueryCache::new();
        let key_all = ListKey::default();
        let key_open = ListKey {
            status: TodoStatus::Open,
            ..Default::default()
        };
        cache.begin_list(key_all.clone());
        cache.finish_list(&key_all, Ok(vec![]));
        cache.begin_list(key_open.clone());
        cache.finish_list(&key_open, Ok(vec![]));

        cache.invalidate_lists();
        assert!(cache.list_needs_fetch(&key_all));
        assert!(cache.list_needs_fetch(&key_open));
    }

    #[test]
    fn invalidation_keeps_previous_data_until_refetch() {
        let mut cache = QueryCache::new();
        let key = ListKey::default();
        cache.begin_list(key.clone());
        cache.finish_list(&key, Ok(vec![todo("a", "Old")]));
        cache.invalidate_lists();
        // stale entries still render their last data while the refetch runs
        match cache.list(&key) {
            QueryState::Success(todos) => assert_eq!(todos[0].title, "Old"),
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[test]
    fn begin_clears_staleness() {
        let mut cache = QueryCache::new();
        let key = ListKey::default();
        cache.begin_list(key.clone());
        cache.finish_list(&key, Ok(vec![]));
        cache.invalidate_lists();
        cache.begin_list(key.clone());
        assert!(!cache.list_needs_fetch(&key));
    }

    #[test]
    fn detail_entries_are_keyed_by_id() {
        let mut cache = QueryCache::new();
        cache.begin_detail("a".to_string());
        cache.finish_detail("a", Ok(todo("a", "First")));
        assert!(!cache.detail_needs_fetch("a"));
        assert!(cache.detail_needs_fetch("b"));
        cache.invalidate_detail("a");
        assert!(cache.detail_needs_fetch("a"));
    }

    #[test]
    fn removed_detail_behaves_like_never_fetched() {
        let mut cache = QueryCache::new();
        cache.begin_detail("a".to_string());
        cache.finish_detail("a", Ok(todo("a", "First")));
        cache.remove_detail("a");
        assert_eq!(cache.detail("a"), QueryState::Idle);
        assert!(cache.detail_needs_fetch("a"));
    }
}
