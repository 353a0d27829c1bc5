use url::Url;

use crate::fetch::Request;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    url: Url,
    request: Request,
}

/// Navigation history: the visited documents and a cursor into them.
///
/// Recording a new visit discards everything ahead of the cursor, as a
/// browser does after going back and following a different link.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<Entry>,
    position: Option<usize>,
}

impl History {
    /// Empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            position: None,
        }
    }

    /// Record a visit to `url`, made with `request`, and move onto it.
    pub fn record_entry(&mut self, url: Url, request: Request) {
        if let Some(position) = self.position {
            self.entries.truncate(position + 1);
        }
        self.entries.push(Entry { url, request });
        self.position = Some(self.entries.len() - 1);
    }

    /// URL at the cursor.
    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.current().map(|entry| &entry.url)
    }

    /// Request at the cursor.
    #[must_use]
    pub fn request(&self) -> Option<&Request> {
        self.current().map(|entry| &entry.request)
    }

    /// Move the cursor back. False at the first entry or when empty.
    pub fn back(&mut self) -> bool {
        match self.position {
            Some(position) if position > 0 => {
                self.position = Some(position - 1);
                true
            }
            _ => false,
        }
    }

    /// Move the cursor forward. False at the last entry or when empty.
    pub fn forward(&mut self) -> bool {
        match self.position {
            Some(position) if position + 1 < self.entries.len() => {
                self.position = Some(position + 1);
                true
            }
            _ => false,
        }
    }

    /// Number of recorded entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True before the first visit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn current(&self) -> Option<&Entry> {
        self.position.and_then(|position| self.entries.get(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn visit(history: &mut History, url: &str) {
        let url = Url::parse(url).unwrap();
        history.record_entry(url.clone(), Request::get(url));
    }

    fn at(history: &History) -> Option<&str> {
        history.url().map(Url::as_str)
    }

    #[test]
    fn test_empty_history() {
        let mut history = History::new();
        assert!(history.is_empty());
        assert_eq!(history.url(), None);
        assert_eq!(history.request(), None);
        assert!(!history.back());
        assert!(!history.forward());
    }

    #[test]
    fn test_back_and_forward_stop_at_the_ends() {
        let mut history = History::new();
        visit(&mut history, "http://a.test/1");
        visit(&mut history, "http://a.test/2");
        assert!(!history.forward());
        assert!(history.back());
        assert_eq!(at(&history), Some("http://a.test/1"));
        assert!(!history.back());
        assert!(history.forward());
        assert_eq!(at(&history), Some("http://a.test/2"));
    }

    #[test]
    fn test_recording_drops_the_future() {
        let mut history = History::new();
        visit(&mut history, "http://a.test/1");
        visit(&mut history, "http://a.test/2");
        visit(&mut history, "http://a.test/3");
        assert!(history.back());
        assert!(history.back());
        visit(&mut history, "http://a.test/4");
        assert_eq!(history.len(), 2);
        assert!(!history.forward());
        assert!(history.back());
        assert_eq!(at(&history), Some("http://a.test/1"));
    }
}
