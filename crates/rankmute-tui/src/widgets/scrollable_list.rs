//! Scrollable, filterable list of rows rebuilt from each snapshot.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub struct ScrollableList<T> {
    items: Vec<T>,
    filtered: Vec<usize>,
    selected: usize,
    scroll_offset: usize,
    filter: String,
    matches: Box<dyn Fn(&T, &str) -> bool + Send + Sync>,
}

impl<T> ScrollableList<T> {
    /// `matches(item, query)` decides filter membership; `query` is lowercase.
    pub fn new(matches: impl Fn(&T, &str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            items: Vec::new(),
            filtered: Vec::new(),
            selected: 0,
            scroll_offset: 0,
            filter: String::new(),
            matches: Box::new(matches),
        }
    }

    /// Replace the rows, keeping the cursor on the row with the same key if
    /// it is still present.
    pub fn replace_items<K: PartialEq>(&mut self, items: Vec<T>, key: impl Fn(&T) -> K) {
        let previous = self.selected_item().map(&key);
        self.items = items;
        self.refilter();
        if let Some(prev) = previous {
            if let Some(pos) = self
                .filtered
                .iter()
                .position(|&i| key(&self.items[i]) == prev)
            {
                self.selected = pos;
            }
        }
    }

    pub fn set_filter(&mut self, query: &str) {
        let query = query.to_lowercase();
        if query == self.filter {
            return;
        }
        let previous = self.filtered.get(self.selected).copied();
        self.filter = query;
        self.refilter();
        self.selected = previous
            .and_then(|p| self.filtered.iter().position(|&i| i == p))
            .unwrap_or(0);
        self.scroll_offset = 0;
    }

    fn refilter(&mut self) {
        self.filtered = if self.filter.is_empty() {
            (0..self.items.len()).collect()
        } else {
            self.items
                .iter()
                .enumerate()
                .filter(|(_, item)| (self.matches)(item, &self.filter))
                .map(|(i, _)| i)
                .collect()
        };
        if self.selected >= self.filtered.len() {
            self.selected = self.filtered.len().saturating_sub(1);
        }
    }

    pub fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    pub fn select_down(&mut self, n: usize) {
        self.selected = (self.selected + n).min(self.filtered.len().saturating_sub(1));
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
        self.scroll_offset = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.filtered.len().saturating_sub(1);
    }

    /// Cursor movement shared by every list pane.  Returns `true` if `key`
    /// was a movement key.
    pub fn handle_nav_key(&mut self, key: &KeyEvent) -> bool {
        let step = if key.modifiers.contains(KeyModifiers::SHIFT) {
            5
        } else {
            1
        };
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select_up(step),
            KeyCode::Down | KeyCode::Char('j') => self.select_down(step),
            KeyCode::PageUp => self.select_up(10),
            KeyCode::PageDown => self.select_down(10),
            KeyCode::Home | KeyCode::Char('g') => self.select_first(),
            KeyCode::End | KeyCode::Char('G') => self.select_last(),
            _ => return false,
        }
        true
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.filtered.get(self.selected).map(|&i| &self.items[i])
    }

    /// Position of the cursor within the filtered rows.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Rows that fit in `height`, paired with their filtered position.
    /// Call `ensure_visible` first.
    pub fn visible_items(&self, height: usize) -> impl Iterator<Item = (usize, &T)> + '_ {
        let start = self.scroll_offset.min(self.filtered.len());
        let end = (start + height).min(self.filtered.len());
        self.filtered[start..end]
            .iter()
            .enumerate()
            .map(move |(n, &i)| (start + n, &self.items[i]))
    }

    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll_offset {
            self.scroll_offset = self.selected;
        } else if self.selected >= self.scroll_offset + height {
            self.scroll_offset = self.selected + 1 - height;
        }
    }

    /// Move the cursor to the `row`th visible line.  Returns `true` when the
    /// row exists.
    pub fn click(&mut self, row: usize) -> bool {
        let target = self.scroll_offset + row;
        if target < self.filtered.len() {
            self.selected = target;
            return true;
        }
        false
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.filtered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered.is_empty()
    }

    pub fn total_len(&self) -> usize {
        self.items.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &ScrollableList<String>, height: usize) -> Vec<&str> {
        list.visible_items(height).map(|(_, s)| s.as_str()).collect()
    }

    fn list() -> ScrollableList<String> {
        let mut list = ScrollableList::new(|s: &String, q: &str| s.to_lowercase().contains(q));
        list.replace_items(
            ["Alpha", "Beta", "Gamma", "Delta"].map(String::from).to_vec(),
            |s| s.clone(),
        );
        list
    }

    #[test]
    fn test_filter_is_case_insensitive_and_keeps_cursor() {
        let mut list = list();
        list.select_down(2); // Gamma
        list.set_filter("MA");
        assert_eq!(names(&list, 10), vec!["Gamma"]);
        assert_eq!(list.selected_item().map(String::as_str), Some("Gamma"));

        list.set_filter("");
        assert_eq!(list.len(), 4);
        assert_eq!(list.selected_item().map(String::as_str), Some("Gamma"));
    }

    #[test]
    fn test_replace_keeps_cursor_by_key() {
        let mut list = list();
        list.select_last(); // Delta
        list.replace_items(
            ["Delta", "Alpha"].map(String::from).to_vec(),
            |s| s.clone(),
        );
        assert_eq!(list.selected_item().map(String::as_str), Some("Delta"));
        assert_eq!(list.selected(), 0);
    }

    #[test]
    fn test_scrolling_window() {
        let mut list = list();
        list.select_last();
        list.ensure_visible(2);
        assert_eq!(names(&list, 2), vec!["Gamma", "Delta"]);
        assert!(list.click(0));
        assert_eq!(list.selected_item().map(String::as_str), Some("Gamma"));
        assert!(!list.click(5));
    }
}
