use tui::widgets::ListState;

/// Items plus a wrapping selection cursor.
pub struct SelectList<T> {
    items: Vec<T>,
    pub state: ListState,
}

impl<T> SelectList<T> {
    pub fn new(items: Vec<T>) -> Self {
        let mut state = ListState::default();
        if !items.is_empty() {
            state.select(Some(0));
        }
        Self { items, state }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn selected(&self) -> Option<&T> {
        self.state.selected().and_then(|i| self.items.get(i))
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < self.items.len() => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => self.items.len() - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_wraps_both_ways() {
        let mut list = SelectList::new(vec!["a", "b", "c"]);
        list.previous();
        assert_eq!(list.selected(), Some(&"c"));
        list.next();
        assert_eq!(list.selected(), Some(&"a"));
    }

    #[test]
    fn empty_list_has_no_selection() {
        let mut list: SelectList<u8> = SelectList::new(Vec::new());
        list.next();
        list.previous();
        assert_eq!(list.selected(), None);
    }
}
