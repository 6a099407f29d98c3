//! Client-side search and sort over the fetched user list.
//!
//! Nothing below the list view knows about search or sort; the query layer
//! hands over the full list and this module derives what the table shows.

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::app::AppState;
use crate::model::User;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Asc => "A-Z",
            SortOrder::Desc => "Z-A",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Case-insensitive substring match on name or email. `needle` must already
/// be lowercased.
pub fn matches(user: &User, needle: &str) -> bool {
    needle.is_empty() || user.name.to_lowercase().contains(needle) || user.email.to_lowercase().contains(needle)
}

/// Filter `users` by `term` and sort by name.
pub fn filter_and_sort(users: &[User], term: &str, order: SortOrder) -> Vec<User> {
    let needle = term.to_lowercase();
    let mut rows: Vec<User> = users.iter().filter(|u| matches(u, &needle)).cloned().collect();
    rows.sort_by(|a, b| order.apply(compare_names(&a.name, &b.name).then(a.id.cmp(&b.id))));
    rows
}

/// Collation-style name comparison: letters first, ignoring case and
/// accents; then accents; then lower case before upper case.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let primary = primary_key(a).cmp(&primary_key(b));
    if primary != Ordering::Equal {
        return primary;
    }
    let secondary = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    if secondary != Ordering::Equal {
        return secondary;
    }
    let tertiary = a
        .chars()
        .map(|c| c.is_uppercase())
        .cmp(b.chars().map(|c| c.is_uppercase()));
    tertiary.then_with(|| a.cmp(b))
}

/// Canonical decomposition with combining marks dropped, lowercased. Latin
/// letters that have no decomposition are spelled out by hand.
fn primary_key(s: &str) -> String {
    let mut key = String::with_capacity(s.len());
    for c in s.nfd().filter(|c| !is_combining_mark(*c)) {
        match c {
            'Æ' | 'æ' => key.push_str("ae"),
            'Œ' | 'œ' => key.push_str("oe"),
            'ß' | 'ẞ' => key.push_str("ss"),
            'Þ' | 'þ' => key.push_str("th"),
            'Ø' | 'ø' => key.push('o'),
            'Ł' | 'ł' => key.push('l'),
            'Đ' | 'đ' | 'Ð' | 'ð' => key.push('d'),
            'Ħ' | 'ħ' => key.push('h'),
            'ı' => key.push('i'),
            other => key.extend(other.to_lowercase()),
        }
    }
    key
}

/// Memoized result of [`filter_and_sort`] for the list view.
#[derive(Clone, Debug, Default)]
pub struct ListView {
    inputs: Option<(u64, String, SortOrder)>,
    rows: Vec<User>,
    total: usize,
}

impl ListView {
    /// Recompute only when the data version, term or order changed.
    /// Returns whether a recomputation happened.
    pub fn update(&mut self, data_version: u64, users: &[User], term: &str, order: SortOrder) -> bool {
        if let Some((version, last_term, last_order)) = &self.inputs {
            if *version == data_version && last_term == term && *last_order == order {
                return false;
            }
        }
        self.rows = filter_and_sort(users, term, order);
        self.total = users.len();
        self.inputs = Some((data_version, term.to_string(), order));
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn rows(&self) -> &[User] {
        &self.rows
    }

    pub fn summary(&self) -> String {
        format!("Showing {} of {} users", self.rows.len(), self.total)
    }
}

/// Re-derive the visible rows from the app's list snapshot, search term and
/// sort order, and keep the selection in range.
pub fn apply_search(app: &mut AppState) {
    match app.list_state.users() {
        Some(users) => {
            app.list_view
                .update(app.list_state.data_version, users, &app.search_query, app.sort_order);
        }
        None => app.list_view.clear(),
    }
    let len = app.list_view.rows().len();
    app.selected_user_index = app.selected_user_index.min(len.saturating_sub(1));
}
