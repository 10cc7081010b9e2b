use std::cmp::Ordering;

use crate::models::Hit;

/// Column orderings for the result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    None,
    Title,
    Author,
    Comments,
    Points,
}

impl SortKey {
    pub const COLUMNS: [SortKey; 4] = [SortKey::Title, SortKey::Author, SortKey::Comments, SortKey::Points];

    pub fn label(self) -> &'static str {
        match self {
            SortKey::None => "",
            SortKey::Title => "Title",
            SortKey::Author => "Author",
            SortKey::Comments => "Comments",
            SortKey::Points => "Points",
        }
    }

    fn compare(self, a: &Hit, b: &Hit) -> Ordering {
        match self {
            SortKey::None => Ordering::Equal,
            SortKey::Title => a.title.cmp(&b.title),
            SortKey::Author => a.author.cmp(&b.author),
            // Numeric columns read best-first
            SortKey::Comments => b.num_comments.cmp(&a.num_comments),
            SortKey::Points => b.points.cmp(&a.points),
        }
    }

    /// Stable sort; hits with equal keys keep their arrival order.
    pub fn apply<'a>(self, hits: &'a [Hit]) -> Vec<&'a Hit> {
        let mut sorted: Vec<&Hit> = hits.iter().collect();
        if self != SortKey::None {
            sorted.sort_by(|a, b| self.compare(a, b));
        }
        sorted
    }
}

/// Which header was clicked last and whether it was clicked twice in a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: SortKey,
    pub reversed: bool,
}

impl SortState {
    pub fn on_sort(&mut self, key: SortKey) {
        self.reversed = self.key == key && !self.reversed;
        self.key = key;
    }

    pub fn arrange<'a>(&self, hits: &'a [Hit]) -> Vec<&'a Hit> {
        let mut sorted = self.key.apply(hits);
        if self.reversed {
            sorted.reverse();
        }
        sorted
    }

    // Caret for a column header, empty when the column isn't the active one
    pub fn indicator(&self, key: SortKey) -> &'static str {
        if key != self.key || key == SortKey::None {
            ""
        } else if self.reversed {
            "▼"
        } else {
            "▲"
        }
    }
}
