use serde::{Deserialize, Serialize};

pub type BoardId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
}

/// A named subdivision of a board. Group ids are opaque strings
/// such as `"topics"` or `"new_group12345"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: String,
    pub title: String,
}

impl Group {
    /// Title with the collapsed-group marker (`"> "`) removed.
    pub fn plain_title(&self) -> &str {
        let title = self.title.trim();
        title.strip_prefix("> ").map(str::trim).unwrap_or(title)
    }

    /// Whether this group answers to `name`: exact title first, then the
    /// title without its `"> "` marker.
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.title.trim() == name || self.plain_title() == name
    }
}

/// A board column as reported by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: String,
    pub title: String,
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// Find a column by title (case-insensitive), falling back to a column
/// whose id contains `fallback_id`.
pub fn find_column<'a>(columns: &'a [Column], title: &str, fallback_id: &str) -> Option<&'a Column> {
    columns
        .iter()
        .find(|c| c.title.eq_ignore_ascii_case(title))
        .or_else(|| {
            columns
                .iter()
                .find(|c| c.id.to_ascii_lowercase().contains(fallback_id))
        })
}
