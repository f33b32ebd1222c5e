//! Sort field and direction for the issue list.
//!
//! Sorting is done by the server; the client only decides which field and
//! direction to ask for.

use serde::{Deserialize, Serialize};

use crate::enum_display_fromstr;

/// Column the issue list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    DueDate,
}

enum_display_fromstr!(
    SortField,
    "sort field",
    {
        CreatedAt => "created_at",
        DueDate => "due_date",
    }
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Asc,
    #[default]
    #[serde(rename = "DESC")]
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    /// Wire form expected by the `sort_order` parameter.
    pub fn as_param(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_param())
    }
}

impl std::str::FromStr for SortDirection {
    type Err = crate::error::DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ASC" => Ok(SortDirection::Asc),
            "DESC" => Ok(SortDirection::Desc),
            _ => Err(crate::error::DeskError::InvalidValue {
                kind: "sort direction",
                value: s.to_string(),
            }),
        }
    }
}

/// Sort selection produced by clicking a sortable column.
///
/// Clicking the active column flips the direction; clicking another column
/// switches to it and always starts descending.
pub fn toggle_sort(
    current_field: SortField,
    current_direction: SortDirection,
    clicked: SortField,
) -> (SortField, SortDirection) {
    if clicked == current_field {
        (current_field, current_direction.flip())
    } else {
        (clicked, SortDirection::Desc)
    }
}
