#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    UserName,
    Email,
    CreatedAt,
}

impl SortField {
    /// Value of the `sortBy` query parameter
    pub fn as_query(&self) -> &'static str {
        match self {
            SortField::UserName => "userName",
            SortField::Email => "email",
            SortField::CreatedAt => "createdAt",
        }
    }

    pub fn from_query(s: &str) -> Option<SortField> {
        match s {
            _ if s.eq_ignore_ascii_case("userName") => Some(SortField::UserName),
            _ if s.eq_ignore_ascii_case("email") => Some(SortField::Email),
            _ if s.eq_ignore_ascii_case("createdAt") => Some(SortField::CreatedAt),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn is_ascending(&self) -> bool {
        matches!(self, SortDirection::Asc)
    }

    pub fn from_ascending(ascending: bool) -> SortDirection {
        match ascending {
            true => SortDirection::Asc,
            false => SortDirection::Desc,
        }
    }

    pub fn flip(&self) -> SortDirection {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Active ordering of a listing. Defaults to newest first.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for Sort {
    fn default() -> Sort {
        Sort {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}
