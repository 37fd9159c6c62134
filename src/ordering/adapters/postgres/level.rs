//! Ranked levels stored in `PostgreSQL`.

/// Which ranked table a [`super::PostgresOrderedRepository`] addresses.
///
/// `StatusLists` ranks rows of `status_lists` by `board_id`; `Tasks` ranks
/// rows of `tasks` by `status_list_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderedLevel {
    /// Status lists ranked within boards.
    StatusLists,
    /// Tasks ranked within status lists.
    Tasks,
}

impl OrderedLevel {
    /// Returns `true` when containers are rows owned by this level alone and
    /// may be created or dropped through it.
    #[must_use]
    pub const fn owns_containers(self) -> bool {
        matches!(self, Self::StatusLists)
    }
}
