//! Diesel schema for ranked board persistence.

diesel::table! {
    /// Boards, the containers of status lists.
    boards (id) {
        /// Board identifier.
        id -> Uuid,
    }
}

diesel::table! {
    /// Status lists ranked within their board.
    status_lists (id) {
        /// Status-list identifier, also the container id of its tasks.
        id -> Uuid,
        /// Owning board.
        board_id -> Uuid,
        /// 1-based rank within the board.
        position -> Int8,
        /// Display name.
        #[max_length = 255]
        title -> Varchar,
        /// Creation timestamp, used to break rank ties.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks ranked within their status list.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owning status list.
        status_list_id -> Uuid,
        /// 1-based rank within the status list.
        position -> Int8,
        /// Display title.
        #[max_length = 255]
        title -> Varchar,
        /// Creation timestamp, used to break rank ties.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(status_lists -> boards (board_id));
diesel::joinable!(tasks -> status_lists (status_list_id));

diesel::allow_tables_to_appear_in_same_query!(boards, status_lists, tasks);
