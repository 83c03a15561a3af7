//! Filterable tables and the columns clients may filter or order by.

use crate::filter::{ColumnType::*, FilterColumn, FilterTable};

pub static USER_ACCOUNTS: FilterTable = FilterTable {
    name: "user_accounts",
    columns: &[
        FilterColumn::new("id", Uuid),
        FilterColumn::new("name", Text),
        FilterColumn::new("email", Text),
        FilterColumn::new("role", Text),
        FilterColumn::new("active", Bool),
        FilterColumn::new("last_login_at", Timestamp),
        FilterColumn::new("created_at", Timestamp),
    ],
    soft_delete: true,
    default_order: "name",
};

pub static PLACES: FilterTable = FilterTable {
    name: "places",
    columns: &[
        FilterColumn::new("id", Uuid),
        FilterColumn::new("name", Text),
        FilterColumn::new("kind", Text),
        FilterColumn::new("code", Text),
        FilterColumn::new("parent_id", Uuid),
        FilterColumn::new("created_at", Timestamp),
    ],
    soft_delete: true,
    default_order: "name",
};

pub static INSTITUTIONS: FilterTable = FilterTable {
    name: "institutions",
    columns: &[
        FilterColumn::new("id", Uuid),
        FilterColumn::new("name", Text),
        FilterColumn::new("acronym", Text),
        FilterColumn::new("place_id", Uuid),
        FilterColumn::new("created_at", Timestamp),
    ],
    soft_delete: true,
    default_order: "name",
};

pub static BOARDS: FilterTable = FilterTable {
    name: "boards",
    columns: &[
        FilterColumn::new("id", Uuid),
        FilterColumn::new("name", Text),
        FilterColumn::new("board_type", Text),
        FilterColumn::new("registration_number", Text),
        FilterColumn::new("resolution_number", Text),
        FilterColumn::new("registered_on", Date),
        FilterColumn::new("status", Text),
        FilterColumn::new("place_id", Uuid),
        FilterColumn::new("institution_id", Uuid),
        FilterColumn::new("period_start", Date),
        FilterColumn::new("period_end", Date),
        FilterColumn::new("created_at", Timestamp),
    ],
    soft_delete: true,
    default_order: "name",
};

pub static COMMISSIONS: FilterTable = FilterTable {
    name: "commissions",
    columns: &[
        FilterColumn::new("id", Uuid),
        FilterColumn::new("board_id", Uuid),
        FilterColumn::new("name", Text),
        FilterColumn::new("created_at", Timestamp),
    ],
    soft_delete: true,
    default_order: "name",
};

pub static OFFICERS: FilterTable = FilterTable {
    name: "officers",
    columns: &[
        FilterColumn::new("id", Uuid),
        FilterColumn::new("board_id", Uuid),
        FilterColumn::new("commission_id", Uuid),
        FilterColumn::new("full_name", Text),
        FilterColumn::new("document_number", Text),
        FilterColumn::new("position", Text),
        FilterColumn::new("active", Bool),
        FilterColumn::new("period_start", Date),
        FilterColumn::new("period_end", Date),
        FilterColumn::new("created_at", Timestamp),
    ],
    soft_delete: true,
    default_order: "full_name",
};

pub static CERTIFICATES: FilterTable = FilterTable {
    name: "certificates",
    columns: &[
        FilterColumn::new("id", Uuid),
        FilterColumn::new("board_id", Uuid),
        FilterColumn::new("kind", Text),
        FilterColumn::new("code", Text),
        FilterColumn::new("issued_by", Uuid),
        FilterColumn::new("issued_at", Timestamp),
        FilterColumn::new("valid_until", Timestamp),
        FilterColumn::new("revoked_at", Timestamp),
    ],
    soft_delete: false,
    default_order: "issued_at",
};
