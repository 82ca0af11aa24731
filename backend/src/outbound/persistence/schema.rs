//! Diesel table definitions for container storage.
//!
//! Expected DDL:
//!
//! ```sql
//! CREATE TABLE containers (
//!     code            VARCHAR(64) PRIMARY KEY,
//!     collaborator_id BIGINT      NOT NULL,
//!     fridge_id       BIGINT      NOT NULL,
//!     status          VARCHAR(16) NOT NULL,
//!     prepared_at     TIMESTAMPTZ NOT NULL
//! );
//! CREATE INDEX containers_collaborator_prepared_at
//!     ON containers (collaborator_id, prepared_at);
//! ```

diesel::table! {
    containers (code) {
        code -> Varchar,
        collaborator_id -> Int8,
        fridge_id -> Int8,
        status -> Varchar,
        prepared_at -> Timestamptz,
    }
}
