//! Repository pattern for database operations.
//!
//! `fxgate-core`의 저장소 trait들에 대한 PostgreSQL 구현을 제공합니다.

pub mod postgres;

pub use postgres::{PgStore, ACCESS_TOKEN_TIMEOUT_KEY};
