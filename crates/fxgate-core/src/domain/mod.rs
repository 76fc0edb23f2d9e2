//! 도메인 모델.

pub mod exchange_rate;
pub mod token;
pub mod user;

pub use exchange_rate::ExchangeRatesRecord;
pub use token::RefreshToken;
pub use user::{normalize_email, Capability, Credentials, PublicUser, Role, User};
