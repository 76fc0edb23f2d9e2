//! 백그라운드 태스크 모듈.
//!
//! - 환율 수집: 공개 환율 제공자에서 설정된 통화의 환율을 주기적으로 저장

pub mod exchange_rates;

pub use exchange_rates::{extract_rate, start_exchange_rates_collector, ExchangeRatesTask};
