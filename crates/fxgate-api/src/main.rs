//! FxGate 서버 및 운영 CLI.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::http::StatusCode;
use axum::Router;
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use fxgate_api::auth::{hash_password, validate_password_strength};
use fxgate_api::{create_api_router, start_exchange_rates_collector, AppState, PgStore};
use fxgate_core::{
    init_logging, normalize_email, AppConfig, LogConfig, Role, SystemClock, User, UserRepository,
};

#[derive(Parser)]
#[command(name = "fxgate")]
#[command(about = "FxGate 인증 서버 및 환율 수집기", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// 설정 파일 경로
    #[arg(long, default_value = "config/default.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// HTTP 서버 실행 (설정 시 환율 주기 수집 포함)
    Serve,

    /// 환율 1회 수집
    CollectRates {
        /// 수집 주체 사용자 ID
        #[arg(long)]
        actor: Uuid,
    },

    /// 사용자 생성
    CreateUser {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        /// 역할 (administrator | standard_operator)
        #[arg(long, default_value = "standard_operator")]
        role: String,

        #[arg(long, default_value = "")]
        first_name: String,

        #[arg(long, default_value = "")]
        last_name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config).context("설정 로드 실패")?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("로깅 초기화 실패: {}", e))?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.connection_timeout_secs))
        .connect(&config.database.url)
        .await
        .context("데이터베이스 연결 실패")?;
    info!("데이터베이스 연결 성공");

    let store = Arc::new(PgStore::new(pool, config.auth.access_token_timeout_minutes));

    match cli.command {
        Commands::Serve => serve(store, &config).await,
        Commands::CollectRates { actor } => {
            let state = build_state(store, &config)?;
            let record = state.exchange_rates.run(actor).await?;
            info!(record_id = %record.id, rate = %record.rate, "환율 수집 완료");
            Ok(())
        }
        Commands::CreateUser {
            email,
            password,
            role,
            first_name,
            last_name,
        } => {
            let role = Role::parse(&role)
                .with_context(|| format!("알 수 없는 역할: {}", role))?;
            validate_password_strength(&password).map_err(|e| anyhow::anyhow!(e))?;

            let hash = hash_password(&password)?;
            let user = User::new(&email, hash, role, Utc::now()).with_name(first_name, last_name);
            store.create(&user).await?;

            info!(user_id = %user.id, email = %user.email, role = %user.role, "사용자 생성 완료");
            Ok(())
        }
    }
}

fn build_state(store: Arc<PgStore>, config: &AppConfig) -> anyhow::Result<AppState> {
    let http = reqwest::Client::builder()
        .timeout(config.exchange_rates.request_timeout())
        .build()
        .context("HTTP 클라이언트 생성 실패")?;

    Ok(AppState::from_store(store, config, Arc::new(SystemClock), http))
}

async fn serve(store: Arc<PgStore>, config: &AppConfig) -> anyhow::Result<()> {
    let state = Arc::new(build_state(store.clone(), config)?);
    let shutdown_token = CancellationToken::new();

    let mut collector = None;
    if config.exchange_rates.enabled {
        match resolve_collector_actor(store.as_ref(), config).await {
            Some(actor_id) => {
                collector = Some(start_exchange_rates_collector(
                    state.exchange_rates.clone(),
                    actor_id,
                    config.exchange_rates.interval(),
                    shutdown_token.clone(),
                ));
            }
            None => warn!("환율 수집 주체를 확인할 수 없어 주기 수집을 건너뜁니다"),
        }
    }

    let app = create_app(state, config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("잘못된 서버 주소")?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "서버 시작");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    shutdown_token.cancel();
    if let Some(handle) = collector {
        if let Err(e) = handle.await {
            error!(error = %e, "환율 수집기 비정상 종료");
        }
    }

    info!("서버 종료됨");
    Ok(())
}

fn create_app(state: Arc<AppState>, config: &AppConfig) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_secs),
        ))
}

/// 설정된 이메일로 수집 주체 사용자 ID 조회.
async fn resolve_collector_actor(store: &PgStore, config: &AppConfig) -> Option<Uuid> {
    let email = normalize_email(config.exchange_rates.actor_email.as_deref()?);

    match store.find_by_email(&email).await {
        Ok(Some(user)) => Some(user.id),
        Ok(None) => {
            warn!(email = %email, "환율 수집 주체 사용자가 없습니다");
            None
        }
        Err(e) => {
            error!(error = %e, "환율 수집 주체 조회 실패");
            None
        }
    }
}

/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Ctrl+C 핸들러 설치 실패");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "SIGTERM 핸들러 설치 실패");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Ctrl+C 수신, 종료 시작");
        }
        _ = terminate => {
            warn!("SIGTERM 수신, 종료 시작");
        }
    }

    // 백그라운드 태스크에 종료 전파
    shutdown_token.cancel();
}
