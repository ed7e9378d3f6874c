//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use backend::{
    build_router,
    config::{connect, AppConfig, AppState, Stores},
    tasks::revocation_sweeper::spawn_revocation_sweeper,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Inicializa o logger (RUST_LOG, padrão "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar
    let config = AppConfig::from_env()?;
    let pool = connect(&config).await?;

    // Faz o app rodar as migrações do SQLx na inicialização
    sqlx::migrate!().run(&pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let bind_addr = config.bind_addr.clone();
    let sweep_every = config.revocation_sweep_every();
    let app_state = AppState::new(config, Stores::postgres(pool));

    spawn_revocation_sweeper(app_state.revocation_service.clone(), sweep_every);

    let app = build_router(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
