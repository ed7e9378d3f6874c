// src/tasks/revocation_sweeper.rs

use std::time::Duration;

use tokio::task::JoinHandle;

use crate::services::revocation_service::RevocationService;

/// Varredura periódica do ledger de revogação. Falhas só geram log; a próxima rodada tenta de novo.
pub fn spawn_revocation_sweeper(service: RevocationService, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // O primeiro tick é imediato
        interval.tick().await;

        loop {
            interval.tick().await;
            match service.purge_expired().await {
                Ok(0) => tracing::debug!("Varredura de revogações: nada a remover"),
                Ok(removed) => tracing::info!(removed, "Varredura de revogações concluída"),
                Err(e) => tracing::warn!("Falha na varredura de revogações: {}", e),
            }
        }
    })
}
