//! services/relay_service.rs
//! Worker que toma candidatos PENDING/FAILED, los envía en batch a la API
//! externa y reconcilia el estado de cada uno con la respuesta.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{anyhow, Context, Result};
use reqwest::Client;

use crate::config::app_config::RelayConfig;
use crate::models::relay_model::{
    RelayOutcome, RelayPayloadItem, RelayResponse, RelayRunReport, RunOutcome,
};
use crate::services::candidate_service::CandidateService;

pub struct RelayWorker {
    candidate_service: CandidateService,
    http_client: Client,
    config: RelayConfig,
    in_progress: AtomicBool,
}

impl RelayWorker {
    pub fn new(candidate_service: CandidateService, config: RelayConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("No se pudo construir el cliente HTTP del worker")?;
        Ok(Self::with_client(candidate_service, http_client, config))
    }

    pub fn with_client(
        candidate_service: CandidateService,
        http_client: Client,
        config: RelayConfig,
    ) -> Self {
        Self {
            candidate_service,
            http_client,
            config,
            in_progress: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Una corrida completa: seleccionar, enviar, reconciliar.
    /// Si otra corrida sigue en curso, vuelve sin tocar la DB.
    pub async fn run_once(&self) -> Result<RelayRunReport> {
        let Some(_guard) = RunGuard::acquire(&self.in_progress) else {
            log::warn!("(run_once) Ya hay una corrida en curso, se omite este tick.");
            return Ok(RelayRunReport::empty(RunOutcome::AlreadyRunning));
        };

        log::info!("(run_once) Iniciando worker de procesamiento de candidatos...");

        // 1) Seleccionar batch
        let candidates = self
            .candidate_service
            .find_eligible(self.config.batch_size)
            .await?;

        if candidates.is_empty() {
            log::info!("(run_once) No hay candidatos para procesar.");
            return Ok(RelayRunReport::empty(RunOutcome::Idle));
        }

        let ids: Vec<i64> = candidates.iter().map(|c| c.id).collect();
        log::info!(
            "(run_once) Procesando batch de {} candidatos: {:?}",
            ids.len(),
            ids
        );

        // 2) Armar payload
        let payload: Vec<RelayPayloadItem> =
            candidates.iter().map(RelayPayloadItem::from).collect();

        self.candidate_service.record_attempts(&ids).await?;

        // 3) Enviar
        match self.submit_batch(&payload).await {
            Ok(outcomes) => self.apply_outcomes(&ids, &outcomes).await,
            Err(e) => {
                // 4) Sin respuesta utilizable: no sabemos qué procesó el servidor
                log::error!(
                    "(run_once) Falló el request del batch, marcando {} candidatos FAILED: {:?}",
                    ids.len(),
                    e
                );
                let failed = self.candidate_service.mark_failed_bulk(&ids).await?;
                Ok(RelayRunReport {
                    outcome: RunOutcome::TransportFailed,
                    selected: ids.len(),
                    succeeded: 0,
                    failed: failed as usize,
                    skipped: 0,
                })
            }
        }
    }

    /// POST del batch. Error = transporte (conexión, timeout o status no 2xx).
    async fn submit_batch(&self, payload: &[RelayPayloadItem]) -> Result<Vec<RelayOutcome>> {
        let resp = self
            .http_client
            .post(&self.config.external_api_url)
            .json(payload)
            .send()
            .await
            .context("Fallo al hacer POST del batch")?;

        let status = resp.status();
        log::info!("(submit_batch) Status code de la respuesta={}", status);

        if !status.is_success() {
            let body_txt = resp.text().await.unwrap_or_default();
            log::error!(
                "(submit_batch) La respuesta NO es exitosa. body_txt='{}'",
                body_txt
            );
            return Err(anyhow!("La API externa respondió {}: {}", status, body_txt));
        }

        let body = resp
            .text()
            .await
            .context("No se pudo leer el body de la respuesta")?;

        match RelayResponse::parse(&body) {
            Some(response) => Ok(response.into_outcomes()),
            None => {
                log::warn!(
                    "(submit_batch) Respuesta sin JSON interpretable, nada que reconciliar: '{}'",
                    body
                );
                Ok(vec![])
            }
        }
    }

    /// Aplica los resultados de la API sobre el batch seleccionado.
    /// Solo un SUCCESS con id del batch escribe; el resto queda como estaba
    /// y se reintenta en la próxima corrida.
    pub async fn apply_outcomes(
        &self,
        batch_ids: &[i64],
        outcomes: &[RelayOutcome],
    ) -> Result<RelayRunReport> {
        let batch: HashSet<i64> = batch_ids.iter().copied().collect();
        let mut report = RelayRunReport {
            outcome: RunOutcome::Relayed,
            selected: batch_ids.len(),
            succeeded: 0,
            failed: 0,
            skipped: 0,
        };

        for outcome in outcomes {
            let Some(id) = outcome.record_id else {
                log::warn!(
                    "(apply_outcomes) Resultado sin id, se ignora. Status: {:?}",
                    outcome.raw_status
                );
                report.skipped += 1;
                continue;
            };

            if !batch.contains(&id) {
                log::warn!(
                    "(apply_outcomes) Resultado para id={} que no está en el batch, se ignora.",
                    id
                );
                report.skipped += 1;
                continue;
            }

            if outcome.succeeded {
                let changed = self.candidate_service.mark_success(id, id).await?;
                if changed == 0 {
                    log::info!("(apply_outcomes) Candidato {} ya estaba SUCCESS.", id);
                } else {
                    log::info!("(apply_outcomes) Candidato {} marcado SUCCESS.", id);
                }
                report.succeeded += 1;
            } else {
                log::warn!(
                    "(apply_outcomes) Candidato {} falló o sigue pendiente. Status: {:?}",
                    id,
                    outcome.raw_status
                );
                report.skipped += 1;
            }
        }

        log::info!(
            "(apply_outcomes) Batch reconciliado: selected={} succeeded={} skipped={}",
            report.selected,
            report.succeeded,
            report.skipped
        );
        Ok(report)
    }
}

/// Flag de "corrida en curso"; se libera al salir de `run_once` por cualquier camino.
pub(crate) struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| RunGuard { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
impl RelayWorker {
    /// Simula una corrida en curso para probar el guard.
    pub(crate) fn hold_run_flag(&self) -> RunGuard<'_> {
        RunGuard::acquire(&self.in_progress).expect("el flag ya estaba tomado")
    }
}
