//! services/scheduler_service.rs
//! Dispara el `RelayWorker` en cada tick de `0 */N * * *` (UTC).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;

use crate::services::relay_service::RelayWorker;
use crate::utils::schedule::delay_until;

pub struct RelayScheduler {
    worker: Arc<RelayWorker>,
    shutdown_tx: broadcast::Sender<()>,
    is_running: Arc<AtomicBool>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl RelayScheduler {
    pub fn new(worker: Arc<RelayWorker>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            worker,
            shutdown_tx,
            is_running: Arc::new(AtomicBool::new(false)),
            handle: Mutex::new(None),
        }
    }

    /// Lanza el loop en una task de tokio. Devuelve `false` si ya estaba corriendo.
    pub async fn start(&self) -> bool {
        if self
            .is_running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("(relay_scheduler) El scheduler ya estaba iniciado");
            return false;
        }

        let config = self.worker.config();
        log::info!(
            "(relay_scheduler) Iniciando scheduler: cada {}h, run_on_start={}",
            config.interval_hours,
            config.run_on_start
        );

        // suscribir antes del spawn para no perder un stop temprano
        let shutdown_rx = self.shutdown_tx.subscribe();
        let worker = self.worker.clone();
        let handle = tokio::spawn(scheduler_loop(worker, shutdown_rx));

        *self.handle.lock().await = Some(handle);
        true
    }

    /// Detiene el loop. Una corrida en curso termina antes de salir.
    pub async fn stop(&self) {
        if !self.is_running.swap(false, Ordering::SeqCst) {
            log::warn!("(relay_scheduler) El scheduler no estaba corriendo");
            return;
        }

        log::info!("(relay_scheduler) Deteniendo scheduler...");
        let _ = self.shutdown_tx.send(());

        if let Some(handle) = self.handle.lock().await.take() {
            if let Err(e) = handle.await {
                log::error!("(relay_scheduler) La task del scheduler terminó con error: {:?}", e);
            }
        }
        log::info!("(relay_scheduler) Scheduler detenido.");
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::SeqCst)
    }
}

async fn scheduler_loop(worker: Arc<RelayWorker>, mut shutdown_rx: broadcast::Receiver<()>) {
    if worker.config().run_on_start {
        run_and_log(&worker).await;
    }

    loop {
        let now = Utc::now();
        let Some(next) = worker.config().schedule.upcoming(Utc).next() else {
            log::error!("(relay_scheduler) El calendario no tiene próximas corridas");
            break;
        };
        log::info!(
            "(relay_scheduler) Próxima corrida programada para {}",
            next.to_rfc3339()
        );

        tokio::select! {
            _ = tokio::time::sleep(delay_until(now, next)) => {
                run_and_log(&worker).await;
            }
            _ = shutdown_rx.recv() => {
                break;
            }
        }
    }

    log::info!("(relay_scheduler) Loop del scheduler finalizado");
}

/// Ningún error de una corrida tumba el scheduler.
async fn run_and_log(worker: &RelayWorker) {
    match worker.run_once().await {
        Ok(report) => log::info!("(relay_scheduler) Corrida finalizada: {:?}", report),
        Err(e) => log::error!("(relay_scheduler) Error interno del worker: {:?}", e),
    }
}
