use crate::context::Context;
use crate::facade::DataFacade;
use crate::types::EnvironmentKind;
use crate::wsl::WslDiscoverer;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{OnceCell, watch};
use tracing::{debug, info};

pub type FacadeList = Vec<Arc<DataFacade>>;

/// Finds every environment whose config can be read from here.
///
/// Concurrent callers of [`Discovery::discover_all`] share a single pass.
/// Every finished pass publishes the full facade list to subscribers.
pub struct Discovery {
    ctx: Context,
    current: Mutex<Arc<OnceCell<FacadeList>>>,
    tx: watch::Sender<FacadeList>,
}

impl Discovery {
    pub fn new(ctx: Context) -> Self {
        let (tx, _) = watch::channel(Vec::new());
        Self {
            ctx,
            current: Mutex::new(Arc::new(OnceCell::new())),
            tx,
        }
    }

    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Receives the facade list after every discovery pass
    pub fn subscribe(&self) -> watch::Receiver<FacadeList> {
        self.tx.subscribe()
    }

    /// Last published list, without running discovery
    pub fn facades(&self) -> FacadeList {
        self.tx.borrow().clone()
    }

    /// Result of the current discovery pass, running it if nobody has yet
    pub async fn discover_all(&self) -> FacadeList {
        let cell = self.current_cell();
        cell.get_or_init(|| async {
            let facades = self.run_discovery().await;
            self.publish(&cell, &facades);
            facades
        })
        .await
        .clone()
    }

    /// Forget the previous pass and discover again. Facades from earlier
    /// passes are not updated; callers should use the new list.
    pub async fn refresh(&self) -> FacadeList {
        *self.lock_current() = Arc::new(OnceCell::new());
        self.discover_all().await
    }

    async fn run_discovery(&self) -> FacadeList {
        let mut facades = Vec::new();

        let native = DataFacade::native(&self.ctx);
        if native.is_accessible().await {
            facades.push(Arc::new(native));
        } else {
            debug!(path = native.config_path(), "Native config not accessible, skipping");
        }

        match self.ctx.env.kind() {
            EnvironmentKind::Windows => {
                let discoverer = WslDiscoverer::new(self.ctx.clone());
                facades.extend(discoverer.discover_facades().await);
            }
            EnvironmentKind::Wsl => {
                if let Some(host) = DataFacade::windows_host_auto(&self.ctx).await {
                    if host.is_accessible().await {
                        facades.push(Arc::new(host));
                    } else {
                        debug!(path = host.config_path(), "Windows config not accessible, skipping");
                    }
                }
            }
            EnvironmentKind::MacOs | EnvironmentKind::Linux => {}
        }

        info!(
            count = facades.len(),
            environments = ?facades.iter().map(|f| f.environment_info().label()).collect::<Vec<_>>(),
            "Discovery finished"
        );
        facades
    }

    /// Publish unless a refresh already replaced this pass
    fn publish(&self, cell: &Arc<OnceCell<FacadeList>>, facades: &FacadeList) {
        let current = self.lock_current();
        if Arc::ptr_eq(&*current, cell) {
            self.tx.send_replace(facades.clone());
        }
    }

    fn current_cell(&self) -> Arc<OnceCell<FacadeList>> {
        Arc::clone(&*self.lock_current())
    }

    fn lock_current(&self) -> MutexGuard<'_, Arc<OnceCell<FacadeList>>> {
        self.current.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for Discovery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Discovery")
            .field("ctx", &self.ctx)
            .finish_non_exhaustive()
    }
}
