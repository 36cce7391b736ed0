//! RadishBuilder - 構築とワイヤリング
//!
//! # 役割
//! - Config の検証（Fail-fast）
//! - Task の登録、期待集合のチェック
//! - Metrics / IdGenerator の差し替え
//! - 設定された数の worker を起動

use std::sync::Arc;

use tracing::info;

use crate::app::radish::{Radish, Shared};
use crate::config::Config;
use crate::error::{ErrorCode, RadishError};
use crate::impls::InMemoryMetrics;
use crate::ports::{IdGenerator, Metrics, NoopMetrics, RandomIdGenerator};
use crate::task::Task;

/// RadishBuilder は Radish を構築
///
/// # 使用例
/// ```ignore
/// let radish = Radish::builder(Config::default())
///     .register(Arc::new(EmailTask))
///     .expect_tasks(&["email"])
///     .build()
///     .await?;
/// ```
///
/// # Fail-fast 設計
/// - build() 時に Config を検証する
/// - 重複登録は build() で `TaskAlreadyRegistered`
/// - expect_tasks() の中に未登録のものがあれば `TaskNotRegistered`
pub struct RadishBuilder {
    config: Config,
    tasks: Vec<Arc<dyn Task>>,
    expected_tasks: Option<Vec<String>>,
    metrics: Option<Arc<dyn Metrics>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl RadishBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            tasks: Vec::new(),
            expected_tasks: None,
            metrics: None,
            ids: None,
        }
    }

    /// Task を登録（検証は build() 時）
    pub fn register(mut self, task: Arc<dyn Task>) -> Self {
        self.tasks.push(task);
        self
    }

    /// Metrics の送り先を差し替える
    ///
    /// 未指定なら `InMemoryMetrics`、`suppress_metrics` なら `NoopMetrics`。
    /// 明示的に渡したものは `suppress_metrics` より優先。
    pub fn metrics(mut self, metrics: Arc<dyn Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    /// build() 時に登録済みであるべき task 名
    pub fn expect_tasks(mut self, names: &[&str]) -> Self {
        self.expected_tasks = Some(names.iter().map(|name| name.to_string()).collect());
        self
    }

    pub async fn build(self) -> Result<Radish, RadishError> {
        let settings = self.config.validate()?;

        let metrics = match self.metrics {
            Some(metrics) => metrics,
            None if settings.suppress_metrics => Arc::new(NoopMetrics),
            None => Arc::new(InMemoryMetrics::new()),
        };
        let ids = match self.ids {
            Some(ids) => ids,
            None => Arc::new(RandomIdGenerator),
        };

        let shared = Shared::new(&settings, metrics, ids);
        for task in self.tasks {
            shared.registry.register(task)?;
        }

        if let Some(expected_tasks) = &self.expected_tasks {
            let missing_tasks: Vec<&str> = expected_tasks
                .iter()
                .filter(|name| !shared.registry.contains(name))
                .map(String::as_str)
                .collect();
            if !missing_tasks.is_empty() {
                return Err(RadishError::new(
                    ErrorCode::TaskNotRegistered,
                    format!(
                        "missing tasks {missing_tasks:?}, these were expected but not registered"
                    ),
                ));
            }
        }

        let workers = settings.workers;
        info!(
            workers,
            queue_size = settings.queue_size,
            log_level = %settings.log_level,
            tasks = shared.registry.len(),
            "starting radish"
        );

        let radish = Radish::from_parts(settings, shared);
        radish.add_workers(workers as i64).await?;
        Ok(radish)
    }
}
