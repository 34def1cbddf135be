use crate::api::Source;
use crate::config::ScanSettings;
use crate::error::Result;
use crate::extract::extract_tokens;
use crate::notifier::{notify, Notifier};
use crate::schedule::Schedule;
use crate::storage::SeenStore;
use crate::types::TokenSet;
use chrono::Local;
use log::{debug, error, info};
use std::sync::Arc;
use tokio::time::Instant;

/// 一轮扫描的结果
#[derive(Debug, Clone, Default)]
pub struct CycleReport {
    pub posts_fetched: usize,
    pub candidates: usize,
    pub new_tokens: TokenSet,
    pub notified: bool,
}

pub struct CodeScanner {
    source: Arc<dyn Source>,
    store: Arc<dyn SeenStore>,
    notifier: Arc<dyn Notifier>,
    settings: ScanSettings,
}

impl CodeScanner {
    pub fn new(
        source: Arc<dyn Source>,
        store: Arc<dyn SeenStore>,
        notifier: Arc<dyn Notifier>,
        settings: ScanSettings,
    ) -> Self {
        Self {
            source,
            store,
            notifier,
            settings,
        }
    }

    /// 按计划持续扫描，不会主动退出
    ///
    /// 单轮出错（存储失败）只记录日志，等待下一轮。
    pub async fn start_scanning(&self, mut schedule: Schedule) -> Result<()> {
        info!("开始扫描 r/{}，扫描间隔: {:?}", self.settings.scope, schedule.interval());

        loop {
            schedule.wait_until_due().await;

            match self.run_cycle().await {
                Ok(report) => {
                    debug!(
                        "本轮扫描完成: {} 条帖子, {} 个候选, {} 个新邀请码",
                        report.posts_fetched,
                        report.candidates,
                        report.new_tokens.len()
                    );
                }
                Err(e) => {
                    error!("扫描错误: {}", e);
                }
            }

            schedule.mark_completed(Instant::now());
            if let Ok(wait) = chrono::Duration::from_std(schedule.interval()) {
                info!("下次扫描时间: {}", (Local::now() + wait).format("%Y-%m-%d %H:%M:%S"));
            }
        }
    }

    /// 执行一轮：加载已见集合 → 搜索 → 提取 → 求差集 → 持久化 → 推送
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        info!("检查 Reddit 上的新邀请码...");

        let seen = self.store.load().await?;

        let posts = match self
            .source
            .search(&self.settings.scope, &self.settings.query, self.settings.limit)
            .await
        {
            Ok(posts) => posts,
            Err(e) => {
                error!("Reddit 抓取失败: {}", e);
                Vec::new()
            }
        };

        let mut candidates = TokenSet::new();
        for post in &posts {
            candidates.extend(extract_tokens(&post.title));
            candidates.extend(extract_tokens(&post.body));
        }

        let new_tokens: TokenSet = candidates.difference(&seen).cloned().collect();

        let mut report = CycleReport {
            posts_fetched: posts.len(),
            candidates: candidates.len(),
            new_tokens,
            notified: false,
        };

        if report.new_tokens.is_empty() {
            info!("没有发现新邀请码");
            return Ok(report);
        }

        info!("发现 {} 个新邀请码: {:?}", report.new_tokens.len(), report.new_tokens);
        self.store.append(&report.new_tokens).await?;
        report.notified = notify(self.notifier.as_ref(), &self.settings.header, &report.new_tokens).await;

        Ok(report)
    }
}
