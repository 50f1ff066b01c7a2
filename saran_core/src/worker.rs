//! `worker`：在交互线程之外执行过滤。
//!
//! 约定：
//! - 每个请求带 `generation`；控制器只接受最新一代的结果
//! - 每个请求带一个取消令牌；新请求或重新绑定输入框会取消旧请求
//! - 结果通过 channel 送回交互线程，由宿主交给 `Session::deliver`

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{
    runtime::{Builder, Runtime},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::{
    filter::{Filter, PrefixFilter},
    model::FieldId,
    vocabulary::Vocabulary,
};

/// 单调递增的请求代数，从 1 开始。
#[derive(Debug, Default, Clone)]
pub struct GenerationClock {
    next: Arc<AtomicU64>,
}

impl GenerationClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::AcqRel).wrapping_add(1)
    }
}

/// 一次过滤请求（词表快照 + token + 上限）。
#[derive(Debug, Clone)]
pub struct FilterRequest {
    pub field: FieldId,
    pub generation: u64,
    pub token: String,
    pub vocabulary: Vocabulary,
    pub limit: usize,
    /// 执行前的等待时间；等待期间被取消则不执行
    pub debounce: Duration,
    cancel: CancellationToken,
}

/// 过滤结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterResponse {
    pub field: FieldId,
    pub generation: u64,
    pub candidates: Vec<String>,
}

impl FilterRequest {
    pub fn new(
        field: FieldId,
        generation: u64,
        token: impl Into<String>,
        vocabulary: Vocabulary,
        limit: usize,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            field,
            generation,
            token: token.into(),
            vocabulary,
            limit,
            debounce: Duration::ZERO,
            cancel,
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// 同步执行过滤；已取消时返回 None。
    pub fn run(&self) -> Option<FilterResponse> {
        if self.is_cancelled() {
            return None;
        }
        let candidates = PrefixFilter { limit: self.limit }.apply(&self.vocabulary, &self.token);
        // 过滤期间可能被取消，结果已无意义
        if self.is_cancelled() {
            return None;
        }
        Some(FilterResponse {
            field: self.field,
            generation: self.generation,
            candidates,
        })
    }
}

/// 交互线程持有的结果接收端。
pub type FilterResults = mpsc::UnboundedReceiver<FilterResponse>;

/// 过滤 worker：一个单工作线程的 tokio runtime。
pub struct FilterWorker {
    runtime: Option<Runtime>,
    results: mpsc::UnboundedSender<FilterResponse>,
}

impl FilterWorker {
    /// 启动 worker，返回 worker 与结果接收端（交互线程持有接收端）。
    pub fn spawn() -> io::Result<(Self, FilterResults)> {
        let runtime = Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("saran-filter")
            .enable_time()
            .build()?;
        let (tx, rx) = mpsc::unbounded_channel();
        Ok((
            Self {
                runtime: Some(runtime),
                results: tx,
            },
            rx,
        ))
    }

    pub fn submit(&self, request: FilterRequest) {
        let Some(runtime) = &self.runtime else {
            return;
        };
        let tx = self.results.clone();
        runtime.spawn(async move {
            if !request.debounce.is_zero() {
                tokio::select! {
                    _ = request.cancel_token().cancelled() => {
                        trace!(generation = request.generation, "filter request cancelled during debounce");
                        return;
                    }
                    _ = tokio::time::sleep(request.debounce) => {}
                }
            }
            let Some(response) = request.run() else {
                trace!(generation = request.generation, "filter request cancelled");
                return;
            };
            if tx.send(response).is_err() {
                trace!("filter result receiver dropped");
            }
        });
    }
}

impl Drop for FilterWorker {
    fn drop(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn request(generation: u64, token: &str, cancel: CancellationToken) -> FilterRequest {
        let vocabulary: Vocabulary = ["Bandung", "Ban", "Banten", "Bogor"].into_iter().collect();
        FilterRequest::new(FieldId(1), generation, token, vocabulary, 5, cancel)
    }

    #[test]
    fn generations_are_monotonic() {
        let clock = GenerationClock::new();
        assert_eq!(clock.next(), 1);
        assert_eq!(clock.clone().next(), 2);
        assert_eq!(clock.next(), 3);
    }

    #[test]
    fn run_filters_vocabulary() {
        let response = request(3, "ban", CancellationToken::new()).run().unwrap();
        assert_eq!(response.generation, 3);
        assert_eq!(response.candidates, ["Ban", "Banten", "Bandung"]);
    }

    #[test]
    fn cancelled_request_yields_nothing() {
        let cancel = CancellationToken::new();
        let req = request(1, "ban", cancel.child_token());
        cancel.cancel();
        assert!(req.is_cancelled());
        assert_eq!(req.run(), None);
    }

    #[test]
    fn worker_delivers_latest_request_only() {
        let (worker, mut rx) = FilterWorker::spawn().unwrap();

        let stale = CancellationToken::new();
        worker.submit(request(1, "b", stale.clone()).with_debounce(Duration::from_millis(50)));
        stale.cancel();
        worker.submit(request(2, "bo", CancellationToken::new()));

        let response = rx.blocking_recv().unwrap();
        assert_eq!(response.generation, 2);
        assert_eq!(response.candidates, ["Bogor"]);
    }
}
