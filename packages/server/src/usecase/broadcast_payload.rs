//! UseCase: ペイロードのブロードキャスト処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - BroadcastPayloadUseCase::execute() メソッド
//! - 全接続への配信と、閉じた接続・送信に失敗した接続の evict
//!
//! ### なぜこのテストが必要か
//! - 1 つの接続の失敗が他の接続への配信を妨げないことを保証
//! - 失敗した接続が次のブロードキャストまでに必ず削除されることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：全接続への配信
//! - エッジケース：接続ゼロ（no-op）
//! - 異常系：一部の接続が閉じている

use std::sync::Arc;

use crate::domain::{ConnectionRepository, Payload};

/// Outcome of one broadcast call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections the payload was queued for
    pub delivered: usize,
    /// Connections removed because they were closed or refused the payload
    pub evicted: usize,
}

/// ブロードキャストのユースケース
pub struct BroadcastPayloadUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ConnectionRepository>,
}

impl BroadcastPayloadUseCase {
    /// 新しい BroadcastPayloadUseCase を作成
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    /// 登録済みの全接続へペイロードを送る
    ///
    /// 配信はベストエフォートで、各接続に高々 1 回。閉じている接続や送信に
    /// 失敗した接続は、このメソッドが返る前に evict される。
    pub async fn execute(&self, payload: Payload) -> BroadcastReport {
        let connections = self.repository.snapshot().await;
        if connections.is_empty() {
            tracing::debug!("No clients connected, dropping {} byte payload", payload.len());
            return BroadcastReport::default();
        }

        let mut delivered = 0;
        let mut dead = Vec::new();
        for connection in &connections {
            if !connection.is_open() {
                dead.push(connection.id);
                continue;
            }
            match connection.send(payload.clone()) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::error!("Failed to send payload to client {}: {}", connection.id, e);
                    dead.push(connection.id);
                }
            }
        }

        let evicted = if dead.is_empty() {
            0
        } else {
            let evicted = self.repository.remove_many(&dead).await;
            tracing::debug!("Evicted {} dead client(s)", evicted);
            evicted
        };
        tracing::debug!(
            "Broadcast {} byte payload to {} client(s)",
            payload.len(),
            delivered
        );

        BroadcastReport { delivered, evicted }
    }
}
