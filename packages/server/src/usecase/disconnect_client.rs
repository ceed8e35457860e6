//! UseCase: クライアント切断処理
//!
//! 接続が終わる経路（クライアントの close、ネットワーク切断、送受信エラー）は
//! すべてこの 1 つの削除処理を通る。
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectClientUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - close とエラーの両方が届いても削除が一度だけ行われることを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：登録済み接続の切断
//! - エッジケース：既に削除済みの接続の切断（冪等）

use std::{fmt, sync::Arc};

use crate::domain::{ConnectionId, ConnectionRepository};

/// Why a connection left the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisconnectReason {
    /// Close frame from the consumer or end of stream
    Closed,
    /// Transport-level error on the socket
    Error(String),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::Closed => write!(f, "closed"),
            DisconnectReason::Error(e) => write!(f, "error: {e}"),
        }
    }
}

/// クライアント切断のユースケース
pub struct DisconnectClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ConnectionRepository>,
}

impl DisconnectClientUseCase {
    /// 新しい DisconnectClientUseCase を作成
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    /// 接続をレジストリから削除する
    ///
    /// # Returns
    ///
    /// * `Some(usize)` - 削除後のレジストリ件数
    /// * `None` - 既に削除済み（broadcast による evict など）
    pub async fn execute(&self, id: &ConnectionId, reason: &DisconnectReason) -> Option<usize> {
        self.repository.remove(id).await?;
        let remaining = self.repository.count().await;

        match reason {
            DisconnectReason::Closed => {
                tracing::debug!("Client {} disconnected, {} client(s) connected", id, remaining);
            }
            DisconnectReason::Error(e) => {
                tracing::error!(
                    "Client {} failed ({}), removed, {} client(s) connected",
                    id,
                    e,
                    remaining
                );
            }
        }

        Some(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Connection, ConnectionIdFactory, MockConnectionRepository, Timestamp},
        infrastructure::repository::InMemoryConnectionRepository,
    };
    use mockall::predicate::eq;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_disconnect_client_success() {
        // テスト項目: 登録済みの接続が削除され、残りの件数が返される
        // given (前提条件):
        let repository = Arc::new(InMemoryConnectionRepository::new());
        let usecase = DisconnectClientUseCase::new(repository.clone());
        let mut receivers = Vec::new();
        let mut ids = Vec::new();
        for _ in 0..3 {
            let (tx, rx) = mpsc::unbounded_channel();
            let connection = Connection::new(
                ConnectionIdFactory::generate(),
                "127.0.0.1:40000".parse().unwrap(),
                Timestamp::new(0),
                tx,
            );
            ids.push(connection.id);
            receivers.push(rx);
            repository.add(connection).await;
        }

        // when (操作):
        let result = usecase.execute(&ids[0], &DisconnectReason::Closed).await;

        // then (期待する結果):
        assert_eq!(result, Some(2));
        assert_eq!(repository.count().await, 2);
    }

    #[tokio::test]
    async fn test_disconnect_client_error_then_close_is_idempotent() {
        // テスト項目: エラーの後に close が届いても 2 回目は何もしない
        // given (前提条件):
        let repository = Arc::new(InMemoryConnectionRepository::new());
        let usecase = DisconnectClientUseCase::new(repository.clone());
        let (tx, _rx) = mpsc::unbounded_channel();
        let connection = Connection::new(
            ConnectionIdFactory::generate(),
            "127.0.0.1:40000".parse().unwrap(),
            Timestamp::new(0),
            tx,
        );
        let id = connection.id;
        repository.add(connection).await;

        // when (操作):
        let on_error = usecase
            .execute(&id, &DisconnectReason::Error("connection reset".to_string()))
            .await;
        let on_close = usecase.execute(&id, &DisconnectReason::Closed).await;

        // then (期待する結果):
        assert_eq!(on_error, Some(0));
        assert_eq!(on_close, None);
    }

    #[tokio::test]
    async fn test_disconnect_unknown_client_skips_count() {
        // テスト項目: 未登録の接続では件数を問い合わせない
        // given (前提条件):
        let id = ConnectionIdFactory::generate();
        let mut repository = MockConnectionRepository::new();
        repository
            .expect_remove()
            .with(eq(id))
            .times(1)
            .returning(|_| None);
        repository.expect_count().never();
        let usecase = DisconnectClientUseCase::new(Arc::new(repository));

        // when (操作):
        let result = usecase.execute(&id, &DisconnectReason::Closed).await;

        // then (期待する結果):
        assert_eq!(result, None);
    }
}
