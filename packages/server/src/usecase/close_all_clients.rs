//! UseCase: シャットダウン時の全接続クローズ

use std::sync::Arc;

use crate::domain::ConnectionRepository;

/// 全接続クローズのユースケース
pub struct CloseAllClientsUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ConnectionRepository>,
}

impl CloseAllClientsUseCase {
    /// 新しい CloseAllClientsUseCase を作成
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    /// レジストリを空にし、各接続に close を要求する
    ///
    /// close の失敗は無視する。取り出した接続数を返す。
    pub async fn execute(&self) -> usize {
        let connections = self.repository.drain().await;
        for connection in &connections {
            if connection.close().is_err() {
                tracing::debug!("Client {} was already closed", connection.id);
            }
        }
        connections.len()
    }
}
