//! UseCase: クライアント接続処理
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - ConnectClientUseCase::execute() メソッド
//!
//! ### なぜこのテストが必要か
//! - ハンドシェイク完了後の接続がレジストリに登録されることを保証
//! - 同じ接続が二重に登録されないことを保証
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規接続の登録
//! - 異常系：同じ ID の接続の再登録

use std::sync::Arc;

use crate::domain::{Connection, ConnectionRepository};

use super::error::ConnectError;

/// クライアント接続のユースケース
pub struct ConnectClientUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn ConnectionRepository>,
}

impl ConnectClientUseCase {
    /// 新しい ConnectClientUseCase を作成
    pub fn new(repository: Arc<dyn ConnectionRepository>) -> Self {
        Self { repository }
    }

    /// 接続を登録する
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - 登録後のレジストリ件数
    /// * `Err(ConnectError)` - 同じ ID が既に登録済み
    pub async fn execute(&self, connection: Connection) -> Result<usize, ConnectError> {
        let id = connection.id;
        if !self.repository.add(connection).await {
            return Err(ConnectError::DuplicateConnection(id));
        }
        Ok(self.repository.count().await)
    }
}
