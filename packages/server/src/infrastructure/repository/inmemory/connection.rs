//! InMemory Connection Repository 実装
//!
//! ドメイン層が定義する ConnectionRepository trait の具体的な実装。
//! HashMap を 1 つの Mutex で保護し、接続レジストリとして使用します。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Connection, ConnectionId, ConnectionRepository};

/// インメモリ Connection Repository 実装
///
/// マップ全体を 1 つのロックで保護する。ブロードキャストはスナップショットを
/// 走査するため、送信中にロックを保持することはない。
#[derive(Default)]
pub struct InMemoryConnectionRepository {
    /// 接続中のクライアント（writer チャンネルを含む）
    connections: Arc<Mutex<HashMap<ConnectionId, Connection>>>,
}

impl InMemoryConnectionRepository {
    /// 新しい InMemoryConnectionRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRepository for InMemoryConnectionRepository {
    async fn add(&self, connection: Connection) -> bool {
        let mut connections = self.connections.lock().await;
        if connections.contains_key(&connection.id) {
            return false;
        }
        connections.insert(connection.id, connection);
        true
    }

    async fn remove(&self, id: &ConnectionId) -> Option<Connection> {
        let mut connections = self.connections.lock().await;
        connections.remove(id)
    }

    async fn remove_many(&self, ids: &[ConnectionId]) -> usize {
        let mut connections = self.connections.lock().await;
        ids.iter()
            .filter(|id| connections.remove(*id).is_some())
            .count()
    }

    async fn count(&self) -> usize {
        let connections = self.connections.lock().await;
        connections.len()
    }

    async fn snapshot(&self) -> Vec<Connection> {
        let connections = self.connections.lock().await;
        connections.values().cloned().collect()
    }

    async fn drain(&self) -> Vec<Connection> {
        let mut connections = self.connections.lock().await;
        connections.drain().map(|(_, connection)| connection).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionIdFactory, Outbound, Timestamp};
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryConnectionRepository の追加・削除・件数・スナップショット
    //
    // 【なぜこのテストが必要か】
    // - Acceptor と Broadcaster が共有する唯一の可変状態
    // - 重複登録や削除漏れがあると配信先がずれる
    //
    // 【どのようなシナリオをテストするか】
    // 1. 追加と件数
    // 2. 同じ ID の再登録は no-op
    // 3. 削除は冪等
    // 4. 一括削除
    // 5. スナップショット取得後の変更がスナップショットに影響しない
    // 6. drain で全件取り出し
    // ========================================

    fn create_connection() -> (Connection, mpsc::UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection = Connection::new(
            ConnectionIdFactory::generate(),
            "127.0.0.1:40000".parse().unwrap(),
            Timestamp::new(0),
            tx,
        );
        (connection, rx)
    }

    #[tokio::test]
    async fn test_add_connection_success() {
        // テスト項目: 接続を追加すると件数が増える
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (connection, _rx) = create_connection();

        // when (操作):
        let added = repo.add(connection).await;

        // then (期待する結果):
        assert!(added);
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_add_same_connection_twice_is_noop() {
        // テスト項目: 同じ ID の接続を再登録しても重複しない
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (connection, _rx) = create_connection();
        repo.add(connection.clone()).await;

        // when (操作):
        let added = repo.add(connection).await;

        // then (期待する結果):
        assert!(!added);
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        // テスト項目: 削除は冪等で、2 回目は None を返す
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (connection, _rx) = create_connection();
        let id = connection.id;
        repo.add(connection).await;

        // when (操作):
        let first = repo.remove(&id).await;
        let second = repo.remove(&id).await;

        // then (期待する結果):
        assert_eq!(first.map(|c| c.id), Some(id));
        assert!(second.is_none());
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_remove_many_counts_only_present() {
        // テスト項目: 一括削除は実際に存在した件数を返す
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (alice, _rx1) = create_connection();
        let (bob, _rx2) = create_connection();
        let (charlie, _rx3) = create_connection();
        let (absent, _rx4) = create_connection();
        let ids = vec![alice.id, bob.id, absent.id];
        repo.add(alice).await;
        repo.add(bob).await;
        repo.add(charlie.clone()).await;

        // when (操作):
        let removed = repo.remove_many(&ids).await;

        // then (期待する結果):
        assert_eq!(removed, 2);
        let remaining = repo.snapshot().await;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, charlie.id);
    }

    #[tokio::test]
    async fn test_snapshot_is_stable_under_mutation() {
        // テスト項目: スナップショット取得後にレジストリを変更してもスナップショットは変わらない
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (alice, _rx1) = create_connection();
        let (bob, _rx2) = create_connection();
        repo.add(alice.clone()).await;
        repo.add(bob).await;

        // when (操作):
        let snapshot = repo.snapshot().await;
        repo.remove(&alice.id).await;

        // then (期待する結果):
        assert_eq!(snapshot.len(), 2);
        assert_eq!(repo.count().await, 1);
    }

    #[tokio::test]
    async fn test_drain_empties_registry() {
        // テスト項目: drain は全件を取り出し、レジストリを空にする
        // given (前提条件):
        let repo = InMemoryConnectionRepository::new();
        let (alice, _rx1) = create_connection();
        let (bob, _rx2) = create_connection();
        repo.add(alice).await;
        repo.add(bob).await;

        // when (操作):
        let drained = repo.drain().await;

        // then (期待する結果):
        assert_eq!(drained.len(), 2);
        assert_eq!(repo.count().await, 0);
    }

    #[tokio::test]
    async fn test_concurrent_add_and_remove() {
        // テスト項目: 並行して追加・削除しても件数が N - M になる
        // given (前提条件):
        let repo = Arc::new(InMemoryConnectionRepository::new());
        let mut receivers = Vec::new();
        let mut ids = Vec::new();
        let mut handles = Vec::new();
        for _ in 0..20 {
            let (connection, rx) = create_connection();
            receivers.push(rx);
            ids.push(connection.id);
            let repo = repo.clone();
            handles.push(tokio::spawn(async move { repo.add(connection).await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }

        // when (操作): 7 件を並行して削除
        let mut handles = Vec::new();
        for id in ids.into_iter().take(7) {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move { repo.remove(&id).await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_some());
        }

        // then (期待する結果):
        assert_eq!(repo.count().await, 13);
    }
}
