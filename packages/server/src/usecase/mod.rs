//! UseCase 層
//!
//! リレーのビジネスロジックを実装するレイヤー。
//! UI 層（UDP 受信ループ・WebSocket ハンドラ）から呼び出され、Domain 層を操作します。

pub mod broadcast_payload;
pub mod close_all_clients;
pub mod connect_client;
pub mod disconnect_client;
pub mod error;

pub use broadcast_payload::{BroadcastPayloadUseCase, BroadcastReport};
pub use close_all_clients::CloseAllClientsUseCase;
pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::{DisconnectClientUseCase, DisconnectReason};
pub use error::ConnectError;
