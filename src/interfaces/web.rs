// リクエスト処理用のAxumハンドラー
pub mod handlers;
// ウェブサーバー起動用の関数
pub mod server;
// ヘルスチェック機能
pub mod health;
// メトリクス機能
pub mod metrics;
// HTTPエラー応答への変換
pub mod error;
