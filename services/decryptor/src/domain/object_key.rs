//! オブジェクトキーのプレフィックス規約
//!
//! 入力オブジェクトは`raw/`配下、出力オブジェクトは`decrypted/`配下に置く。

/// 入力オブジェクトのプレフィックス
pub const RAW_PREFIX: &str = "raw/";

/// 出力オブジェクトのプレフィックス
pub const DECRYPTED_PREFIX: &str = "decrypted/";

/// 処理対象（`raw/`で始まる）キーかどうかを判定
pub fn is_raw_key(key: &str) -> bool {
    key.starts_with(RAW_PREFIX)
}

/// 出力先キーを導出する
///
/// キー中で最初に現れる`raw/`のみを`decrypted/`に置換する。
/// パスセグメント単位の置換ではない。
pub fn destination_key(key: &str) -> String {
    key.replacen(RAW_PREFIX, DECRYPTED_PREFIX, 1)
}
