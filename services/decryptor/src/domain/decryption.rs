/// モック復号
///
/// バイト列の順序を反転したものを返す。
/// 二度適用すると元に戻る（対合）。
pub fn mock_reverse(content: &[u8]) -> Vec<u8> {
    content.iter().rev().copied().collect()
}
