/*!
 * Caller identity extractor
 *
 * Responsibility:
 * - 認証済みリクエストの Identity (caller_id / client_id) を handler に提供する
 * - Identity は access middleware が token 解決に成功したときだけ extensions に入れる
 *
 * Public API:
 * - CallerIdentity
 */

mod core;

pub use self::core::CallerIdentity;
