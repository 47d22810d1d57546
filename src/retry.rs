//! Повтор удаленных вызовов с экспоненциальной задержкой
//!
//! Ошибки авторизации не повторяются и сразу превращаются в ошибку
//! конфигурации. При исчерпании квоты задержка дополнительно умножается.

use std::future::Future;

use crate::config::RetryPolicy;
use crate::error::Result;

/// Выполнить `operation`, повторяя ее согласно `policy`
///
/// `label` используется только в логах.
pub async fn retry<T, F, Fut>(policy: &RetryPolicy, label: &str, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = policy.initial_delay();
    let mut attempt: u32 = 0;

    loop {
        let error = match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if error.is_credential_error() {
            log::error!("{}: credential rejected, not retrying: {}", label, error);
            return Err(error.into_configuration());
        }

        if attempt >= policy.max_retries {
            log::error!("{}: giving up after {} attempts: {}", label, attempt + 1, error);
            return Err(error);
        }
        attempt += 1;

        let wait = if error.is_rate_limit() {
            delay.mul_f64(policy.rate_limit_multiplier)
        } else {
            delay
        };

        log::warn!(
            "{}: attempt {} failed ({}), retrying in {} ms",
            label,
            attempt,
            error,
            wait.as_millis()
        );
        tokio::time::sleep(wait).await;

        delay = delay.saturating_mul(2);
    }
}
