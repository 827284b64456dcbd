// Ahoy Language Server
//
// Copyright (c) 2025 Dweve IP B.V. and individual contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Panic containment and deadlines.
//!
//! [`contain`] turns a panic into [`AnalysisFault::Panicked`]. [`run_with_deadline`]
//! additionally moves the work onto the blocking pool and races it against a
//! deadline. An abandoned task keeps running to completion, but it only ever
//! returns an owned value, so its late result is dropped without touching
//! shared state.

use crate::error::AnalysisFault;
use std::any::Any;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tracing::error;

/// Extract a readable message from a panic payload.
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run `f`, converting a panic into a fault.
pub fn contain<T>(f: impl FnOnce() -> T) -> Result<T, AnalysisFault> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        error!(%message, "contained panic");
        AnalysisFault::Panicked(message)
    })
}

/// Run `f` on the blocking pool, giving up after `deadline`.
pub async fn run_with_deadline<T, F>(deadline: Duration, f: F) -> Result<T, AnalysisFault>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let task = tokio::task::spawn_blocking(move || contain(f));
    match tokio::time::timeout(deadline, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) if join_error.is_panic() => Err(AnalysisFault::Panicked(panic_message(
            join_error.into_panic().as_ref(),
        ))),
        Ok(Err(_)) => Err(AnalysisFault::Cancelled),
        Err(_) => Err(AnalysisFault::TimedOut(deadline)),
    }
}

/// Await a request future, converting a panic into a fault.
///
/// Used at the outermost dispatch point of request handlers.
pub async fn contain_async<T, Fut>(future: Fut) -> Result<T, AnalysisFault>
where
    Fut: Future<Output = T>,
{
    use std::pin::pin;
    use std::task::Poll;

    let mut future = pin!(future);
    std::future::poll_fn(move |cx| match contain(|| future.as_mut().poll(cx)) {
        Ok(Poll::Ready(value)) => Poll::Ready(Ok(value)),
        Ok(Poll::Pending) => Poll::Pending,
        Err(fault) => Poll::Ready(Err(fault)),
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contain_ok() {
        assert_eq!(contain(|| 41 + 1), Ok(42));
    }

    #[test]
    fn test_contain_panic() {
        let result: Result<(), _> = contain(|| panic!("boom"));
        assert_eq!(result, Err(AnalysisFault::Panicked("boom".to_string())));
    }

    #[test]
    fn test_panic_message_formats() {
        let result: Result<(), _> = contain(|| panic!("value {}", 7));
        assert_eq!(result, Err(AnalysisFault::Panicked("value 7".to_string())));
    }

    #[tokio::test]
    async fn test_deadline_ok() {
        let result = run_with_deadline(Duration::from_secs(1), || "done").await;
        assert_eq!(result, Ok("done"));
    }

    #[tokio::test]
    async fn test_deadline_elapses() {
        let result = run_with_deadline(Duration::from_millis(20), || {
            std::thread::sleep(Duration::from_millis(300));
        })
        .await;
        assert_eq!(result, Err(AnalysisFault::TimedOut(Duration::from_millis(20))));
    }

    #[tokio::test]
    async fn test_deadline_contains_panic() {
        let result: Result<(), _> = run_with_deadline(Duration::from_secs(1), || panic!("parser")).await;
        assert_eq!(result, Err(AnalysisFault::Panicked("parser".to_string())));
    }

    #[tokio::test]
    async fn test_contain_async_panic() {
        let result = contain_async(async {
            if std::hint::black_box(true) {
                panic!("handler");
            }
            7u8
        })
        .await;
        assert_eq!(result, Err(AnalysisFault::Panicked("handler".to_string())));
    }
}
