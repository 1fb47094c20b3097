//! Per-request log hook invocation.

use async_trait::async_trait;

use crate::observability::logging::{LogFn, LogRecord};
use crate::pipeline::{Exchange, Flow, Step, StepError};

/// Hands every request to the log hook before anything else looks at it.
pub struct RequestLogger {
    log_fn: LogFn,
}

impl RequestLogger {
    pub fn new(log_fn: LogFn) -> Self {
        Self { log_fn }
    }
}

#[async_trait]
impl Step for RequestLogger {
    fn name(&self) -> &'static str {
        "logger"
    }

    async fn handle(&self, exchange: &mut Exchange) -> Result<Flow, StepError> {
        (self.log_fn)(&LogRecord::new(exchange.request()));
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use crate::pipeline::steps::test_support::exchange;

    #[tokio::test]
    async fn test_logs_and_continues() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let step = RequestLogger::new(Arc::new(move |record: &LogRecord<'_>| {
            sink.lock().unwrap().push(record.uri.to_string());
        }));

        let mut ex = exchange("/file?x=1");
        let flow = step.handle(&mut ex).await.unwrap();

        assert!(matches!(flow, Flow::Continue));
        assert_eq!(*seen.lock().unwrap(), vec!["/file?x=1".to_string()]);
    }
}
