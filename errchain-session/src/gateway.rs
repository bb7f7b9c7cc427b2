//! # API return gateway
//!
//! Every public API call ends here. The gateway logs the chain of the call,
//! hands it to the caller's session (or drops it) and turns it into the one
//! numeric code the call returns.

use crate::error::{ErrorChain, ErrorCode, ErrorRecord};
use crate::session::Session;
use errchain_log::{LogLevel, Logger};

/// Finishes API calls, logging through a chosen [`Logger`]
#[derive(Debug, Clone, Copy)]
pub struct ReturnGateway<'a> {
    logger: &'a Logger,
}

impl<'a> ReturnGateway<'a> {
    /// Gateway logging through `logger`
    pub fn new(logger: &'a Logger) -> Self {
        Self { logger }
    }

    /// Finish an API call.
    ///
    /// With no chain the call succeeded: the session is cleared of stale
    /// errors and `Ok` is returned. Otherwise each record is logged at error
    /// level in chain order, the chain replaces whatever the session held (or
    /// is dropped when there is no session) and the code of the first record
    /// is returned.
    pub fn finish(&self, session: Option<&mut Session>, chain: Option<ErrorChain>) -> ErrorCode {
        let Some(chain) = chain else {
            if let Some(session) = session {
                session.clear_error();
            }
            return ErrorCode::Ok;
        };

        for record in &chain {
            self.logger.log(LogLevel::Error, format_args!("{}", record));
        }

        let code = chain.first_code();
        match session {
            Some(session) => session.attach_chain(chain),
            None => drop(chain),
        }
        code
    }

    /// Reject a call with invalid arguments without doing any work
    pub fn invalid_argument(&self, session: Option<&mut Session>, func: &str) -> ErrorCode {
        self.finish(
            session,
            Some(ErrorChain::new(ErrorRecord::invalid_argument(func))),
        )
    }
}

impl Default for ReturnGateway<'static> {
    fn default() -> Self {
        Self::new(errchain_log::logger())
    }
}

/// [`ReturnGateway::finish`] through the process-wide logger
pub fn finish(session: Option<&mut Session>, chain: Option<ErrorChain>) -> ErrorCode {
    ReturnGateway::default().finish(session, chain)
}

/// [`ReturnGateway::invalid_argument`] through the process-wide logger
pub fn invalid_argument(session: Option<&mut Session>, func: &str) -> ErrorCode {
    ReturnGateway::default().invalid_argument(session, func)
}

/// Return early from an API function when an argument check fails.
///
/// ```rust
/// use errchain_session::{check_arg, ErrorCode, Session};
///
/// fn get_item(session: &mut Session, xpath: &str) -> ErrorCode {
///     check_arg!(xpath.is_empty(), Some(&mut *session), "get_item");
///     ErrorCode::Ok
/// }
///
/// let mut session = Session::new();
/// assert_eq!(get_item(&mut session, ""), ErrorCode::InvalidArgument);
/// ```
#[macro_export]
macro_rules! check_arg {
    ($cond:expr, $session:expr, $func:expr) => {
        if $cond {
            return $crate::invalid_argument($session, $func);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use errchain_error::push_error;
    use errchain_log::MemorySink;
    use std::sync::Arc;

    fn logger_with_console() -> (Logger, Arc<MemorySink>) {
        let console = Arc::new(MemorySink::new());
        let logger = Logger::with_sinks(Box::new(console.clone()), Box::new(MemorySink::new()));
        logger.set_console_level(Some(LogLevel::Debug));
        (logger, console)
    }

    #[test]
    fn test_no_chain_is_success() {
        let (logger, console) = logger_with_console();
        let gateway = ReturnGateway::new(&logger);

        assert_eq!(gateway.finish(None, None), ErrorCode::Ok);
        assert!(console.is_empty());
    }

    #[test]
    fn test_success_clears_stale_error() {
        let (logger, _) = logger_with_console();
        let mut session = Session::new();
        session.attach_chain(ErrorRecord::validation_failed().into());

        let code = ReturnGateway::new(&logger).finish(Some(&mut session), None);

        assert_eq!(code, ErrorCode::Ok);
        assert!(session.error().is_none());
    }

    #[test]
    fn test_without_session_chain_is_dropped() {
        let (logger, console) = logger_with_console();
        let mut chain = None;
        push_error!(&mut chain, ErrorCode::Locked, "x");

        let code = ReturnGateway::new(&logger).finish(None, chain);

        assert_eq!(code, ErrorCode::Locked);
        assert_eq!(console.lines(), vec![(LogLevel::Error, "x".to_string())]);
    }

    #[test]
    fn test_chain_attached_and_prior_replaced() {
        let (logger, _) = logger_with_console();
        let mut session = Session::new();
        session.attach_chain(ErrorRecord::new(ErrorCode::Exists, "z").into());

        let mut chain = None;
        push_error!(&mut chain, ErrorCode::NotFound, "x");
        push_error!(&mut chain, ErrorCode::Internal, "y");

        let code = ReturnGateway::new(&logger).finish(Some(&mut session), chain);

        assert_eq!(code, ErrorCode::NotFound);
        let attached: Vec<_> = session
            .error()
            .unwrap()
            .iter()
            .map(|r| r.message().to_string())
            .collect();
        assert_eq!(attached, vec!["x", "y"]);
    }

    #[test]
    fn test_records_logged_in_order_with_path() {
        let (logger, console) = logger_with_console();
        let chain = ErrorChain::new(ErrorRecord::new(ErrorCode::Engine, "first").with_path("/a"));
        let mut chain = Some(chain);
        push_error!(&mut chain, ErrorCode::Internal, "second");

        ReturnGateway::new(&logger).finish(None, chain);

        assert_eq!(
            console.lines(),
            vec![
                (LogLevel::Error, "first (path: /a)".to_string()),
                (LogLevel::Error, "second".to_string()),
            ]
        );
    }

    #[test]
    fn test_invalid_argument_short_circuits() {
        let (logger, _) = logger_with_console();
        let mut session = Session::new();

        let code = ReturnGateway::new(&logger).invalid_argument(Some(&mut session), "set_item");

        assert_eq!(code, ErrorCode::InvalidArgument);
        assert_eq!(
            session.error().unwrap().first().message(),
            "Invalid arguments for function \"set_item\"."
        );
    }
}
