use crate::{ErrorHandler, DecoError};
use tracing::error;

/// The default error handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultErrorHandler;

impl ErrorHandler for DefaultErrorHandler {
    fn call(&self, err: DecoError) {
        error!("{}", err)
    }
}
