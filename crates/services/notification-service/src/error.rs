use thiserror::Error;

/// Errors raised by notification handles.
///
/// The center itself cannot fail; only a context that outlived its center can.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("notification context used outside its provider")]
    OutsideProvider,
}
