/// Errors that can occur while binding a popover to a trigger element.
///
/// Only handle creation is fallible.  Everything else in the binding layer
/// (misuse of `class_name`, controlled-mode conflicts, an unwired singleton
/// source) is reported as a log event rather than an error, because the
/// consuming application cannot meaningfully recover from any of them at
/// runtime.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    /// The trigger reference was unresolved (`None`) at creation time.
    ///
    /// This is a programmer error, not a recoverable runtime condition: a
    /// silent no-op would leave the caller believing a popover exists when it
    /// does not, so creation fails fast instead.
    #[error("popover trigger reference is unresolved")]
    MissingTrigger,

    /// The engine refused to create a handle.
    #[error("popover engine failed to create an instance: {0}")]
    Engine(String),
}
