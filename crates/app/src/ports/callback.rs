//! Callback port: delivers change notices to the device service that owns
//! the changed entity.

use std::future::Future;

use metacat_domain::error::MetacatError;
use metacat_domain::notification::ChangeNotice;

/// Outbound transport for [`ChangeNotice`]s.
///
/// Only success or failure is interpreted; implementations must not retry.
pub trait CallbackSender: Send + Sync + 'static {
    /// Deliver one notice to `notice.target`.
    fn deliver(&self, notice: &ChangeNotice)
    -> impl Future<Output = Result<(), MetacatError>> + Send;
}
