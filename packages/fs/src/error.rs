use etcdfs_core::PathError;
use etcdfs_http::StoreError;

/// Failure of a file-protocol operation.
///
/// The `Display` text is what the protocol layer sends back to the client.
/// No operation that returns an error has partially applied its effect.
#[derive(Debug, thiserror::Error)]
pub enum FsError {
    #[error("invalid attach specifier")]
    InvalidAttachSpecifier,

    #[error("attach failed")]
    AttachFailed(#[source] StoreError),

    #[error("clone failed")]
    CloneFailed(#[source] StoreError),

    /// A walk did not resolve. The cause is logged, not reported.
    #[error("file does not exist")]
    NotFound { path: String },

    /// A read's fresh fetch failed.
    #[error("etcd: {0}")]
    Read(#[source] StoreError),

    #[error("post failed")]
    PostFailed(#[source] StoreError),

    #[error("create failed: {0}")]
    CreateFailed(#[source] StoreError),

    #[error("bad file name: {0}")]
    InvalidName(#[from] PathError),

    #[error("remove failed: {0}")]
    RemoveFailed(#[source] StoreError),

    #[error("remove failed: root is read only")]
    RemoveRoot,

    #[error("unknown fid")]
    UnknownFid(u32),

    #[error("fid in use")]
    FidInUse(u32),

    /// The store client could not be built.
    #[error("client setup failed: {0}")]
    Client(#[from] etcdfs_http::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(message: &str) -> StoreError {
        StoreError::Remote {
            message: message.to_string(),
        }
    }

    #[test]
    fn protocol_strings() {
        assert_eq!(
            FsError::InvalidAttachSpecifier.to_string(),
            "invalid attach specifier"
        );
        assert_eq!(FsError::AttachFailed(remote("x")).to_string(), "attach failed");
        assert_eq!(FsError::CloneFailed(remote("x")).to_string(), "clone failed");
        assert_eq!(
            FsError::NotFound {
                path: "/a/b".to_string()
            }
            .to_string(),
            "file does not exist"
        );
        assert_eq!(FsError::PostFailed(remote("x")).to_string(), "post failed");
        assert_eq!(FsError::UnknownFid(3).to_string(), "unknown fid");
        assert_eq!(FsError::FidInUse(3).to_string(), "fid in use");
    }

    #[test]
    fn read_forwards_store_message() {
        let err = FsError::Read(remote("Key not found"));
        assert_eq!(err.to_string(), "etcd: Key not found");
    }

    #[test]
    fn create_forwards_store_message() {
        let err = FsError::CreateFailed(remote("Key already exists"));
        assert_eq!(err.to_string(), "create failed: Key already exists");
    }
}
