//! Ports - interfaces to the external collaborators

mod repositories;

pub use repositories::{
    AuthCallback, BlobStore, CommentRepository, IdentityProvider, RepoResult, SignIn,
};
