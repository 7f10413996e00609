//! Auth Adapter - 鉴权协作者实现

mod static_token_authorizer;

pub use static_token_authorizer::StaticTokenAuthorizer;
