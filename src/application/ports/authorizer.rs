//! Authorizer Port - 会话鉴权协作者
//!
//! 核心只关心"调用方是否已授权"，具体鉴权方式由外部注入

/// 鉴权上下文
#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    /// `Authorization: Bearer <token>` 中的 token
    pub bearer_token: Option<String>,
    /// 请求路径
    pub path: String,
}

impl AuthContext {
    pub fn new(path: impl Into<String>, bearer_token: Option<String>) -> Self {
        Self {
            bearer_token,
            path: path.into(),
        }
    }
}

pub trait AuthorizerPort: Send + Sync {
    /// 是否存在有效会话
    fn authorize(&self, ctx: &AuthContext) -> bool;
}
