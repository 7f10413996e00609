//! Static Token Authorizer
//!
//! 以配置中的 bearer token 作为有效会话；关闭鉴权时放行所有请求

use std::collections::HashSet;

use crate::application::ports::{AuthContext, AuthorizerPort};

pub struct StaticTokenAuthorizer {
    enabled: bool,
    tokens: HashSet<String>,
}

impl StaticTokenAuthorizer {
    pub fn new(enabled: bool, tokens: impl IntoIterator<Item = String>) -> Self {
        let tokens: HashSet<String> = tokens
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        if enabled && tokens.is_empty() {
            tracing::warn!("Authorization enabled without tokens, every request will be rejected");
        }

        Self { enabled, tokens }
    }

    /// 放行所有请求
    pub fn allow_all() -> Self {
        Self::new(false, Vec::new())
    }
}

impl AuthorizerPort for StaticTokenAuthorizer {
    fn authorize(&self, ctx: &AuthContext) -> bool {
        if !self.enabled {
            return true;
        }
        ctx.bearer_token
            .as_deref()
            .map(|token| self.tokens.contains(token))
            .unwrap_or(false)
    }
}
