//! 请求上下文
//!
//! 每个请求的上下文作为参数沿调用链显式传递，不依赖线程局部状态：
//! 工作线程池和异步任务不保证"当前用户"与线程绑定。

use uuid::Uuid;

use crate::types::UserId;

/// 请求上下文
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// 请求 ID（用于日志关联）
    pub request_id: Uuid,
    /// 当前登录用户（匿名请求为 None）
    pub user_id: Option<UserId>,
}

impl RequestContext {
    /// 创建匿名请求上下文
    pub fn anonymous() -> Self {
        Self {
            request_id: Uuid::new_v4(),
            user_id: None,
        }
    }

    /// 创建已登录用户的请求上下文
    pub fn for_user(user_id: UserId) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            user_id: Some(user_id),
        }
    }

    pub fn with_request_id(mut self, request_id: Uuid) -> Self {
        self.request_id = request_id;
        self
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }
}

impl Default for RequestContext {
    fn default() -> Self {
        Self::anonymous()
    }
}
