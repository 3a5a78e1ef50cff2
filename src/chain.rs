//! 安全过滤器链装配
//! 以命名阶段的有序列表描述请求处理流水线，支持“把阶段 X 插到锚点 Y
//! 的紧后面”；锚点不存在是装配期配置错误，立即失败而不是悄悄放错位置。
//!
//! 列表顺序即 `.layer()` 的叠加顺序：列表中靠后的阶段包裹它之前的全部
//! 阶段，因此能观察到前面阶段产生的响应状态码。决策日志阶段排在
//! 授权决策阶段之后，看到的正是授权决策的结果（401/403 或放行后的状态）。

use crate::{
    auth::{middleware::authentication_middleware, AuthContext, JwtService, ROLE_ADMIN, ROLE_ADMIN_READ},
    error::AppError,
    middleware::{request_tracking_middleware, AppState},
    services::require_any_authority,
};
use axum::{
    extract::{Request, State},
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
    Router,
};
use std::sync::Arc;

pub const AUTHENTICATION: &str = "authentication";
pub const AUTHORIZATION_DECISION: &str = "authorization-decision";
pub const DECISION_LOGGING: &str = "decision-logging";
pub const REQUEST_TRACKING: &str = "request-tracking";

/// 链中的一个命名阶段
pub struct FilterStage {
    name: &'static str,
    apply: Box<dyn FnOnce(Router) -> Router + Send>,
}

impl FilterStage {
    pub fn new(
        name: &'static str,
        apply: impl FnOnce(Router) -> Router + Send + 'static,
    ) -> Self {
        Self {
            name,
            apply: Box::new(apply),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// 有序过滤器链
#[derive(Default)]
pub struct SecurityFilterChain {
    stages: Vec<FilterStage>,
}

impl SecurityFilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加到链尾
    pub fn append(mut self, stage: FilterStage) -> Self {
        self.stages.push(stage);
        self
    }

    /// 插入到锚点阶段的紧后面
    ///
    /// 锚点不存在或阶段名重复都是装配错误，装配期即拒绝。
    pub fn insert_after(mut self, stage: FilterStage, anchor: &str) -> Result<Self, AppError> {
        if self.position(stage.name()).is_some() {
            return Err(AppError::Config(format!(
                "filter stage already present: {}",
                stage.name()
            )));
        }
        let index = self.position(anchor).ok_or_else(|| {
            AppError::Config(format!("unknown filter chain anchor: {}", anchor))
        })?;
        self.stages.insert(index + 1, stage);
        Ok(self)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.stages.iter().position(|s| s.name == name)
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name).collect()
    }

    /// 按列表顺序把各阶段叠到路由上
    pub fn into_router(self, router: Router) -> Router {
        let mut router = router;
        for stage in self.stages {
            router = (stage.apply)(router);
        }
        router
    }
}

/// 认证阶段：解出调用方身份，不做拒绝
pub fn authentication_stage(jwt_service: Arc<JwtService>) -> FilterStage {
    FilterStage::new(AUTHENTICATION, move |router| {
        router.layer(axum::middleware::from_fn_with_state(
            jwt_service,
            authentication_middleware,
        ))
    })
}

/// 授权决策阶段：对 /admin 下的请求做出放行或 401/403
pub fn authorization_decision_stage(state: Arc<AppState>) -> FilterStage {
    FilterStage::new(AUTHORIZATION_DECISION, move |router| {
        router.layer(axum::middleware::from_fn_with_state(
            state,
            authorize_admin_request,
        ))
    })
}

async fn authorize_admin_request(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.uri().path().starts_with("/admin") {
        let ctx = req
            .extensions()
            .get::<AuthContext>()
            .cloned()
            .ok_or(AppError::Unauthorized)?;

        let required: &[&str] = if req.method() == Method::GET {
            &[ROLE_ADMIN, ROLE_ADMIN_READ]
        } else {
            &[ROLE_ADMIN]
        };
        require_any_authority(&state.hierarchy, &ctx, required)?;
    }

    Ok(next.run(req).await)
}

/// 决策日志阶段
///
/// 观察最终状态码，命中给定集合时记一条结构化日志。
pub fn decision_logging_stage(statuses: Vec<StatusCode>) -> FilterStage {
    FilterStage::new(DECISION_LOGGING, move |router| {
        router.layer(axum::middleware::from_fn(
            move |req: Request, next: Next| {
                let statuses = statuses.clone();
                async move {
                    let method = req.method().clone();
                    let uri = req.uri().clone();

                    let response = next.run(req).await;

                    let status = response.status();
                    if statuses.contains(&status) {
                        tracing::warn!(
                            method = %method,
                            uri = %uri,
                            status = status.as_u16(),
                            "Access decision logged"
                        );
                        metrics::counter!("decision_log_entries_total").increment(1);
                    }
                    response
                }
            },
        ))
    })
}

/// 请求追踪阶段
pub fn request_tracking_stage() -> FilterStage {
    FilterStage::new(REQUEST_TRACKING, |router| {
        router.layer(axum::middleware::from_fn(request_tracking_middleware))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &'static str) -> FilterStage {
        FilterStage::new(name, |router| router)
    }

    #[test]
    fn test_insert_after_places_stage_directly_behind_anchor() {
        let chain = SecurityFilterChain::new()
            .append(noop(AUTHORIZATION_DECISION))
            .append(noop(AUTHENTICATION))
            .insert_after(noop(DECISION_LOGGING), AUTHORIZATION_DECISION)
            .unwrap();

        assert_eq!(
            chain.stage_names(),
            vec![AUTHORIZATION_DECISION, DECISION_LOGGING, AUTHENTICATION]
        );
        assert_eq!(
            chain.position(DECISION_LOGGING),
            Some(chain.position(AUTHORIZATION_DECISION).unwrap() + 1)
        );
    }

    #[test]
    fn test_insert_after_unknown_anchor_fails_fast() {
        let result = SecurityFilterChain::new()
            .append(noop(AUTHORIZATION_DECISION))
            .insert_after(noop(DECISION_LOGGING), "nonexistent-stage");

        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_insert_after_rejects_duplicate_stage() {
        let result = SecurityFilterChain::new()
            .append(noop(AUTHORIZATION_DECISION))
            .append(noop(DECISION_LOGGING))
            .insert_after(noop(DECISION_LOGGING), AUTHORIZATION_DECISION);

        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
