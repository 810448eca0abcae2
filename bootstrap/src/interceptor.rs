//! gRPC Interceptors
//!
//! 授权拦截器在每个调用进入业务逻辑前运行：
//! 1. 元数据完全缺失 → `InvalidArgument`
//! 2. 缺少 `authorization` → `Unauthenticated`
//! 3. `authorization` 为空 → 放行但不注入身份
//! 4. 签名或格式错误 → `PermissionDenied`；过期或签发方不符 → `Unauthenticated`
//! 5. 校验通过 → 注入 [`CallerId`] 与 [`Claims`]
//!
//! 客户端自带的 `user_id` 元数据一律丢弃，身份只能来自已验证的 token。

use std::sync::Arc;

use ditto_auth_core::{Claims, TokenService};
use ditto_common::{CallerId, USER_ID_KEY};
use ditto_errors::AppError;
use tonic::service::Interceptor;
use tonic::{Request, Status};
use tracing::{debug, warn};

const AUTHORIZATION: &str = "authorization";
const BEARER_SCHEME: &str = "Bearer";

/// 可挂载到生成的 `XxxServer::with_interceptor` 上的授权拦截器
#[derive(Clone)]
pub struct AuthInterceptor {
    token_service: Arc<TokenService>,
}

impl AuthInterceptor {
    pub fn new(token_service: Arc<TokenService>) -> Self {
        Self { token_service }
    }
}

impl Interceptor for AuthInterceptor {
    fn call(&mut self, request: Request<()>) -> Result<Request<()>, Status> {
        auth_interceptor(&self.token_service, request)
    }
}

/// 认证拦截器
#[allow(clippy::result_large_err)]
pub fn auth_interceptor(
    token_service: &TokenService,
    mut request: Request<()>,
) -> Result<Request<()>, Status> {
    if request.metadata().is_empty() {
        return Err(Status::invalid_argument("headers absent"));
    }

    let token = extract_token(&request)?;
    request.metadata_mut().remove(USER_ID_KEY);

    let Some(token) = token else {
        warn!("Empty authorization token, continuing without caller identity");
        return Ok(request);
    };

    let claims = token_service
        .verify(&token)
        .map_err(|e| {
            warn!(error = %e, "Token verification failed");
            Status::from(AppError::from(e))
        })?;
    debug!(user_id = %claims.user_id, "Caller authenticated");

    request.extensions_mut().insert(claims.caller_id());
    request.extensions_mut().insert(claims);

    Ok(request)
}

/// 从请求中提取 token；`Bearer ` 前缀可选，空值返回 `None`
#[allow(clippy::result_large_err)]
fn extract_token<T>(request: &Request<T>) -> Result<Option<String>, Status> {
    let auth_header = request
        .metadata()
        .get(AUTHORIZATION)
        .ok_or_else(|| Status::unauthenticated("authorization token absent"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| Status::permission_denied("malformed authorization header"))?;

    let token = strip_bearer(auth_str.trim_start()).trim();
    if token.is_empty() {
        return Ok(None);
    }
    Ok(Some(token.to_string()))
}

/// 去掉 `Bearer` 方案名；方案名后必须是空白或值结尾
fn strip_bearer(value: &str) -> &str {
    match value.strip_prefix(BEARER_SCHEME) {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest,
        _ => value,
    }
}

/// 从请求扩展中获取 Claims
pub fn get_claims<T>(request: &Request<T>) -> Option<&Claims> {
    request.extensions().get::<Claims>()
}

/// 从请求扩展中获取调用方身份
pub fn get_caller<T>(request: &Request<T>) -> Option<&CallerId> {
    request.extensions().get::<CallerId>()
}
