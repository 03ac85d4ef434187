//! API 帮助函数：错误响应、分页链接、请求体/查询参数解析

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use serde::Serialize;
use tracing::{error, trace};

use crate::errors::FoodgramError;
use crate::services::{Page, PageParams, Paged};

use super::error_code::ErrorCode;
use super::types::ErrorBody;

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(body)
}

/// 构建错误响应 `{"code": <int>, "errors": "<message>"}`
pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    json_response(
        status,
        &ErrorBody {
            code,
            errors: message.to_string(),
        },
    )
}

impl ResponseError for FoodgramError {
    fn status_code(&self) -> StatusCode {
        self.http_status()
    }

    fn error_response(&self) -> HttpResponse {
        if self.is_client_error() {
            trace!("Request rejected: {}", self);
        } else {
            error!("Request failed: {}", self);
        }
        error_response(self.http_status(), ErrorCode::from(self), self.message())
    }
}

/// JSON 请求体解析失败 → 400
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(16 * 1024 * 1024)
        .error_handler(|err: JsonPayloadError, _req| {
            FoodgramError::validation(format!("Invalid request body: {}", err)).into()
        })
}

/// 查询参数解析失败 → 400
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req| {
        FoodgramError::validation(format!("Invalid query parameters: {}", err)).into()
    })
}

/// 路径参数解析失败（如 `/recipes/abc/`）→ 404
pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|_err, _req| FoodgramError::not_found("Not found.").into())
}

/// 查询串中所有同名参数（`tags=a&tags=b`）
pub fn query_values(req: &HttpRequest, key: &str) -> Vec<String> {
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .filter(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
        .collect()
}

/// 查询串中第一个同名参数
pub fn query_value(req: &HttpRequest, key: &str) -> Option<String> {
    url::form_urlencoded::parse(req.query_string().as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

/// `1`/`true` 视为真，其余为假
pub fn query_flag(req: &HttpRequest, key: &str) -> bool {
    matches!(
        query_value(req, key).as_deref().map(str::trim),
        Some("1") | Some("true") | Some("True")
    )
}

/// 可选的正整数查询参数；非法值 → 400
pub fn query_number(req: &HttpRequest, key: &str) -> Result<Option<u64>, FoodgramError> {
    match query_value(req, key) {
        None => Ok(None),
        Some(v) if v.trim().is_empty() => Ok(None),
        Some(v) => v.trim().parse::<u64>().map(Some).map_err(|_| {
            FoodgramError::validation(format!("{}: A valid integer is required.", key))
        }),
    }
}

/// 从 `page`、`limit` 解析分页参数
pub fn page_params(req: &HttpRequest, default_limit: u64) -> Result<PageParams, FoodgramError> {
    let page = query_number(req, "page").map_err(|_| FoodgramError::not_found("Invalid page."))?;
    let limit = query_number(req, "limit")?;
    PageParams::new(page, limit, default_limit)
}

/// 当前请求的完整 URL，替换（或删除）`page` 参数
fn page_link(req: &HttpRequest, page: Option<u64>) -> String {
    let conn = req.connection_info();
    let mut pairs: Vec<(String, String)> = url::form_urlencoded::parse(req.query_string().as_bytes())
        .filter(|(k, _)| k != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if let Some(page) = page {
        pairs.push(("page".to_string(), page.to_string()));
    }

    let base = format!("{}://{}{}", conn.scheme(), conn.host(), req.path());
    if pairs.is_empty() {
        return base;
    }
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{}?{}", base, query)
}

/// 服务层分页结果 → `{count, next, previous, results}`
pub fn page_response<T: Serialize>(req: &HttpRequest, paged: Paged<T>) -> Page<T> {
    let params = paged.params;
    let next = params
        .has_next(paged.total)
        .then(|| page_link(req, Some(params.page + 1)));
    let previous = params.has_previous().then(|| {
        if params.page == 2 {
            page_link(req, None)
        } else {
            page_link(req, Some(params.page - 1))
        }
    });

    Page {
        count: paged.total,
        next,
        previous,
        results: paged.items,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::test::TestRequest;

    #[test]
    fn test_query_helpers() {
        let req = TestRequest::get()
            .uri("/api/recipes/?tags=breakfast&tags=lunch&is_favorited=1&limit=3")
            .to_http_request();
        assert_eq!(query_values(&req, "tags"), vec!["breakfast", "lunch"]);
        assert!(query_flag(&req, "is_favorited"));
        assert!(!query_flag(&req, "is_in_shopping_cart"));
        assert_eq!(query_number(&req, "limit").unwrap(), Some(3));

        let req = TestRequest::get().uri("/api/users/?limit=abc").to_http_request();
        assert!(query_number(&req, "limit").is_err());
    }

    #[test]
    fn test_page_links() {
        let req = TestRequest::get()
            .uri("/api/recipes/?page=2&limit=1&author=3")
            .insert_header(("Host", "food.example"))
            .to_http_request();
        let params = page_params(&req, 6).unwrap();
        let page = page_response(
            &req,
            Paged {
                items: vec![1],
                total: 3,
                params,
            },
        );
        assert_eq!(page.count, 3);
        assert_eq!(
            page.next.as_deref(),
            Some("http://food.example/api/recipes/?limit=1&author=3&page=3")
        );
        assert_eq!(
            page.previous.as_deref(),
            Some("http://food.example/api/recipes/?limit=1&author=3")
        );
    }

    #[actix_rt::test]
    async fn test_error_body_shape() {
        let resp = FoodgramError::already_exists("Recipe already added!").error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], 4001);
        assert_eq!(json["errors"], "Recipe already added!");
    }
}
