use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Pagination block attached to list responses.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaginationMeta {
    pub current_page: u64,
    /// rows returned on this page
    pub page_count: u64,
    pub total_pages_count: u64,
}

/// Standard JSON envelope: `{status, status_code, message, data}`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: String,
    pub status_code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationMeta>,
}

pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "internal server error";

impl<T> ApiResponse<T> {
    pub fn success(status_code: u16, message: impl Into<String>, data: Option<T>) -> Self {
        Self {
            status: "success".into(),
            status_code,
            message: message.into(),
            error: None,
            data,
            pagination: None,
        }
    }

    pub fn with_pagination(mut self, meta: PaginationMeta) -> Self {
        self.pagination = Some(meta);
        self
    }
}

impl ApiResponse<()> {
    /// 500 never leaks the underlying message.
    pub fn error(status_code: u16, message: impl Into<String>, error: Option<serde_json::Value>) -> Self {
        let (message, error) = if status_code == 500 {
            let m = INTERNAL_SERVER_ERROR_MESSAGE.to_string();
            (m.clone(), Some(serde_json::Value::String(m)))
        } else {
            (message.into(), error)
        };
        Self {
            status: "error".into(),
            status_code,
            message,
            error,
            data: None,
            pagination: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_error_message_is_masked() {
        let r = ApiResponse::error(500, "pq: connection refused", None);
        assert_eq!(r.message, INTERNAL_SERVER_ERROR_MESSAGE);
        assert_eq!(r.status, "error");
    }

    #[test]
    fn success_envelope_shape() {
        let r = ApiResponse::success(201, "created", Some(serde_json::json!({"id": 1})))
            .with_pagination(PaginationMeta { current_page: 1, page_count: 1, total_pages_count: 1 });
        let v = serde_json::to_value(&r).unwrap();
        assert_eq!(v["status"], "success");
        assert_eq!(v["status_code"], 201);
        assert_eq!(v["data"]["id"], 1);
        assert_eq!(v["pagination"]["total_pages_count"], 1);
        assert!(v.get("error").is_none());
    }
}
