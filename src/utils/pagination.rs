use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

// Query-string values arrive as strings; empty values mean "not provided".
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl PaginationMeta {
    pub fn new(params: &PaginationParams, total: i64) -> Self {
        let limit = params.limit();
        Self {
            page: params.page(),
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let params = PaginationParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_LIMIT);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn limit_is_clamped() {
        let params = PaginationParams {
            page: Some(3),
            limit: Some(500),
        };
        assert_eq!(params.limit(), MAX_LIMIT);
        assert_eq!(params.offset(), 200);
    }

    #[test]
    fn invalid_values_fall_back() {
        let params = PaginationParams {
            page: Some(0),
            limit: Some(-5),
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn meta_rounds_total_pages_up() {
        let params = PaginationParams {
            page: Some(1),
            limit: Some(10),
        };
        let meta = PaginationMeta::new(&params, 21);
        assert_eq!(meta.total_pages, 3);
    }
}
