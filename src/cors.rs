use axum::http::{HeaderName, HeaderValue, Method};
use std::str::FromStr;
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

use crate::config::CorsConfig;

/// 配置列表的解析结果：是否包含通配符 `*`，以及其余合法条目。
struct Parsed<T> {
    any: bool,
    items: Vec<T>,
}

fn parse_list<T: FromStr>(label: &str, values: &[String], normalize: fn(&str) -> String) -> Parsed<T> {
    let mut parsed = Parsed {
        any: false,
        items: Vec::new(),
    };
    for raw in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
        if raw == "*" {
            parsed.any = true;
            continue;
        }
        match normalize(raw).parse::<T>() {
            Ok(v) => parsed.items.push(v),
            Err(_) => tracing::warn!("CORS {} 含无效值: {}", label, raw),
        }
    }
    parsed
}

/// 根据配置构建 CORS 中间件；未启用或配置无效时返回 None。
pub fn build_cors_layer(cors: &CorsConfig) -> Option<CorsLayer> {
    if !cors.enabled {
        return None;
    }

    let origins: Parsed<HeaderValue> =
        parse_list("allowed_origins", &cors.allowed_origins, str::to_string);
    if !origins.any && origins.items.is_empty() {
        tracing::warn!("CORS 已启用但 allowed_origins 为空，已跳过启用");
        return None;
    }
    let methods: Parsed<Method> =
        parse_list("allowed_methods", &cors.allowed_methods, str::to_ascii_uppercase);
    let headers: Parsed<HeaderName> =
        parse_list("allowed_headers", &cors.allowed_headers, str::to_ascii_lowercase);

    let mut layer = CorsLayer::new();
    layer = if origins.any {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(origins.items)
    };
    if methods.any {
        layer = layer.allow_methods(Any);
    } else if !methods.items.is_empty() {
        layer = layer.allow_methods(methods.items);
    }
    if headers.any {
        layer = layer.allow_headers(Any);
    } else if !headers.items.is_empty() {
        layer = layer.allow_headers(headers.items);
    }
    if let Some(secs) = cors.max_age_secs
        && secs > 0
    {
        layer = layer.max_age(Duration::from_secs(secs));
    }
    Some(layer)
}

#[cfg(test)]
mod tests {
    use super::{Parsed, build_cors_layer, parse_list};
    use crate::config::CorsConfig;
    use axum::http::Method;

    #[test]
    fn disabled_or_originless_config_builds_nothing() {
        assert!(build_cors_layer(&CorsConfig::default()).is_none());
        let cors = CorsConfig {
            enabled: true,
            ..CorsConfig::default()
        };
        assert!(build_cors_layer(&cors).is_none());
    }

    #[test]
    fn methods_are_uppercased_and_wildcard_detected() {
        let input = vec!["post".to_string(), " get ".to_string(), "*".to_string()];
        let parsed: Parsed<Method> = parse_list("allowed_methods", &input, str::to_ascii_uppercase);
        assert!(parsed.any);
        assert_eq!(parsed.items, vec![Method::POST, Method::GET]);
    }
}
