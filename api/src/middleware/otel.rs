use std::{collections::HashMap, str::FromStr};

use actix_web::{
    Error,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next
};
use http::{HeaderMap, HeaderName, HeaderValue};
use opentelemetry::{
    KeyValue,
    global,
    metrics::Counter,
    trace::{Span, SpanKind, Tracer}
};
use opentelemetry_http::HeaderExtractor;

lazy_static::lazy_static! {
    // ? ids are collapsed so span names stay low cardinality
    static ref ROUTE_MAP: HashMap<String, String> = {
        HashMap::from([
            ("/freets/{freet_id}", "/freets/:id"),
            ("/comments/{comment_id}", "/comments/:id")
        ].map(|(k, v)| (k.to_string(), v.to_string())))
    };

    static ref REQUESTS: Counter<u64> = global::meter("api")
        .u64_counter("http.server.requests")
        .build();
}

pub async fn otel_middleware(
    request: ServiceRequest,
    next: Next<impl MessageBody>
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let Some(pattern) = request.match_pattern() else {
        return next.call(request).await;
    };

    let route = ROUTE_MAP.get(&pattern).cloned().unwrap_or(pattern);

    let method = request.method().to_string();

    let tracer = global::tracer("");

    let span = tracer
        .span_builder(format!("{method} {route}"))
        .with_kind(SpanKind::Server)
        .with_attributes(vec![
            KeyValue::new("http.method", method.clone()),
            KeyValue::new("http.path", request.uri().path().to_string()),
            KeyValue::new(
                "http.query",
                request.uri().query().unwrap_or_default().to_string()
            ),
        ]);

    let mut span = span.start_with_context(
        &tracer,
        &global::get_text_map_propagator(|propagator| {
            propagator.extract(&HeaderExtractor(&HeaderMap::from_iter(
                // ? actix and opentelemetry-http are on different http
                // ? versions, so headers are copied across
                request.headers().iter().filter_map(|(k, v)| {
                    Some((
                        HeaderName::from_str(k.as_str()).ok()?,
                        HeaderValue::from_bytes(v.as_bytes()).ok()?
                    ))
                })
            )))
        })
    );

    let response = next.call(request).await;

    let status = match response {
        Ok(ref res) => res.status().as_u16().to_string(),
        Err(_) => "500".to_string()
    };

    REQUESTS.add(1, &[
        KeyValue::new("http.method", method),
        KeyValue::new("http.route", route),
        KeyValue::new("http.status_code", status.clone())
    ]);

    span.set_attribute(KeyValue::new("http.status_code", status));

    response
}
