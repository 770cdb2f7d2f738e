mod otel;

pub use otel::otel_middleware as otel;
