use actix_web::{
    Error, HttpResponse, Result,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use chrono::{DateTime, Duration, Utc};
use futures::future::{Ready, ready};
use futures_util::future::LocalBoxFuture;
use std::{
    collections::HashMap,
    net::IpAddr,
    rc::Rc,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::config::Config;
use crate::handlers::shared::ApiResponse;
use crate::middleware::RequestIdExt;

#[derive(Clone, Debug)]
pub struct RateLimitConfig {
    /// Maximum requests per window
    pub max_requests: u32,
    pub window_seconds: i64,
    /// Body message of the 429 response
    pub message: String,
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_seconds: i64) -> Self {
        Self {
            max_requests,
            window_seconds,
            message: "Too many attempts. Please try again later.".to_string(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.rate_limit_requests, config.rate_limit_window_seconds)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    fn window(&self) -> Duration {
        Duration::try_seconds(self.window_seconds).unwrap_or(Duration::seconds(60))
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self::new(20, 60)
    }
}

#[derive(Debug, Clone)]
struct RequestTracker {
    count: u32,
    window_start: DateTime<Utc>,
}

impl RequestTracker {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            window_start: now,
        }
    }

    fn is_expired(&self, window: Duration, now: DateTime<Utc>) -> bool {
        self.window_start
            .checked_add_signed(window)
            .is_some_and(|end| now > end)
    }
}

/// Fixed-window request counts per client address.
#[derive(Clone, Default)]
pub struct RateLimitStore {
    trackers: Arc<Mutex<HashMap<IpAddr, RequestTracker>>>,
}

impl RateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<IpAddr, RequestTracker>> {
        self.trackers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Counts the request and reports whether it is within the limit.
    pub fn check_and_update(&self, ip: IpAddr, config: &RateLimitConfig) -> bool {
        self.check_at(ip, config, Utc::now())
    }

    fn check_at(&self, ip: IpAddr, config: &RateLimitConfig, now: DateTime<Utc>) -> bool {
        let mut trackers = self.lock();
        let tracker = trackers
            .entry(ip)
            .or_insert_with(|| RequestTracker::new(now));

        if tracker.is_expired(config.window(), now) {
            tracker.count = 1;
            tracker.window_start = now;
            true
        } else if tracker.count >= config.max_requests {
            false
        } else {
            tracker.count += 1;
            true
        }
    }

    pub fn cleanup_expired(&self, window_seconds: i64) {
        let window = Duration::try_seconds(window_seconds).unwrap_or(Duration::zero());
        let now = Utc::now();
        self.lock()
            .retain(|_, tracker| !tracker.is_expired(window, now));
    }

    pub fn tracked_clients(&self) -> usize {
        self.lock().len()
    }
}

pub struct RateLimitMiddleware {
    store: RateLimitStore,
    config: RateLimitConfig,
}

impl RateLimitMiddleware {
    pub fn with_store(config: RateLimitConfig, store: RateLimitStore) -> Self {
        Self { store, config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitService {
            service: Rc::new(service),
            store: self.store.clone(),
            config: self.config.clone(),
        }))
    }
}

pub struct RateLimitService<S> {
    service: Rc<S>,
    store: RateLimitStore,
    config: RateLimitConfig,
}

impl<S, B> Service<ServiceRequest> for RateLimitService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let store = self.store.clone();
        let config = self.config.clone();

        Box::pin(async move {
            if let Some(ip) = req.peer_addr().map(|addr| addr.ip()) {
                if !store.check_and_update(ip, &config) {
                    log::warn!(
                        "Rate limit exceeded for {} on {} [{}]",
                        ip,
                        req.path(),
                        req.correlation_id().unwrap_or_default()
                    );
                    let response = HttpResponse::TooManyRequests()
                        .json(ApiResponse::<()>::error(&config.message));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            }

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

const MIN_RETENTION_SECONDS: i64 = 3600;

/// How long a tracker is kept: at least an hour, never shorter than the window.
pub fn retention_seconds(window_seconds: i64) -> i64 {
    window_seconds.max(MIN_RETENTION_SECONDS)
}

/// Periodically drops trackers whose window closed long ago.
pub async fn cleanup_rate_limits(
    store: RateLimitStore,
    interval_seconds: u64,
    window_seconds: i64,
) {
    let mut interval = tokio::time::interval(std::time::Duration::from_secs(interval_seconds));
    let retention = retention_seconds(window_seconds);

    loop {
        interval.tick().await;
        store.cleanup_expired(retention);
        log::debug!(
            "Rate limit cleanup done, {} clients tracked",
            store.tracked_clients()
        );
    }
}
