//! Shared offline transport for behavior tests: responses are scripted per
//! URL fragment, optionally delayed, and consumed in order so sequential
//! calls to the same endpoint can resolve differently.
#![allow(dead_code)]

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::time::Duration;

use esgpulse_core::http_client::{HttpClient, HttpError, HttpRequest, HttpResponse};

struct Route {
    url_contains: String,
    delay_ms: u64,
    result: Result<HttpResponse, HttpError>,
}

#[derive(Default)]
pub struct ScriptedHttpClient {
    routes: Mutex<Vec<Route>>,
}

impl ScriptedHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ok(self, url_contains: &str, body: &str) -> Self {
        self.route(url_contains, 0, Ok(HttpResponse::ok_json(body)))
    }

    pub fn ok_after(self, url_contains: &str, delay_ms: u64, body: &str) -> Self {
        self.route(url_contains, delay_ms, Ok(HttpResponse::ok_json(body)))
    }

    pub fn status(self, url_contains: &str, status: u16) -> Self {
        self.route(
            url_contains,
            0,
            Ok(HttpResponse {
                status,
                body: String::new(),
            }),
        )
    }

    pub fn transport_error(self, url_contains: &str, message: &str) -> Self {
        self.route(url_contains, 0, Err(HttpError::new(message)))
    }

    fn route(
        self,
        url_contains: &str,
        delay_ms: u64,
        result: Result<HttpResponse, HttpError>,
    ) -> Self {
        self.routes.lock().unwrap().push(Route {
            url_contains: url_contains.to_owned(),
            delay_ms,
            result,
        });
        self
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let route = {
            let mut routes = self.routes.lock().unwrap();
            routes
                .iter()
                .position(|route| request.url.contains(&route.url_contains))
                .map(|index| routes.remove(index))
        };

        Box::pin(async move {
            match route {
                Some(route) => {
                    if route.delay_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(route.delay_ms)).await;
                    }
                    route.result
                }
                None => Err(HttpError::new(format!(
                    "no scripted response for {}",
                    request.url
                ))),
            }
        })
    }
}
