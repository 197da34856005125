// Per-unit scenario state
//
// A context belongs to exactly one unit of work. It is either passed
// explicitly or attached to the current tokio task with `scope`.

use std::cell::RefCell;
use std::future::Future;

use url::Url;

use crate::error::UsageError;
use crate::state::{NodeRef, ResponseSnapshot};

tokio::task_local! {
    static CURRENT: RefCell<ScenarioContext>;
}

/// Request under construction for the current scenario
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSpec {
    base_uri: Option<Url>,
    base_path: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, String)>,
}

impl RequestSpec {
    pub fn set_base_uri(&mut self, uri: &str) -> Result<(), UsageError> {
        let parsed = Url::parse(uri).map_err(|e| UsageError::InvalidBaseUri {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;
        self.base_uri = Some(parsed);
        Ok(())
    }

    pub fn set_base_path(&mut self, path: impl Into<String>) {
        self.base_path = path.into();
    }

    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    pub fn add_query_param(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.query.push((name.into(), value.into()));
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Full request URL: base URI + base path + query parameters
    pub fn url(&self) -> Option<Url> {
        let mut url = self.base_uri.clone()?;

        if !self.base_path.is_empty() {
            let joined = format!(
                "{}/{}",
                url.path().trim_end_matches('/'),
                self.base_path.trim_start_matches('/')
            );
            url.set_path(&joined);
        }

        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &self.query {
                pairs.append_pair(name, value);
            }
        }

        Some(url)
    }
}

/// State owned by one executing scenario
#[derive(Debug, Default)]
pub struct ScenarioContext {
    scenario: Option<NodeRef>,
    request: RequestSpec,
    response: Option<ResponseSnapshot>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a scenario with a fresh request and no response
    pub fn begin_scenario(&mut self, scenario: NodeRef) {
        self.scenario = Some(scenario);
        self.request = RequestSpec::default();
        self.response = None;
    }

    /// Clear everything recorded for the finished scenario
    pub fn end_scenario(&mut self) -> Option<NodeRef> {
        self.request = RequestSpec::default();
        self.response = None;
        self.scenario.take()
    }

    pub fn scenario(&self) -> Option<&NodeRef> {
        self.scenario.as_ref()
    }

    pub fn request(&self) -> &RequestSpec {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut RequestSpec {
        &mut self.request
    }

    pub fn record_response(&mut self, response: ResponseSnapshot) {
        self.response = Some(response);
    }

    pub fn last_response(&self) -> Option<&ResponseSnapshot> {
        self.response.as_ref()
    }

    /// Last response, or a usage error when nothing was sent yet
    pub fn require_response(&self) -> Result<&ResponseSnapshot, UsageError> {
        self.response.as_ref().ok_or(UsageError::MissingResponse)
    }

    /// Run `future` with a fresh context attached to the current task
    pub async fn scope<F: Future>(future: F) -> F::Output {
        CURRENT.scope(RefCell::new(Self::new()), future).await
    }

    /// Whether the calling task has an attached context
    pub fn in_scope() -> bool {
        CURRENT.try_with(|_| ()).is_ok()
    }

    /// Borrow the task's context. `None` outside [`ScenarioContext::scope`].
    pub fn with_current<R>(f: impl FnOnce(&mut ScenarioContext) -> R) -> Option<R> {
        CURRENT.try_with(|cell| f(&mut cell.borrow_mut())).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::ReportTree;

    #[test]
    fn test_request_url() {
        let mut request = RequestSpec::default();
        assert!(request.url().is_none());

        request
            .set_base_uri("https://api.example.com/enterprise-parcelshop-api")
            .unwrap();
        request.set_base_path("/v1");
        request.add_query_param("city", "Edinburgh");
        request.add_query_param("count", "5");
        request.add_header("apikey", "secret");

        let url = request.url().unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.example.com/enterprise-parcelshop-api/v1?city=Edinburgh&count=5"
        );
        assert_eq!(request.headers().len(), 1);
    }

    #[test]
    fn test_invalid_base_uri() {
        let mut request = RequestSpec::default();
        assert!(matches!(
            request.set_base_uri("not a uri"),
            Err(UsageError::InvalidBaseUri { .. })
        ));
    }

    #[test]
    fn test_scenario_lifecycle_clears_state() {
        let tree = ReportTree::new("run");
        let feature = tree.get_or_create_feature("F");
        let scenario = tree.create_scenario(&feature, "S", Vec::<String>::new());

        let mut ctx = ScenarioContext::new();
        assert_eq!(ctx.require_response(), Err(UsageError::MissingResponse));

        ctx.begin_scenario(scenario);
        ctx.request_mut().add_query_param("city", "Leith");
        ctx.record_response(ResponseSnapshot::new(200, "OK", "application/json", "[]").unwrap());
        assert!(ctx.require_response().is_ok());

        let ended = ctx.end_scenario().unwrap();
        assert_eq!(ended.label(), "S");
        assert!(ctx.scenario().is_none());
        assert!(ctx.last_response().is_none());
        assert!(ctx.request().query().is_empty());
    }

    #[tokio::test]
    async fn test_task_local_scope() {
        assert!(!ScenarioContext::in_scope());

        ScenarioContext::scope(async {
            assert!(ScenarioContext::in_scope());
            ScenarioContext::with_current(|ctx| {
                ctx.request_mut().add_header("x", "1");
            });
            let count = ScenarioContext::with_current(|ctx| ctx.request().headers().len());
            assert_eq!(count, Some(1));
        })
        .await;

        assert_eq!(ScenarioContext::with_current(|_| ()), None);
    }
}
