//! Shared fakes for the integration suites.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use async_trait::async_trait;
use inkwell_access::{
    AccessConfig, Api, ApiRequest, ApiResponse, Method, NavigationRequest, Navigator, Notice,
    Notifier, RequestPipeline, Session, Transport, TransportError,
};
use serde_json::Value;

/// Scripted reply for one route.
#[derive(Clone, Debug)]
pub enum Scripted {
    Respond(u16, Value),
    Timeout,
}

/// Transport answering from a route table and recording every request.
#[derive(Default)]
pub struct FakeTransport {
    routes: RefCell<HashMap<String, Scripted>>,
    log: RefCell<Vec<(String, ApiRequest)>>,
}

fn key(method: Method, path: &str) -> String {
    format!("{method} {path}")
}

impl FakeTransport {
    pub fn respond(&self, method: Method, path: &str, status: u16, body: Value) {
        self.routes
            .borrow_mut()
            .insert(key(method, path), Scripted::Respond(status, body));
    }

    pub fn time_out(&self, method: Method, path: &str) {
        self.routes
            .borrow_mut()
            .insert(key(method, path), Scripted::Timeout);
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.borrow().iter().map(|(_, r)| r.clone()).collect()
    }

    /// URLs seen so far, in order.
    pub fn urls(&self) -> Vec<String> {
        self.log.borrow().iter().map(|(u, _)| u.clone()).collect()
    }

    /// `METHOD path` of every request seen so far.
    pub fn routes_hit(&self) -> Vec<String> {
        self.log
            .borrow()
            .iter()
            .map(|(_, r)| key(r.method, &r.path))
            .collect()
    }
}

#[async_trait(?Send)]
impl Transport for FakeTransport {
    async fn send(&self, url: &str, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.log
            .borrow_mut()
            .push((url.to_string(), request.clone()));
        let scripted = self
            .routes
            .borrow()
            .get(&key(request.method, &request.path))
            .cloned();
        match scripted {
            Some(Scripted::Respond(status, body)) => Ok(ApiResponse::new(status, body)),
            Some(Scripted::Timeout) => Err(TransportError::Timeout {
                url: url.to_string(),
            }),
            None => Ok(ApiResponse::new(404, Value::Null)),
        }
    }
}

/// Navigator and notifier that remember what they were asked to do.
#[derive(Default)]
pub struct Recorder {
    pub navigations: RefCell<Vec<NavigationRequest>>,
    pub notices: RefCell<Vec<Notice>>,
}

impl Navigator for Recorder {
    fn navigate(&self, request: NavigationRequest) {
        self.navigations.borrow_mut().push(request);
    }
}

impl Notifier for Recorder {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}

pub struct Harness {
    pub api: Api<FakeTransport>,
    pub recorder: Rc<Recorder>,
}

impl Harness {
    pub fn new(session: Session) -> anyhow::Result<Self> {
        let recorder = Rc::new(Recorder::default());
        let pipeline = RequestPipeline::new(
            FakeTransport::default(),
            session,
            AccessConfig::default(),
            recorder.clone(),
            recorder.clone(),
        )?;
        Ok(Self {
            api: Api::new(pipeline),
            recorder,
        })
    }

    pub fn anonymous() -> anyhow::Result<Self> {
        Self::new(Session::in_memory())
    }

    pub fn signed_in(token: &str) -> anyhow::Result<Self> {
        let session = Session::in_memory();
        session.credential().set(token)?;
        Self::new(session)
    }

    pub fn transport(&self) -> &FakeTransport {
        self.api.pipeline().transport()
    }

    pub fn session(&self) -> &Session {
        self.api.session()
    }
}
