//! Runs requests off the UI loop and hands results back through a channel
//! polled once per frame.

use super::client::ApiRequest;
use super::error::ApiError;
use super::transport;
use eframe::egui;
use serde::de::DeserializeOwned;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

pub struct Pending<T> {
    rx: Receiver<Result<T, ApiError>>,
}

impl<T> Pending<T> {
    /// The result once it has arrived.
    pub fn poll(&self) -> Option<Result<T, ApiError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ApiError::Transport(
                "request ended without a response".into(),
            ))),
        }
    }
}

fn finish<T: DeserializeOwned>(
    tx: &Sender<Result<T, ApiError>>,
    ctx: &egui::Context,
    sent: Result<String, ApiError>,
) {
    let _ = tx.send(sent.and_then(|body| transport::decode(&body)));
    ctx.request_repaint();
}

/// Sends `request` in the background and decodes the JSON answer as `T`.
#[cfg(not(target_arch = "wasm32"))]
pub fn fetch<T>(ctx: &egui::Context, request: ApiRequest) -> Pending<T>
where
    T: DeserializeOwned + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let ctx = ctx.clone();
    std::thread::spawn(move || finish(&tx, &ctx, transport::send(&request)));
    Pending { rx }
}

#[cfg(target_arch = "wasm32")]
pub fn fetch<T>(ctx: &egui::Context, request: ApiRequest) -> Pending<T>
where
    T: DeserializeOwned + 'static,
{
    let (tx, rx) = mpsc::channel();
    let ctx = ctx.clone();
    wasm_bindgen_futures::spawn_local(async move {
        let sent = transport::send(request).await;
        finish(&tx, &ctx, sent);
    });
    Pending { rx }
}

/// Best effort: the outcome is only logged.
#[cfg(not(target_arch = "wasm32"))]
pub fn fire_and_forget(request: ApiRequest, what: &'static str) {
    std::thread::spawn(move || match transport::send(&request) {
        Ok(_) => log::debug!("{what} sent"),
        Err(err) => log::warn!("{what} failed: {err}"),
    });
}

#[cfg(target_arch = "wasm32")]
pub fn fire_and_forget(request: ApiRequest, what: &'static str) {
    wasm_bindgen_futures::spawn_local(async move {
        match transport::send(request).await {
            Ok(_) => log::debug!("{what} sent"),
            Err(err) => log::warn!("{what} failed: {err}"),
        }
    });
}
