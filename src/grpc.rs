//! gRPC transport - maps `BannersRotator` RPCs to rotator operations.
//!
//! Requires the `grpc` feature. Uses tonic for the server and prost for
//! message serialization (standard protobuf wire format, no `.proto` file).
//!
//! ## RPCs
//!
//! - `CreateSlot`, `CreateBanner`, `CreateGroup`: input carries a description,
//!   output is the stored entity with its assigned id.
//! - `CreateRotation`, `DeleteRotation`: input `Rotation`, output `Message`.
//! - `CreateClickEvent`: input `ClickEvent`, output `Message`.
//! - `BannerForSlot`: input `SlotRequest`, output the chosen `Banner`.
//!
//! Selections run on tokio's blocking pool when slot locking is enabled.
//!
//! Invalid input is `InvalidArgument`. Rotator failures map through
//! `RotatorError::status_code`: 404 is `NotFound`, 409 `AlreadyExists`,
//! 502 `Unavailable`, anything else `Internal`.

use std::sync::Arc;

use tonic::{Code, Request, Response, Status};

use crate::bus::Publisher;
use crate::model;
use crate::request::{
    ClickRequest, DescriptionRequest, InvalidRequest, RotationRequest, SelectionRequest,
};
use crate::rotator::{Rotator, RotatorError};
use crate::storage::Storage;

// ---------------------------------------------------------------------------
// Message types
// ---------------------------------------------------------------------------

#[derive(Clone, prost::Message)]
pub struct Slot {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub description: String,
}

#[derive(Clone, prost::Message)]
pub struct Banner {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub description: String,
}

#[derive(Clone, prost::Message)]
pub struct Group {
    #[prost(int64, tag = "1")]
    pub id: i64,
    #[prost(string, tag = "2")]
    pub description: String,
}

#[derive(Clone, prost::Message)]
pub struct Rotation {
    #[prost(int64, tag = "1")]
    pub slot_id: i64,
    #[prost(int64, tag = "2")]
    pub banner_id: i64,
}

#[derive(Clone, prost::Message)]
pub struct ClickEvent {
    #[prost(int64, tag = "1")]
    pub slot_id: i64,
    #[prost(int64, tag = "2")]
    pub banner_id: i64,
    #[prost(int64, tag = "3")]
    pub group_id: i64,
}

#[derive(Clone, prost::Message)]
pub struct SlotRequest {
    #[prost(int64, tag = "1")]
    pub slot_id: i64,
    #[prost(int64, tag = "2")]
    pub group_id: i64,
}

#[derive(Clone, prost::Message)]
pub struct Message {
    #[prost(string, tag = "1")]
    pub message: String,
}

impl From<model::Slot> for Slot {
    fn from(slot: model::Slot) -> Self {
        Self {
            id: slot.id.get(),
            description: slot.description,
        }
    }
}

impl From<model::Banner> for Banner {
    fn from(banner: model::Banner) -> Self {
        Self {
            id: banner.id.get(),
            description: banner.description,
        }
    }
}

impl From<model::Group> for Group {
    fn from(group: model::Group) -> Self {
        Self {
            id: group.id.get(),
            description: group.description,
        }
    }
}

// ---------------------------------------------------------------------------
// Generated service trait + server/client
// ---------------------------------------------------------------------------

include!(concat!(
    env!("OUT_DIR"),
    "/banner_rotator.BannersRotator.rs"
));

pub use banners_rotator_client::BannersRotatorClient;
pub use banners_rotator_server::{BannersRotator, BannersRotatorServer};

// ---------------------------------------------------------------------------
// Handler implementation
// ---------------------------------------------------------------------------

/// Implements the generated `BannersRotator` trait over a shared rotator.
pub struct GrpcHandler<S, P> {
    rotator: Arc<Rotator<S, P>>,
}

impl<S, P> GrpcHandler<S, P> {
    pub fn new(rotator: Arc<Rotator<S, P>>) -> Self {
        Self { rotator }
    }
}

fn invalid(err: InvalidRequest) -> Status {
    Status::invalid_argument(err.to_string())
}

fn status(err: RotatorError) -> Status {
    tracing::error!(error = %err, stage = ?err.failure_stage(), "rpc failed");
    let code = match err.status_code() {
        404 => Code::NotFound,
        409 => Code::AlreadyExists,
        502 => Code::Unavailable,
        _ => Code::Internal,
    };
    Status::new(code, err.to_string())
}

/// Run a selection, off the async workers when it may block on a slot lock.
async fn select<S, P>(
    rotator: Arc<Rotator<S, P>>,
    slot: model::SlotId,
    group: model::GroupId,
) -> Result<model::Banner, Status>
where
    S: Storage + 'static,
    P: Publisher + 'static,
{
    if !rotator.serializes_selection() {
        return rotator.select_banner(slot, group).map_err(status);
    }
    tokio::task::spawn_blocking(move || rotator.select_banner(slot, group))
        .await
        .map_err(|err| Status::internal(format!("selection task failed: {err}")))?
        .map_err(status)
}

fn message(text: &str) -> Response<Message> {
    Response::new(Message {
        message: text.to_string(),
    })
}

fn description(raw: String) -> DescriptionRequest {
    DescriptionRequest { description: raw }
}

#[tonic::async_trait]
impl<S, P> BannersRotator for GrpcHandler<S, P>
where
    S: Storage + 'static,
    P: Publisher + 'static,
{
    async fn create_slot(&self, request: Request<Slot>) -> Result<Response<Slot>, Status> {
        let req = description(request.into_inner().description);
        let slot = self
            .rotator
            .create_slot(req.validate().map_err(invalid)?)
            .map_err(status)?;
        Ok(Response::new(slot.into()))
    }

    async fn create_banner(&self, request: Request<Banner>) -> Result<Response<Banner>, Status> {
        let req = description(request.into_inner().description);
        let banner = self
            .rotator
            .create_banner(req.validate().map_err(invalid)?)
            .map_err(status)?;
        Ok(Response::new(banner.into()))
    }

    async fn create_group(&self, request: Request<Group>) -> Result<Response<Group>, Status> {
        let req = description(request.into_inner().description);
        let group = self
            .rotator
            .create_group(req.validate().map_err(invalid)?)
            .map_err(status)?;
        Ok(Response::new(group.into()))
    }

    async fn create_rotation(
        &self,
        request: Request<Rotation>,
    ) -> Result<Response<Message>, Status> {
        let rotation = request.into_inner();
        let (slot, banner) = RotationRequest {
            slot_id: rotation.slot_id,
            banner_id: rotation.banner_id,
        }
        .validate()
        .map_err(invalid)?;
        self.rotator
            .create_rotation(slot, banner)
            .map_err(status)?;
        Ok(message("Rotation was created"))
    }

    async fn delete_rotation(
        &self,
        request: Request<Rotation>,
    ) -> Result<Response<Message>, Status> {
        let rotation = request.into_inner();
        let (slot, banner) = RotationRequest {
            slot_id: rotation.slot_id,
            banner_id: rotation.banner_id,
        }
        .validate()
        .map_err(invalid)?;
        self.rotator
            .delete_rotation(slot, banner)
            .map_err(status)?;
        Ok(message("Rotation was deleted"))
    }

    async fn create_click_event(
        &self,
        request: Request<ClickEvent>,
    ) -> Result<Response<Message>, Status> {
        let click = request.into_inner();
        let (slot, banner, group) = ClickRequest {
            slot_id: click.slot_id,
            banner_id: click.banner_id,
            group_id: click.group_id,
        }
        .validate()
        .map_err(invalid)?;
        self.rotator
            .record_click(slot, banner, group)
            .map_err(status)?;
        Ok(message("Click event was registered"))
    }

    async fn banner_for_slot(
        &self,
        request: Request<SlotRequest>,
    ) -> Result<Response<Banner>, Status> {
        let req = request.into_inner();
        let (slot, group) = SelectionRequest {
            slot_id: req.slot_id,
            group_id: req.group_id,
        }
        .validate()
        .map_err(invalid)?;
        let banner = select(Arc::clone(&self.rotator), slot, group).await?;
        Ok(Response::new(banner.into()))
    }
}

// ---------------------------------------------------------------------------
// Convenience constructors
// ---------------------------------------------------------------------------

/// Create a `BannersRotatorServer` from a shared rotator.
pub fn grpc_server<S, P>(rotator: Arc<Rotator<S, P>>) -> BannersRotatorServer<GrpcHandler<S, P>>
where
    S: Storage + 'static,
    P: Publisher + 'static,
{
    BannersRotatorServer::new(GrpcHandler::new(rotator))
}

/// Bind and serve the gRPC transport at the given address (e.g. `"[::1]:50051"`).
pub async fn serve_grpc<S, P>(
    rotator: Arc<Rotator<S, P>>,
    addr: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    S: Storage + 'static,
    P: Publisher + 'static,
{
    let socket: std::net::SocketAddr = addr.parse()?;
    tracing::info!(%addr, "grpc transport listening");
    tonic::transport::Server::builder()
        .add_service(grpc_server(rotator))
        .serve(socket)
        .await?;
    Ok(())
}
