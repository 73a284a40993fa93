fn method(name: &str, route: &str, input: &str, output: &str) -> tonic_build::manual::Method {
    tonic_build::manual::Method::builder()
        .name(name)
        .route_name(route)
        .input_type(format!("crate::grpc::{input}"))
        .output_type(format!("crate::grpc::{output}"))
        .codec_path("tonic::codec::ProstCodec")
        .build()
}

fn main() {
    // Only run gRPC codegen when the "grpc" feature is enabled.
    if std::env::var("CARGO_FEATURE_GRPC").is_ok() {
        let service = tonic_build::manual::Service::builder()
            .name("BannersRotator")
            .package("banner_rotator")
            .method(method("create_slot", "CreateSlot", "Slot", "Slot"))
            .method(method("create_banner", "CreateBanner", "Banner", "Banner"))
            .method(method("create_group", "CreateGroup", "Group", "Group"))
            .method(method("create_rotation", "CreateRotation", "Rotation", "Message"))
            .method(method("delete_rotation", "DeleteRotation", "Rotation", "Message"))
            .method(method("create_click_event", "CreateClickEvent", "ClickEvent", "Message"))
            .method(method("banner_for_slot", "BannerForSlot", "SlotRequest", "Banner"))
            .build();

        tonic_build::manual::Builder::new().compile(&[service]);
    }
}
