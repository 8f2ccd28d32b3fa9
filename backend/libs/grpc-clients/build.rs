fn main() {
    // Client-only codegen; the server stubs live in auth-service itself.
    tonic_build::configure()
        .build_server(false)
        .build_client(true)
        .compile(
            &["../../proto/services/auth_service.proto"],
            &["../../proto/services/"],
        )
        .unwrap_or_else(|e| panic!("Failed to compile auth_service.proto: {}", e));

    println!("cargo:rerun-if-changed=../../proto/services/auth_service.proto");
}
