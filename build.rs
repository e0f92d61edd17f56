fn main() {
    println!("cargo:rerun-if-env-changed=RLX_RELEASE_VERSION");
    println!("cargo:rerun-if-env-changed=RLX_REPOSITORY_URL");

    // The shim version and the rlx release it fetches can differ; the release
    // pipeline pins the latter explicitly.
    let version = std::env::var("RLX_RELEASE_VERSION")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| std::env::var("CARGO_PKG_VERSION").unwrap_or_default());

    // Strip 'v' prefix if present (e.g., "v1.0.0" -> "1.0.0")
    let version = version.strip_prefix('v').unwrap_or(&version);

    // Release archives only exist for published versions
    if version.is_empty() || version.contains("-dev") {
        panic!(
            "RLX_RELEASE_VERSION must name a published rlx release, got {:?}",
            version
        );
    }

    let repository = std::env::var("RLX_REPOSITORY_URL")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| std::env::var("CARGO_PKG_REPOSITORY").unwrap_or_default());

    if repository.trim().is_empty() {
        panic!("Set RLX_REPOSITORY_URL or the package repository to the rlx release host");
    }

    println!("cargo:rustc-env=RLX_RELEASE_VERSION={}", version);
    println!("cargo:rustc-env=RLX_REPOSITORY_URL={}", repository);
}
